pub mod attendance;
pub mod backup_exchange;
pub mod classes;
pub mod core;
pub mod data;
pub mod prompts;
pub mod settings;
pub mod students;
