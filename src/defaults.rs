//! Seed data written the first time a store is opened.

/// `(name, period)` of the example classes.
pub const DEFAULT_CLASSES: [(&str, &str); 4] = [
    ("Period 1 - Computer Science", "Period 1"),
    ("Period 3 - Web Development", "Period 3"),
    ("Period 5 - Programming", "Period 5"),
    ("Period 7 - Data Structures", "Period 7"),
];

/// `(prompt, category)` of the built-in exit-ticket library.
pub const DEFAULT_PROMPTS: [(&str, &str); 17] = [
    ("What was the most challenging concept from today's lesson?", "reflection"),
    ("How would you explain today's topic to a friend?", "reflection"),
    ("What questions do you still have?", "reflection"),
    ("Rate your understanding from 1-5 and explain why.", "reflection"),
    ("What's one thing you want to practice more?", "reflection"),
    ("What were the three main points from today's lesson?", "comprehension"),
    ("How does today's topic connect to what we learned last week?", "comprehension"),
    ("Define the key terms we discussed today in your own words.", "comprehension"),
    ("What examples helped you understand the concept best?", "comprehension"),
    ("How could you use today's concept outside of class?", "application"),
    ("What would happen if we changed one variable in today's problem?", "application"),
    ("Create your own example using today's concept.", "application"),
    ("What tools or resources would help you apply this concept?", "application"),
    ("What part of today's lesson helped you learn the most?", "feedback"),
    ("What is one thing that would have made today's class better?", "feedback"),
    ("Was the pace of today's lesson too fast, too slow, or just right?", "feedback"),
    ("Which activity would you like to do again?", "feedback"),
];
