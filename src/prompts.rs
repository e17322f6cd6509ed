//! Exit-ticket usage reporting and selection over loaded prompt lists.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::csv;
use crate::models::ExitPromptRecord;
use crate::roster::random_index;

const RECENT_LIMIT: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptUsage {
    pub total: usize,
    pub custom: usize,
    pub used: usize,
    pub never_used: usize,
    pub by_category: BTreeMap<String, usize>,
    /// Newest first.
    pub recently_used: Vec<ExitPromptRecord>,
}

pub fn prompt_usage(prompts: &[ExitPromptRecord]) -> PromptUsage {
    let mut by_category: BTreeMap<String, usize> = BTreeMap::new();
    for p in prompts {
        *by_category.entry(p.category.clone()).or_insert(0) += 1;
    }

    let mut used: Vec<ExitPromptRecord> = prompts
        .iter()
        .filter(|p| p.used_at.is_some())
        .cloned()
        .collect();
    let used_count = used.len();
    // RFC 3339 UTC strings sort chronologically.
    used.sort_by(|a, b| b.used_at.cmp(&a.used_at));
    used.truncate(RECENT_LIMIT);

    PromptUsage {
        total: prompts.len(),
        custom: prompts.iter().filter(|p| p.is_custom).count(),
        used: used_count,
        never_used: prompts.len() - used_count,
        by_category,
        recently_used: used,
    }
}

pub fn prompts_csv(prompts: &[ExitPromptRecord]) -> String {
    let mut out = String::from("prompt,category,isCustom,usedAt\n");
    let rows: Vec<String> = prompts
        .iter()
        .map(|p| {
            format!(
                "{},{},{},{}",
                csv::quote(&p.prompt),
                csv::quote(&p.category),
                csv::quote(if p.is_custom { "Yes" } else { "No" }),
                csv::quote(p.used_at.as_deref().unwrap_or("Never"))
            )
        })
        .collect();
    out.push_str(&rows.join("\n"));
    out
}

pub fn pick_prompt(prompts: &[ExitPromptRecord]) -> Option<&ExitPromptRecord> {
    if prompts.is_empty() {
        return None;
    }
    Some(&prompts[random_index(prompts.len())])
}
