//! Prompt Library for the chat assistant
//!
//! Prompts are loaded with a two-layer resolution:
//! 1. Check for override in data dir (~/.local/share/wimpi/prompts/overrides/)
//! 2. Fall back to embedded defaults (compiled into binary)
//!
//! This allows users to customize prompts without modifying the source,
//! while automatically getting new default prompts on upgrade.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::PathBuf;
use std::str::FromStr;

use serde::Deserialize;

use crate::error::{Error, Result};

/// Embedded default prompts (compiled into binary)
mod defaults {
    pub const SYSTEM: &str = include_str!("../../../prompts/system.md");
    pub const ANALYZE_EXPENSES: &str = include_str!("../../../prompts/analyze_expenses.md");
    pub const SAVINGS_ADVICE: &str = include_str!("../../../prompts/savings_advice.md");
    pub const FINANCIAL_INSIGHT: &str = include_str!("../../../prompts/financial_insight.md");
    pub const PRIORITY_ADVICE: &str = include_str!("../../../prompts/priority_advice.md");
}

/// Known prompt IDs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PromptId {
    /// Persona and answer format, prepended to every request
    System,
    AnalyzeExpenses,
    SavingsAdvice,
    FinancialInsight,
    PriorityAdvice,
}

impl PromptId {
    /// Get the string identifier for this prompt
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::System => "system",
            Self::AnalyzeExpenses => "analyze_expenses",
            Self::SavingsAdvice => "savings_advice",
            Self::FinancialInsight => "financial_insight",
            Self::PriorityAdvice => "priority_advice",
        }
    }

    /// Get all known prompt IDs
    pub fn all() -> &'static [PromptId] {
        &[
            Self::System,
            Self::AnalyzeExpenses,
            Self::SavingsAdvice,
            Self::FinancialInsight,
            Self::PriorityAdvice,
        ]
    }

    /// Get the default embedded content for this prompt
    fn default_content(&self) -> &'static str {
        match self {
            Self::System => defaults::SYSTEM,
            Self::AnalyzeExpenses => defaults::ANALYZE_EXPENSES,
            Self::SavingsAdvice => defaults::SAVINGS_ADVICE,
            Self::FinancialInsight => defaults::FINANCIAL_INSIGHT,
            Self::PriorityAdvice => defaults::PRIORITY_ADVICE,
        }
    }
}

impl fmt::Display for PromptId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for PromptId {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::all()
            .iter()
            .find(|id| id.as_str() == s)
            .copied()
            .ok_or_else(|| {
                let valid: Vec<&str> = Self::all().iter().map(|id| id.as_str()).collect();
                format!("Unknown prompt: {} (valid: {})", s, valid.join(", "))
            })
    }
}

/// Prompt frontmatter metadata
#[derive(Debug, Clone, Deserialize)]
pub struct PromptMetadata {
    /// Unique identifier
    pub id: String,
    /// Version number for tracking changes
    pub version: u32,
    /// What the prompt is used for
    #[serde(default)]
    pub purpose: String,
}

/// A loaded prompt with metadata and content
#[derive(Debug, Clone)]
pub struct Prompt {
    /// Metadata from frontmatter
    pub metadata: PromptMetadata,
    /// The prompt body
    pub content: String,
    /// Whether this came from an override file
    pub is_override: bool,
    /// Path to override file (if any)
    pub override_path: Option<PathBuf>,
}

impl Prompt {
    /// Render the prompt with template variables replaced
    ///
    /// `{{#if var}}...{{/if}}` blocks are kept only when `var` is present and
    /// non-empty; `{{var}}` placeholders are then substituted.
    pub fn render(&self, vars: &HashMap<&str, String>) -> String {
        let mut result = remove_unmatched_conditionals(&self.content, vars);

        // Simple mustache-style replacement: {{var}}
        for (key, value) in vars {
            let pattern = format!("{{{{{}}}}}", key);
            result = result.replace(&pattern, value);
        }

        result
    }
}

/// Prompt library for loading and caching prompts
pub struct PromptLibrary {
    /// Override directory path
    override_dir: Option<PathBuf>,
    /// Cached parsed prompts
    cache: HashMap<PromptId, Prompt>,
}

impl PromptLibrary {
    /// Create a new prompt library with default paths
    pub fn new() -> Self {
        Self {
            override_dir: default_prompts_dir(),
            cache: HashMap::new(),
        }
    }

    /// Create a prompt library with a custom override directory
    pub fn with_override_dir(path: PathBuf) -> Self {
        Self {
            override_dir: Some(path),
            cache: HashMap::new(),
        }
    }

    /// Create a prompt library with no override directory (embedded only)
    pub fn embedded_only() -> Self {
        Self {
            override_dir: None,
            cache: HashMap::new(),
        }
    }

    /// Get a prompt by ID, loading from override or default
    pub fn get(&mut self, id: PromptId) -> Result<&Prompt> {
        let prompt = match self.cache.entry(id) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => {
                let prompt = load(self.override_dir.as_ref(), id)?;
                entry.insert(prompt)
            }
        };
        Ok(prompt)
    }

    /// List all prompts with their override status
    pub fn list(&mut self) -> Vec<PromptInfo> {
        PromptId::all()
            .iter()
            .map(|&id| {
                let override_path = self.override_path(id);
                let prompt = self.get(id).ok();
                PromptInfo {
                    id: id.as_str().to_string(),
                    version: prompt.map(|p| p.metadata.version).unwrap_or(0),
                    purpose: prompt
                        .map(|p| p.metadata.purpose.clone())
                        .unwrap_or_default(),
                    has_override: override_path.is_some(),
                    override_path,
                }
            })
            .collect()
    }

    /// Check if a prompt has an override file
    pub fn has_override(&self, id: PromptId) -> bool {
        self.override_path(id).is_some()
    }

    fn override_path(&self, id: PromptId) -> Option<PathBuf> {
        self.override_dir
            .as_ref()
            .map(|d| d.join(format!("{}.md", id.as_str())))
            .filter(|p| p.exists())
    }

    /// Get the override directory path
    pub fn override_dir(&self) -> Option<&PathBuf> {
        self.override_dir.as_ref()
    }

    /// Clear the cache (useful after editing override files)
    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }
}

impl Default for PromptLibrary {
    fn default() -> Self {
        Self::new()
    }
}

/// Information about a prompt for listing
#[derive(Debug, Clone)]
pub struct PromptInfo {
    /// Prompt identifier
    pub id: String,
    /// Version from metadata
    pub version: u32,
    /// Purpose from metadata
    pub purpose: String,
    /// Whether an override exists
    pub has_override: bool,
    /// Path to override file (if exists)
    pub override_path: Option<PathBuf>,
}

/// Default prompts override directory
pub fn default_prompts_dir() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| d.join("wimpi").join("prompts").join("overrides"))
}

/// Load a prompt (checking override first, then default)
fn load(override_dir: Option<&PathBuf>, id: PromptId) -> Result<Prompt> {
    if let Some(override_dir) = override_dir {
        let override_path = override_dir.join(format!("{}.md", id.as_str()));
        if override_path.exists() {
            let content = fs::read_to_string(&override_path).map_err(|e| {
                Error::InvalidData(format!("Failed to read prompt override: {}", e))
            })?;
            let (metadata, body) = parse_prompt(&content)?;
            tracing::debug!(
                prompt = id.as_str(),
                path = %override_path.display(),
                "Using prompt override"
            );
            return Ok(Prompt {
                metadata,
                content: body,
                is_override: true,
                override_path: Some(override_path),
            });
        }
    }

    let (metadata, body) = parse_prompt(id.default_content())?;
    Ok(Prompt {
        metadata,
        content: body,
        is_override: false,
        override_path: None,
    })
}

/// Parse a prompt file into metadata and body
fn parse_prompt(content: &str) -> Result<(PromptMetadata, String)> {
    let content = content.trim();

    if !content.starts_with("---") {
        return Err(Error::InvalidData(
            "Prompt must start with YAML frontmatter (---)".into(),
        ));
    }

    let rest = &content[3..];
    let end = rest.find("---").ok_or_else(|| {
        Error::InvalidData("Prompt frontmatter not closed (missing second ---)".into())
    })?;

    let frontmatter = rest[..end].trim();
    let body = rest[end + 3..].trim();

    let metadata: PromptMetadata = serde_yaml::from_str(frontmatter)
        .map_err(|e| Error::InvalidData(format!("Invalid prompt frontmatter: {}", e)))?;

    Ok((metadata, body.to_string()))
}

/// Resolve `{{#if var}}...{{/if}}` blocks against the template variables
fn remove_unmatched_conditionals(content: &str, vars: &HashMap<&str, String>) -> String {
    let mut result = content.to_string();

    while let Some(if_start) = result.find("{{#if ") {
        let var_start = if_start + 6;
        let Some(var_end) = result[var_start..].find("}}") else {
            break;
        };
        let var_name = result[var_start..var_start + var_end].trim();
        let block_start = var_start + var_end + 2;

        let Some(endif_pos) = result[block_start..].find("{{/if}}") else {
            break;
        };
        let full_end = block_start + endif_pos + 7;

        let keep = vars.get(var_name).is_some_and(|v| !v.is_empty());
        result = if keep {
            format!(
                "{}{}{}",
                &result[..if_start],
                &result[block_start..block_start + endif_pos],
                &result[full_end..]
            )
        } else {
            format!("{}{}", &result[..if_start], &result[full_end..])
        };
    }

    result
}

/// Canned chat questions offered as shortcuts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QuickAction {
    Priority,
    Analyze,
    Expense,
    Tips,
    Savings,
    Predict,
}

impl QuickAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Priority => "priority",
            Self::Analyze => "analyze",
            Self::Expense => "expense",
            Self::Tips => "tips",
            Self::Savings => "savings",
            Self::Predict => "predict",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Priority => "Goal Priorities",
            Self::Analyze => "Financial Analysis",
            Self::Expense => "Spending Patterns",
            Self::Tips => "Saving Tips",
            Self::Savings => "Savings Advice",
            Self::Predict => "Balance Forecast",
        }
    }

    /// The question sent on the user's behalf
    pub fn question(&self) -> &'static str {
        match self {
            Self::Priority => {
                "Help me prioritize the goals and purchases I am planning. \
                 Order them from most important and explain why."
            }
            Self::Analyze => "How are my finances this month? Give me a short analysis.",
            Self::Expense => "What is my biggest expense this month and how can I reduce it?",
            Self::Tips => "Give me 3 practical tips to save money this month.",
            Self::Savings => {
                "How much should I ideally save every month based on my finances?"
            }
            Self::Predict => {
                "Based on my spending patterns, roughly what will my balance be \
                 at the end of this month?"
            }
        }
    }

    pub fn all() -> &'static [QuickAction] {
        &[
            Self::Priority,
            Self::Analyze,
            Self::Expense,
            Self::Tips,
            Self::Savings,
            Self::Predict,
        ]
    }
}

impl fmt::Display for QuickAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for QuickAction {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let s = s.to_lowercase();
        Self::all()
            .iter()
            .find(|a| a.as_str() == s)
            .copied()
            .ok_or_else(|| {
                format!(
                    "Unknown quick action: {} (valid: priority, analyze, expense, tips, savings, predict)",
                    s
                )
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&'static str, &str)]) -> HashMap<&'static str, String> {
        pairs.iter().map(|(k, v)| (*k, v.to_string())).collect()
    }

    #[test]
    fn test_parse_prompt() {
        let content = r#"---
id: test_prompt
version: 2
purpose: testing
---

Test prompt with {{variable}}.
"#;

        let (metadata, body) = parse_prompt(content).unwrap();
        assert_eq!(metadata.id, "test_prompt");
        assert_eq!(metadata.version, 2);
        assert_eq!(metadata.purpose, "testing");
        assert_eq!(body, "Test prompt with {{variable}}.");
    }

    #[test]
    fn test_parse_prompt_errors() {
        assert!(parse_prompt("no frontmatter").is_err());
        assert!(parse_prompt("---\nid: x\nversion: 1\n").is_err());
        assert!(parse_prompt("---\nversion: one\n---\nbody").is_err());
    }

    #[test]
    fn test_prompt_render() {
        let prompt = Prompt {
            metadata: PromptMetadata {
                id: "test".into(),
                version: 1,
                purpose: String::new(),
            },
            content: "Hello {{name}}, your value is {{value}}.".into(),
            is_override: false,
            override_path: None,
        };

        let rendered = prompt.render(&vars(&[("name", "World"), ("value", "42")]));
        assert_eq!(rendered, "Hello World, your value is 42.");
    }

    #[test]
    fn test_conditional_blocks() {
        let content = "Start{{#if category}}\nCategory: {{category}}{{/if}}\nEnd";

        let result = remove_unmatched_conditionals(content, &vars(&[("category", "Food")]));
        assert_eq!(result, "Start\nCategory: {{category}}\nEnd");

        let result = remove_unmatched_conditionals(content, &vars(&[("category", "")]));
        assert_eq!(result, "Start\nEnd");

        let result = remove_unmatched_conditionals(content, &HashMap::new());
        assert_eq!(result, "Start\nEnd");
    }

    #[test]
    fn test_prompt_library_embedded() {
        let mut lib = PromptLibrary::embedded_only();

        for id in PromptId::all() {
            let prompt = lib.get(*id).unwrap();
            assert!(!prompt.is_override);
            assert_eq!(prompt.metadata.id, id.as_str());
            assert!(!prompt.content.is_empty());
        }
    }

    #[test]
    fn test_prompt_override() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("financial_insight.md"),
            "---\nid: financial_insight\nversion: 9\npurpose: custom\n---\nOne line only.",
        )
        .unwrap();

        let mut lib = PromptLibrary::with_override_dir(dir.path().to_path_buf());
        let prompt = lib.get(PromptId::FinancialInsight).unwrap();
        assert!(prompt.is_override);
        assert_eq!(prompt.metadata.version, 9);
        assert_eq!(prompt.content, "One line only.");

        let listed = lib.list();
        assert_eq!(listed.len(), 5);
        let insight = listed.iter().find(|p| p.id == "financial_insight").unwrap();
        assert!(insight.has_override);
        assert!(!listed.iter().find(|p| p.id == "system").unwrap().has_override);
    }

    #[test]
    fn test_savings_prompt_conditionals() {
        let mut lib = PromptLibrary::embedded_only();
        let prompt = lib.get(PromptId::SavingsAdvice).unwrap();

        let without = prompt.render(&vars(&[("goal_name", "Laptop"), ("deadline", "Not set")]));
        assert!(without.contains("- Goal name: Laptop"));
        assert!(!without.contains("Time left"));
        assert!(!without.contains("{{#if"));
        assert!(!without.contains("{{weeks_remaining}}"));

        let with = prompt.render(&vars(&[
            ("goal_name", "Laptop"),
            ("weeks_remaining", "10"),
            ("weekly_required", "Rp 100.000"),
        ]));
        assert!(with.contains("- Time left: 10 weeks"));
        assert!(with.contains("(simple calculation): Rp 100.000"));
    }

    #[test]
    fn test_prompt_id_parse() {
        assert_eq!(
            "priority_advice".parse::<PromptId>().unwrap(),
            PromptId::PriorityAdvice
        );
        assert!("explain".parse::<PromptId>().is_err());
    }

    #[test]
    fn test_quick_actions() {
        assert_eq!(QuickAction::all().len(), 6);
        assert_eq!("TIPS".parse::<QuickAction>().unwrap(), QuickAction::Tips);
        assert!("joke".parse::<QuickAction>().is_err());
        for action in QuickAction::all() {
            assert!(!action.label().is_empty());
            assert!(action.question().ends_with(['.', '?']));
        }
    }
}
