//! Advisor and display configuration
//!
//! Config is loaded with a two-layer resolution:
//! 1. Explicit path, else the override in the data dir
//!    (~/.local/share/wimpi/config/advisor.toml)
//! 2. Fall back to embedded defaults (compiled into binary)
//!
//! Keys missing from an override keep their default values.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::advisor::Markup;
use crate::currency::Locale;
use crate::error::{Error, Result};
use crate::models::Frequency;

/// Embedded default config (compiled into binary)
const DEFAULT_CONFIG: &str = include_str!("../../../config/advisor.toml");

/// How window totals are turned into monthly averages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AveragingPolicy {
    /// Always divide by this many months, even when history is shorter
    Fixed(u32),
    /// Divide by the calendar months covered by the oldest in-window transaction
    ElapsedMonths,
}

impl Default for AveragingPolicy {
    fn default() -> Self {
        Self::Fixed(6)
    }
}

/// Tunables for the goal advisor
#[derive(Debug, Clone, PartialEq)]
pub struct AdvisorConfig {
    pub lookback_months: u32,
    pub averaging: AveragingPolicy,
    pub net_worth_multiplier: f64,
    pub annual_income_months: f64,
    pub spending_warning_ratio: f64,
    pub revised_date_padding_days: i64,
    pub default_frequency: Frequency,
}

impl Default for AdvisorConfig {
    fn default() -> Self {
        Self {
            lookback_months: 6,
            averaging: AveragingPolicy::default(),
            net_worth_multiplier: 5.0,
            annual_income_months: 12.0,
            spending_warning_ratio: 0.8,
            revised_date_padding_days: 7,
            default_frequency: Frequency::Weekly,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DisplayConfig {
    pub locale: Locale,
    pub markup: Markup,
}

/// Spending bucket a category belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CategoryBucket {
    Needs,
    Wants,
    Savings,
}

impl CategoryBucket {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Needs => "needs",
            Self::Wants => "wants",
            Self::Savings => "savings",
        }
    }
}

/// Explicit category-to-bucket mapping (case-insensitive, whole name)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CategoryBuckets {
    map: HashMap<String, CategoryBucket>,
}

impl CategoryBuckets {
    pub fn new() -> Self {
        Self::default()
    }

    /// Assign a category to a bucket, replacing any earlier assignment
    pub fn insert(&mut self, category: &str, bucket: CategoryBucket) {
        self.map.insert(category.trim().to_lowercase(), bucket);
    }

    /// Bucket for a category, `None` when unmapped
    pub fn bucket_of(&self, category: &str) -> Option<CategoryBucket> {
        self.map.get(&category.trim().to_lowercase()).copied()
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

/// Full Wimpi configuration
#[derive(Debug, Clone, PartialEq)]
pub struct WimpiConfig {
    pub advisor: AdvisorConfig,
    pub display: DisplayConfig,
    pub categories: CategoryBuckets,
}

impl Default for WimpiConfig {
    fn default() -> Self {
        // The embedded file is validated by tests; fall back to bare defaults anyway
        parse_config(DEFAULT_CONFIG).unwrap_or_else(|_| Self {
            advisor: AdvisorConfig::default(),
            display: DisplayConfig::default(),
            categories: CategoryBuckets::default(),
        })
    }
}

impl WimpiConfig {
    /// Load configuration from `override_path`, else the data-dir override
    /// when present, else the embedded defaults
    ///
    /// An explicit path must exist; only the data-dir override is optional.
    pub fn load(override_path: Option<&Path>) -> Result<Self> {
        match override_path {
            Some(path) => load_file(path),
            None => match default_config_path().filter(|p| p.exists()) {
                Some(path) => load_file(&path),
                None => parse_config(DEFAULT_CONFIG),
            },
        }
    }

    /// The embedded default configuration text
    pub fn embedded_default() -> &'static str {
        DEFAULT_CONFIG
    }
}

fn load_file(path: &Path) -> Result<WimpiConfig> {
    tracing::debug!(path = %path.display(), "Loading advisor config override");
    let content = fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Failed to read {}: {}", path.display(), e)))?;
    parse_config(&content)
}

/// Default config override location
pub fn default_config_path() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| d.join("wimpi").join("config").join("advisor.toml"))
}

/// The override file that `WimpiConfig::load` would read, if any exists
pub fn resolve_config_path(override_path: Option<&Path>) -> Option<PathBuf> {
    match override_path {
        Some(path) => path.exists().then(|| path.to_path_buf()),
        None => default_config_path().filter(|p| p.exists()),
    }
}

/// Raw config structure for TOML parsing
#[derive(Debug, Deserialize)]
struct RawConfig {
    advisor: Option<RawAdvisor>,
    display: Option<RawDisplay>,
    categories: Option<RawCategories>,
}

#[derive(Debug, Deserialize)]
struct RawAdvisor {
    lookback_months: Option<u32>,
    averaging: Option<String>,
    averaging_months: Option<u32>,
    net_worth_multiplier: Option<f64>,
    annual_income_months: Option<f64>,
    spending_warning_ratio: Option<f64>,
    revised_date_padding_days: Option<i64>,
    default_frequency: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawDisplay {
    locale: Option<String>,
    markup: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawCategories {
    needs: Option<Vec<String>>,
    wants: Option<Vec<String>>,
    savings: Option<Vec<String>>,
}

/// Parse config from TOML content
fn parse_config(content: &str) -> Result<WimpiConfig> {
    let raw: RawConfig = toml::from_str(content)
        .map_err(|e| Error::Config(format!("Invalid config TOML: {}", e)))?;

    let mut advisor = AdvisorConfig::default();
    if let Some(a) = raw.advisor {
        if let Some(months) = a.lookback_months {
            if months == 0 {
                return Err(Error::Config("lookback_months must be at least 1".into()));
            }
            advisor.lookback_months = months;
        }
        let averaging_months = a.averaging_months.unwrap_or(advisor.lookback_months);
        advisor.averaging = match a.averaging.as_deref() {
            None | Some("fixed") => {
                if averaging_months == 0 {
                    return Err(Error::Config("averaging_months must be at least 1".into()));
                }
                AveragingPolicy::Fixed(averaging_months)
            }
            Some("elapsed") => AveragingPolicy::ElapsedMonths,
            Some(other) => {
                return Err(Error::Config(format!(
                    "Unknown averaging policy: {} (valid: fixed, elapsed)",
                    other
                )))
            }
        };
        if let Some(v) = a.net_worth_multiplier {
            advisor.net_worth_multiplier = v;
        }
        if let Some(v) = a.annual_income_months {
            advisor.annual_income_months = v;
        }
        if let Some(v) = a.spending_warning_ratio {
            advisor.spending_warning_ratio = v;
        }
        if let Some(v) = a.revised_date_padding_days {
            advisor.revised_date_padding_days = v;
        }
        if let Some(freq) = a.default_frequency {
            advisor.default_frequency = freq.parse().map_err(Error::Config)?;
        }
    }

    let mut display = DisplayConfig::default();
    if let Some(d) = raw.display {
        if let Some(locale) = d.locale {
            display.locale = locale.parse().map_err(Error::Config)?;
        }
        if let Some(markup) = d.markup {
            display.markup = markup.parse().map_err(Error::Config)?;
        }
    }

    let mut categories = CategoryBuckets::new();
    if let Some(c) = raw.categories {
        let groups = [
            (c.needs, CategoryBucket::Needs),
            (c.wants, CategoryBucket::Wants),
            (c.savings, CategoryBucket::Savings),
        ];
        for (names, bucket) in groups {
            for name in names.unwrap_or_default() {
                categories.insert(&name, bucket);
            }
        }
    }

    Ok(WimpiConfig {
        advisor,
        display,
        categories,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedded_default_parses() {
        let config = parse_config(DEFAULT_CONFIG).unwrap();
        assert_eq!(config.advisor, AdvisorConfig::default());
        assert_eq!(config.display.locale, Locale::Id);
        assert_eq!(config.display.markup, Markup::Html);
        assert_eq!(
            config.categories.bucket_of("hiburan"),
            Some(CategoryBucket::Wants)
        );
        assert_eq!(
            config.categories.bucket_of("Goal Savings"),
            Some(CategoryBucket::Savings)
        );
    }

    #[test]
    fn test_partial_override_keeps_defaults() {
        let config = parse_config(
            r#"
[advisor]
averaging = "elapsed"
spending_warning_ratio = 0.5

[display]
locale = "en"
"#,
        )
        .unwrap();
        assert_eq!(config.advisor.averaging, AveragingPolicy::ElapsedMonths);
        assert_eq!(config.advisor.spending_warning_ratio, 0.5);
        assert_eq!(config.advisor.lookback_months, 6);
        assert_eq!(config.display.locale, Locale::En);
        assert_eq!(config.display.markup, Markup::Html);
        assert!(config.categories.is_empty());
    }

    #[test]
    fn test_fixed_averaging_months() {
        let config = parse_config("[advisor]\naveraging_months = 3\n").unwrap();
        assert_eq!(config.advisor.averaging, AveragingPolicy::Fixed(3));
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(parse_config("[advisor]\naveraging = \"median\"\n").is_err());
        assert!(parse_config("[advisor]\nlookback_months = 0\n").is_err());
        assert!(parse_config("[advisor]\ndefault_frequency = \"yearly\"\n").is_err());
        assert!(parse_config("[display]\nmarkup = \"rtf\"\n").is_err());
        assert!(parse_config("not toml [").is_err());
    }

    #[test]
    fn test_category_matching_is_exact() {
        let mut buckets = CategoryBuckets::new();
        buckets.insert("Food", CategoryBucket::Wants);
        assert_eq!(buckets.bucket_of(" FOOD "), Some(CategoryBucket::Wants));
        assert_eq!(buckets.bucket_of("Seafood"), None);
        assert_eq!(buckets.bucket_of("Food delivery"), None);
    }

    #[test]
    fn test_load_from_file_and_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("advisor.toml");
        fs::write(&path, "[advisor]\nrevised_date_padding_days = 14\n").unwrap();

        let config = WimpiConfig::load(Some(&path)).unwrap();
        assert_eq!(config.advisor.revised_date_padding_days, 14);

        let missing = dir.path().join("nope.toml");
        assert!(matches!(
            WimpiConfig::load(Some(&missing)),
            Err(Error::Config(_))
        ));
    }
}
