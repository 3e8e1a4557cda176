//! Locale-aware money and date formatting

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Display locale for amounts and dates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    /// Indonesian conventions (`Rp 1.250.000`, `19 Oktober 2026`)
    #[default]
    Id,
    /// English conventions (`Rp 1,250,000`, `October 19, 2026`)
    En,
}

const MONTHS_ID: [&str; 12] = [
    "Januari",
    "Februari",
    "Maret",
    "April",
    "Mei",
    "Juni",
    "Juli",
    "Agustus",
    "September",
    "Oktober",
    "November",
    "Desember",
];

const MONTHS_EN: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

impl Locale {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::En => "en",
        }
    }

    fn group_separator(&self) -> char {
        match self {
            Self::Id => '.',
            Self::En => ',',
        }
    }

    /// Full month name, `month` is 1-based
    pub fn month_name(&self, month: u32) -> &'static str {
        let idx = (month.clamp(1, 12) - 1) as usize;
        match self {
            Self::Id => MONTHS_ID[idx],
            Self::En => MONTHS_EN[idx],
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Locale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "id" | "id-id" => Ok(Self::Id),
            "en" | "en-us" => Ok(Self::En),
            _ => Err(format!("Unknown locale: {} (valid: id, en)", s)),
        }
    }
}

/// Format an amount as Rupiah with no decimal places
pub fn format_currency(amount: f64, locale: Locale) -> String {
    let rounded = amount.round();
    let sign = if rounded < 0.0 { "-" } else { "" };
    let digits = format!("{:.0}", rounded.abs());

    let sep = locale.group_separator();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(sep);
        }
        grouped.push(ch);
    }

    format!("{}Rp {}", sign, grouped)
}

/// Long date, e.g. `19 Oktober 2026` or `October 19, 2026`
pub fn format_long_date(date: NaiveDate, locale: Locale) -> String {
    let month = locale.month_name(date.month());
    match locale {
        Locale::Id => format!("{} {} {}", date.day(), month, date.year()),
        Locale::En => format!("{} {}, {}", month, date.day(), date.year()),
    }
}

/// Numeric date, e.g. `19/10/2026` or `10/19/2026`
pub fn format_short_date(date: NaiveDate, locale: Locale) -> String {
    match locale {
        Locale::Id => date.format("%-d/%-m/%Y").to_string(),
        Locale::En => date.format("%-m/%-d/%Y").to_string(),
    }
}
