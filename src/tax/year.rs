use chrono::{Datelike, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;
use schemars::JsonSchema;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::EngineError;

static TAX_YEAR_FORMAT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d{4})-(\d{2})$").expect("tax year pattern is valid")
});

/// Tax band for income and dividend tax calculations.
///
/// `Starter`, `Intermediate` and `Advanced` only occur on the Scottish
/// schedule. `Additional` doubles as the Scottish top rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub enum TaxBand {
    Starter,
    #[default]
    Basic,
    Intermediate,
    Higher,
    Advanced,
    Additional,
}

impl TaxBand {
    pub fn display(&self) -> &'static str {
        match self {
            TaxBand::Starter => "Starter",
            TaxBand::Basic => "Basic",
            TaxBand::Intermediate => "Intermediate",
            TaxBand::Higher => "Higher",
            TaxBand::Advanced => "Advanced",
            TaxBand::Additional => "Additional",
        }
    }
}

impl std::fmt::Display for TaxBand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display())
    }
}

/// UK Tax Year (runs 6 April to 5 April)
/// The year value represents the end year (e.g., 2025 = 2024-25 tax year)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaxYear(pub i32);

impl TaxYear {
    /// Parse the `YYYY-YY` form, e.g. `2024-25`.
    ///
    /// The second half must be the year after the first.
    pub fn parse(s: &str) -> Result<Self, EngineError> {
        let invalid = || EngineError::InvalidTaxYear(s.to_string());
        let caps = TAX_YEAR_FORMAT.captures(s.trim()).ok_or_else(invalid)?;
        let start: i32 = caps[1].parse().map_err(|_| invalid())?;
        let end_suffix: i32 = caps[2].parse().map_err(|_| invalid())?;
        if (start + 1) % 100 != end_suffix {
            return Err(invalid());
        }
        Ok(TaxYear(start + 1))
    }

    /// Create a tax year from a date
    pub fn from_date(date: NaiveDate) -> Self {
        let year = date.year();
        // Tax year starts 6 April
        if (date.month(), date.day()) >= (4, 6) {
            TaxYear(year + 1)
        } else {
            TaxYear(year)
        }
    }

    /// Start date of the tax year (6 April of previous year)
    pub fn start_date(&self) -> NaiveDate {
        ymd(self.0 - 1, 4, 6)
    }

    /// End date of the tax year (5 April)
    pub fn end_date(&self) -> NaiveDate {
        ymd(self.0, 4, 5)
    }

    /// Company tax return reminder date: 31 December after the tax year ends.
    pub fn ct600_deadline(&self) -> NaiveDate {
        ymd(self.0, 12, 31)
    }

    /// Online Self Assessment deadline: 31 January after the tax year ends.
    pub fn self_assessment_deadline(&self) -> NaiveDate {
        ymd(self.0 + 1, 1, 31)
    }

    /// Display as "2024-25" format
    pub fn display(&self) -> String {
        format!("{}-{:02}", self.0 - 1, self.0 % 100)
    }
}

/// Next RTI submission cut-off (the 19th) on or after `as_of`.
pub fn next_rti_deadline(as_of: NaiveDate) -> NaiveDate {
    if as_of.day() <= 19 {
        ymd(as_of.year(), as_of.month(), 19)
    } else if as_of.month() == 12 {
        ymd(as_of.year() + 1, 1, 19)
    } else {
        ymd(as_of.year(), as_of.month() + 1, 19)
    }
}

fn ymd(year: i32, month: u32, day: u32) -> NaiveDate {
    // only ever called with fixed calendar days that exist in every year
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or(NaiveDate::MIN)
}

impl std::fmt::Display for TaxYear {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display())
    }
}

impl std::str::FromStr for TaxYear {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TaxYear::parse(s)
    }
}

impl Serialize for TaxYear {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.display())
    }
}

impl<'de> Deserialize<'de> for TaxYear {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        TaxYear::parse(&s).map_err(serde::de::Error::custom)
    }
}

impl JsonSchema for TaxYear {
    fn schema_name() -> String {
        "TaxYear".to_string()
    }

    fn json_schema(gen: &mut schemars::gen::SchemaGenerator) -> schemars::schema::Schema {
        let mut schema = String::json_schema(gen).into_object();
        schema.string().pattern = Some(r"^\d{4}-\d{2}$".to_string());
        schema.into()
    }
}
