use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// Form types this system consumes. Everything else in a company's filing
/// history comes through as `Other` and is ignored by the fetcher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ReportType {
    Form10K,
    Form10KA,
    Form8K,
    FormDef14A,
    Other(String),
}

impl ReportType {
    /// Annual report, including the amended variant.
    pub fn is_annual(&self) -> bool {
        matches!(self, ReportType::Form10K | ReportType::Form10KA)
    }
}

impl TryFrom<String> for ReportType {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        ReportType::from_str(&s)
    }
}

impl From<ReportType> for String {
    fn from(r: ReportType) -> String {
        r.to_string()
    }
}

impl fmt::Display for ReportType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportType::Form10K => write!(f, "10-K"),
            ReportType::Form10KA => write!(f, "10-K/A"),
            ReportType::Form8K => write!(f, "8-K"),
            ReportType::FormDef14A => write!(f, "DEF 14A"),
            ReportType::Other(s) => write!(f, "{}", s),
        }
    }
}

impl FromStr for ReportType {
    type Err = String;

    fn from_str(s: &str) -> Result<ReportType, String> {
        match s.to_uppercase().as_str() {
            "10-K" => Ok(ReportType::Form10K),
            "10-K/A" => Ok(ReportType::Form10KA),
            "8-K" => Ok(ReportType::Form8K),
            "DEF 14A" => Ok(ReportType::FormDef14A),
            _ => Ok(ReportType::Other(s.to_string())),
        }
    }
}
