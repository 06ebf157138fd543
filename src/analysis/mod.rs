pub mod dimensions;

use std::time::Duration;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::process::Command;

use crate::edgar::text::truncate_chars;

/// Evidence quotes are clipped to keep stored results bounded.
const MAX_EVIDENCE_CHARS: usize = 500;

/// The five scoring axes. Weights are fixed and sum to 1.00 by construction;
/// they are never renormalized, even when a dimension degrades to fallback.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(try_from = "String", into = "String")]
pub enum Dimension {
    AiNarrative,
    GuidanceAccuracy,
    RiskDrift,
    CapitalHonesty,
    EsgSubstance,
}

impl Dimension {
    pub const ALL: [Dimension; 5] = [
        Dimension::AiNarrative,
        Dimension::GuidanceAccuracy,
        Dimension::RiskDrift,
        Dimension::CapitalHonesty,
        Dimension::EsgSubstance,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Dimension::AiNarrative => "ai_narrative",
            Dimension::GuidanceAccuracy => "guidance_accuracy",
            Dimension::RiskDrift => "risk_drift",
            Dimension::CapitalHonesty => "capital_honesty",
            Dimension::EsgSubstance => "esg_substance",
        }
    }

    pub fn weight(&self) -> f64 {
        match self {
            Dimension::AiNarrative => 0.25,
            Dimension::GuidanceAccuracy => 0.25,
            Dimension::RiskDrift => 0.20,
            Dimension::CapitalHonesty => 0.15,
            Dimension::EsgSubstance => 0.15,
        }
    }
}

impl std::fmt::Display for Dimension {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Dimension {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Dimension> {
        match s {
            "ai_narrative" => Ok(Dimension::AiNarrative),
            "guidance_accuracy" => Ok(Dimension::GuidanceAccuracy),
            "risk_drift" => Ok(Dimension::RiskDrift),
            "capital_honesty" => Ok(Dimension::CapitalHonesty),
            "esg_substance" => Ok(Dimension::EsgSubstance),
            _ => Err(anyhow!("Unknown dimension: {}", s)),
        }
    }
}

impl TryFrom<String> for Dimension {
    type Error = anyhow::Error;

    fn try_from(s: String) -> Result<Dimension> {
        s.parse()
    }
}

impl From<Dimension> for String {
    fn from(d: Dimension) -> String {
        d.as_str().to_string()
    }
}

/// Structured judgment for one dimension.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DimensionResult {
    pub dimension: Dimension,
    pub score: u8,
    pub evidence: Vec<String>,
    pub flags: Vec<String>,
    pub summary: String,
}

impl DimensionResult {
    /// Deterministic result for a missing-input or failed-analysis path:
    /// no evidence, one explanatory flag.
    pub fn fallback(
        dimension: Dimension,
        score: u8,
        flag: impl Into<String>,
        summary: impl Into<String>,
    ) -> Self {
        DimensionResult {
            dimension,
            score,
            evidence: Vec::new(),
            flags: vec![flag.into()],
            summary: summary.into(),
        }
    }
}

/// Capability seam for the external text-analysis service. Implementations
/// must bound their own execution time; tests substitute a canned stub.
#[async_trait]
pub trait Analyzer: Send + Sync {
    async fn analyze(&self, prompt: &str) -> Result<String>;
}

/// Invokes an external analysis command (`<cmd> -p <prompt>`) and captures
/// its stdout, bounded by a fixed timeout.
pub struct SubprocessAnalyzer {
    command: String,
    timeout: Duration,
}

impl SubprocessAnalyzer {
    pub fn new(command: impl Into<String>, timeout: Duration) -> Self {
        SubprocessAnalyzer {
            command: command.into(),
            timeout,
        }
    }
}

#[async_trait]
impl Analyzer for SubprocessAnalyzer {
    async fn analyze(&self, prompt: &str) -> Result<String> {
        let output = tokio::time::timeout(
            self.timeout,
            Command::new(&self.command).arg("-p").arg(prompt).output(),
        )
        .await
        .map_err(|_| anyhow!("Analysis command timed out after {:?}", self.timeout))??;

        if !output.status.success() {
            log::warn!("Analysis command exited with {}", output.status);
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}

#[derive(Deserialize)]
struct RawJudgment {
    dimension: String,
    score: i64,
    #[serde(default)]
    evidence: Vec<String>,
    #[serde(default)]
    flags: Vec<String>,
    #[serde(default)]
    summary: String,
}

/// Extracts the structured judgment from freeform service output: the slice
/// from the first `{` to the last `}` must decode to an object carrying the
/// expected dimension and an integer score in 0..=100. Anything else is
/// rejected and the caller falls back to its neutral default.
pub fn parse_judgment(raw: &str, expected: Dimension) -> Option<DimensionResult> {
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    if end < start {
        return None;
    }

    let parsed: RawJudgment = serde_json::from_str(&raw[start..=end]).ok()?;
    let dimension: Dimension = parsed.dimension.parse().ok()?;
    if dimension != expected {
        log::warn!(
            "Analysis returned dimension {} where {} was expected",
            dimension,
            expected
        );
        return None;
    }
    if !(0..=100).contains(&parsed.score) {
        return None;
    }

    Some(DimensionResult {
        dimension,
        score: parsed.score as u8,
        evidence: parsed
            .evidence
            .into_iter()
            .map(|q| truncate_chars(&q, MAX_EVIDENCE_CHARS).to_string())
            .collect(),
        flags: parsed.flags,
        summary: parsed.summary,
    })
}

/// One bounded service call plus parsing. `None` covers every failure mode:
/// process error, timeout, non-JSON output, missing or invalid fields.
pub async fn analyze_dimension(
    analyzer: &dyn Analyzer,
    dimension: Dimension,
    prompt: &str,
) -> Option<DimensionResult> {
    match analyzer.analyze(prompt).await {
        Ok(raw) => parse_judgment(&raw, dimension),
        Err(e) => {
            log::warn!("Analysis call for {} failed: {}", dimension, e);
            None
        }
    }
}
