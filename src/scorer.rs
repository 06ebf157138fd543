use std::collections::BTreeMap;

use anyhow::anyhow;
use chrono::{DateTime, Datelike, Local, Utc};
use serde::{Deserialize, Serialize};

use crate::analysis::dimensions::all_scorers;
use crate::analysis::{Analyzer, Dimension, DimensionResult};
use crate::edgar::tickers::Ticker;
use crate::fetch::{FilingBundle, FilingFetcher};

/// Substituted for any dimension missing from the result map.
pub const FALLBACK_SCORE: u8 = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Verdict {
    HighNarrativeIntegrity,
    ModerateMonitor,
    SignificantNarrativeGap,
    HighDivergence,
}

impl Verdict {
    /// Bands are right-inclusive on the lower bound: exactly 80 is the top.
    pub fn for_score(composite: u8) -> Verdict {
        if composite >= 80 {
            Verdict::HighNarrativeIntegrity
        } else if composite >= 60 {
            Verdict::ModerateMonitor
        } else if composite >= 40 {
            Verdict::SignificantNarrativeGap
        } else {
            Verdict::HighDivergence
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Verdict::HighNarrativeIntegrity => "High Narrative Integrity",
            Verdict::ModerateMonitor => "Moderate — Monitor",
            Verdict::SignificantNarrativeGap => "Significant Narrative Gap",
            Verdict::HighDivergence => "High Divergence — Red Flags",
        }
    }
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl TryFrom<String> for Verdict {
    type Error = anyhow::Error;

    fn try_from(s: String) -> anyhow::Result<Verdict> {
        match s.as_str() {
            "High Narrative Integrity" => Ok(Verdict::HighNarrativeIntegrity),
            "Moderate — Monitor" => Ok(Verdict::ModerateMonitor),
            "Significant Narrative Gap" => Ok(Verdict::SignificantNarrativeGap),
            "High Divergence — Red Flags" => Ok(Verdict::HighDivergence),
            _ => Err(anyhow!("Unknown verdict: {}", s)),
        }
    }
}

impl From<Verdict> for String {
    fn from(v: Verdict) -> String {
        v.label().to_string()
    }
}

/// Quarter label for the current calendar quarter, e.g. `Q3-2026`.
pub fn current_quarter() -> String {
    let now = Local::now();
    format!("Q{}-{}", (now.month() - 1) / 3 + 1, now.year())
}

/// The unit of persistence and display: one scoring run for one ticker.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompositeResult {
    pub ticker: String,
    pub company: String,
    pub quarter: String,
    pub composite_score: u8,
    pub verdict: Verdict,
    pub dimensions: BTreeMap<Dimension, DimensionResult>,
    pub scanned_at: DateTime<Utc>,
}

impl CompositeResult {
    pub fn dimension_score(&self, dimension: Dimension) -> Option<u8> {
        self.dimensions.get(&dimension).map(|r| r.score)
    }
}

/// Weighted reduction over the fixed dimension set. Weights sum to 1.00 by
/// construction and are not renormalized when a dimension is missing; the
/// neutral 50 stands in instead.
pub fn composite_of(dimensions: &BTreeMap<Dimension, DimensionResult>) -> u8 {
    let weighted: f64 = Dimension::ALL
        .iter()
        .map(|d| {
            let score = dimensions.get(d).map(|r| r.score).unwrap_or(FALLBACK_SCORE);
            f64::from(score) * d.weight()
        })
        .sum();
    weighted.round() as u8
}

/// Runs all five scorers over an already-fetched bundle. Scorers are
/// independent and order-insensitive; every one of them returns a result,
/// so a run always produces a complete CompositeResult.
pub async fn score_bundle(
    ticker: &Ticker,
    quarter: String,
    bundle: &FilingBundle,
    analyzer: &dyn Analyzer,
) -> CompositeResult {
    let mut dimensions = BTreeMap::new();
    for scorer in all_scorers() {
        log::info!("[{}] Scoring: {}", ticker, scorer.dimension());
        let result = scorer.score(ticker, bundle, analyzer).await;
        log::info!("[{}] {} -> {}", ticker, result.dimension, result.score);
        dimensions.insert(result.dimension, result);
    }

    let composite = composite_of(&dimensions);

    // Display name prefers the annual filing's resolution, then the proxy's.
    let company = bundle
        .annual
        .as_ref()
        .map(|d| d.company.clone())
        .or_else(|| bundle.proxy.as_ref().map(|d| d.company.clone()))
        .unwrap_or_else(|| ticker.to_string());

    CompositeResult {
        ticker: ticker.to_string(),
        company,
        quarter,
        composite_score: composite,
        verdict: Verdict::for_score(composite),
        dimensions,
        scanned_at: Utc::now(),
    }
}

/// Full scoring run: fetch the bundle once, fan out to the scorers, reduce.
pub async fn run(
    fetcher: &FilingFetcher,
    analyzer: &dyn Analyzer,
    ticker: &Ticker,
    quarter: Option<String>,
) -> CompositeResult {
    let quarter = quarter.unwrap_or_else(current_quarter);
    log::info!("Scoring {} for {}", ticker, quarter);

    let bundle = fetcher.fetch_bundle(ticker).await;
    score_bundle(ticker, quarter, &bundle, analyzer).await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(dimension: Dimension, score: u8) -> DimensionResult {
        DimensionResult {
            dimension,
            score,
            evidence: Vec::new(),
            flags: Vec::new(),
            summary: String::new(),
        }
    }

    fn map_of(scores: [(Dimension, u8); 5]) -> BTreeMap<Dimension, DimensionResult> {
        scores
            .into_iter()
            .map(|(d, s)| (d, result(d, s)))
            .collect()
    }

    #[test]
    fn composite_is_the_rounded_weighted_sum() {
        let dims = map_of([
            (Dimension::AiNarrative, 25),
            (Dimension::GuidanceAccuracy, 90),
            (Dimension::RiskDrift, 60),
            (Dimension::CapitalHonesty, 70),
            (Dimension::EsgSubstance, 40),
        ]);
        // 25*.25 + 90*.25 + 60*.20 + 70*.15 + 40*.15 = 57.25
        assert_eq!(composite_of(&dims), 57);
        assert_eq!(Verdict::for_score(57), Verdict::ModerateMonitor);
    }

    #[test]
    fn missing_dimensions_substitute_fifty() {
        let dims = BTreeMap::new();
        assert_eq!(composite_of(&dims), 50);
    }

    #[test]
    fn verdict_band_edges() {
        assert_eq!(Verdict::for_score(80), Verdict::HighNarrativeIntegrity);
        assert_eq!(Verdict::for_score(79), Verdict::ModerateMonitor);
        assert_eq!(Verdict::for_score(60), Verdict::ModerateMonitor);
        assert_eq!(Verdict::for_score(40), Verdict::SignificantNarrativeGap);
        assert_eq!(Verdict::for_score(39), Verdict::HighDivergence);
        assert_eq!(Verdict::for_score(0), Verdict::HighDivergence);
    }

    #[test]
    fn verdict_labels_round_trip() {
        for v in [
            Verdict::HighNarrativeIntegrity,
            Verdict::ModerateMonitor,
            Verdict::SignificantNarrativeGap,
            Verdict::HighDivergence,
        ] {
            assert_eq!(Verdict::try_from(v.label().to_string()).unwrap(), v);
        }
    }
}
