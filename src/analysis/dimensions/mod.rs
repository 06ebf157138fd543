pub mod ai_narrative;
pub mod capital_honesty;
pub mod esg_substance;
pub mod guidance_accuracy;
pub mod risk_drift;

use async_trait::async_trait;

use super::{Analyzer, Dimension, DimensionResult};
use crate::edgar::tickers::Ticker;
use crate::fetch::FilingBundle;

/// One scoring unit. Each unit declares which bundle slots it needs, builds
/// a bounded prompt, and degrades to a documented default when its inputs
/// are absent or the analysis service fails. Units are independent: no unit
/// reads another's output.
#[async_trait]
pub trait DimensionScorer: Send + Sync {
    fn dimension(&self) -> Dimension;

    async fn score(
        &self,
        ticker: &Ticker,
        bundle: &FilingBundle,
        analyzer: &dyn Analyzer,
    ) -> DimensionResult;
}

/// All five units in weight-table order.
pub fn all_scorers() -> Vec<Box<dyn DimensionScorer>> {
    vec![
        Box::new(ai_narrative::AiNarrative),
        Box::new(guidance_accuracy::GuidanceAccuracy),
        Box::new(risk_drift::RiskDrift),
        Box::new(capital_honesty::CapitalHonesty),
        Box::new(esg_substance::EsgSubstance),
    ]
}

pub(crate) const SERVICE_FAILED_FLAG: &str = "Analysis service failed — defaulting to 50";
