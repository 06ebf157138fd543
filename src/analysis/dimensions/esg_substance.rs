//! ESG substance, scored from the DEF 14A proxy statement.

use async_trait::async_trait;

use super::{DimensionScorer, SERVICE_FAILED_FLAG};
use crate::analysis::{analyze_dimension, Analyzer, Dimension, DimensionResult};
use crate::edgar::text::truncate_chars;
use crate::edgar::tickers::Ticker;
use crate::fetch::FilingBundle;

const PROMPT: &str = r#"You are analyzing a DEF 14A proxy statement to score the substantiveness of ESG disclosures.

Score whether ESG claims are backed by real metrics vs aspirational language:

Look for:
- Diversity: "We value diversity" vs "Board is 40% women, up from 30% in 2023"
- Climate: "Committed to sustainability" vs "Reduced Scope 1 emissions by 23% since 2020"
- Pay equity: "We pay fairly" vs "Women earn $0.98 per $1.00 vs men in comparable roles"
- Supply chain: "Responsible sourcing" vs specific audit numbers and remediation counts
- Governance: "Independent board oversight" vs actual independence metrics

Red flags:
- ESG section with zero numerical metrics
- Commitments without timelines ("we plan to...")
- Forward-looking claims dominate backward-looking results
- No third-party verification cited

Score 0-100 where:
- 90-100: Quantified, verified, specific ESG metrics with YoY progress
- 70-89: Mostly quantified with some aspirational gaps
- 50-69: Mix of metrics and aspirational language
- 30-49: Mostly aspirational with sparse metrics
- 0-29: Pure narrative — no substantive metrics, or section missing

Return JSON only (no markdown):
{
  "dimension": "esg_substance",
  "score": <0-100 integer>,
  "evidence": ["<direct quote from proxy>", ...],
  "flags": ["<aspirational claim or missing metric>", ...],
  "summary": "<1-2 sentence summary>"
}

DEF 14A proxy statement:
"#;

const EXCERPT_MAX_CHARS: usize = 60_000;

pub struct EsgSubstance;

#[async_trait]
impl DimensionScorer for EsgSubstance {
    fn dimension(&self) -> Dimension {
        Dimension::EsgSubstance
    }

    async fn score(
        &self,
        ticker: &Ticker,
        bundle: &FilingBundle,
        analyzer: &dyn Analyzer,
    ) -> DimensionResult {
        let proxy = match &bundle.proxy {
            Some(doc) => doc,
            None => {
                return DimensionResult::fallback(
                    Dimension::EsgSubstance,
                    30,
                    "No DEF 14A proxy statement available — scoring conservatively",
                    "No proxy statement found. Cannot assess ESG disclosure quality.",
                )
            }
        };

        let prompt = format!("{}{}", PROMPT, truncate_chars(&proxy.text, EXCERPT_MAX_CHARS));
        log::debug!("[{}] {} prompt: {} chars", ticker, self.dimension(), prompt.len());

        match analyze_dimension(analyzer, Dimension::EsgSubstance, &prompt).await {
            Some(result) => result,
            None => DimensionResult::fallback(
                Dimension::EsgSubstance,
                50,
                SERVICE_FAILED_FLAG,
                "ESG substance analysis unavailable.",
            ),
        }
    }
}
