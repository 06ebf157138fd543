//! AI narrative integrity, scored from the annual report.

use async_trait::async_trait;

use super::{DimensionScorer, SERVICE_FAILED_FLAG};
use crate::analysis::{analyze_dimension, Analyzer, Dimension, DimensionResult};
use crate::edgar::text::truncate_chars;
use crate::edgar::tickers::Ticker;
use crate::fetch::FilingBundle;

const PROMPT: &str = r#"You are analyzing a 10-K SEC filing to score a company's AI narrative integrity.

Score the filing on a 0-100 scale across these factors:
- Specificity: Are AI claims tied to specific products, systems, or metrics? (vague buzzwords = low)
- Financial Impact: Is AI investment quantified ($ spent, headcount, capex)?
- Integration Depth: Is AI described as core infrastructure or just a feature/pilot?
- Competitive Moat: Does AI create defensible advantage or is it commodity tooling?
- Execution Evidence: Are there concrete AI outcomes (speed, cost, revenue) cited?

Return JSON only (no markdown):
{
  "dimension": "ai_narrative",
  "score": <0-100 integer>,
  "evidence": ["<direct quote from filing>", ...],
  "flags": ["<concern or gap>", ...],
  "summary": "<1-2 sentence summary>"
}

Filing text (truncated):
"#;

const EXCERPT_MAX_CHARS: usize = 60_000;

pub struct AiNarrative;

#[async_trait]
impl DimensionScorer for AiNarrative {
    fn dimension(&self) -> Dimension {
        Dimension::AiNarrative
    }

    async fn score(
        &self,
        ticker: &Ticker,
        bundle: &FilingBundle,
        analyzer: &dyn Analyzer,
    ) -> DimensionResult {
        let annual = match &bundle.annual {
            Some(doc) => doc,
            None => {
                return DimensionResult::fallback(
                    Dimension::AiNarrative,
                    0,
                    "No 10-K filing available",
                    "Could not fetch 10-K filing.",
                )
            }
        };

        let prompt = format!("{}{}", PROMPT, truncate_chars(&annual.text, EXCERPT_MAX_CHARS));
        log::debug!("[{}] {} prompt: {} chars", ticker, self.dimension(), prompt.len());

        match analyze_dimension(analyzer, Dimension::AiNarrative, &prompt).await {
            Some(result) => result,
            None => DimensionResult::fallback(
                Dimension::AiNarrative,
                50,
                SERVICE_FAILED_FLAG,
                "AI narrative analysis unavailable.",
            ),
        }
    }
}
