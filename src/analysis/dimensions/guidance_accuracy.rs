//! Guidance accuracy, scored from the recent 8-K earnings releases.

use async_trait::async_trait;

use super::{DimensionScorer, SERVICE_FAILED_FLAG};
use crate::analysis::{analyze_dimension, Analyzer, Dimension, DimensionResult};
use crate::edgar::text::truncate_chars;
use crate::edgar::tickers::Ticker;
use crate::fetch::FilingBundle;

const PROMPT: &str = r#"You are analyzing a series of 8-K earnings release filings to score a company's guidance accuracy.

Analyze the filings for:
- Forward guidance language: Is guidance specific (ranges, numbers) or aspirational ("we expect strong growth")?
- Guidance vs actuals: Where earlier filings made specific predictions, did later filings confirm or miss them?
- Margin vs revenue patterns: Do they beat revenue but miss margins? (signals bonus structure gaming)
- Language patterns: "Aspirational guidance" — always raises, never gives a range

Score 0-100 where:
- 90-100: Consistent specific guidance, hits targets
- 70-89: Mostly accurate, minor misses
- 50-69: Mixed — some specific guidance, some misses
- 30-49: Frequent misses or consistently vague guidance
- 0-29: Aspirational only, major misses, or misleading guidance

Return JSON only (no markdown):
{
  "dimension": "guidance_accuracy",
  "score": <0-100 integer>,
  "evidence": ["<direct quote from filing>", ...],
  "flags": ["<concern or pattern>", ...],
  "summary": "<1-2 sentence summary>"
}

8-K filings (most recent first):
"#;

// Up to four releases go into the prompt, each clipped, whole excerpt capped.
const MAX_RELEASES_IN_PROMPT: usize = 4;
const PER_RELEASE_MAX_CHARS: usize = 10_000;
const EXCERPT_MAX_CHARS: usize = 50_000;

pub struct GuidanceAccuracy;

#[async_trait]
impl DimensionScorer for GuidanceAccuracy {
    fn dimension(&self) -> Dimension {
        Dimension::GuidanceAccuracy
    }

    async fn score(
        &self,
        ticker: &Ticker,
        bundle: &FilingBundle,
        analyzer: &dyn Analyzer,
    ) -> DimensionResult {
        if bundle.events.is_empty() {
            return DimensionResult::fallback(
                Dimension::GuidanceAccuracy,
                50,
                "No 8-K filings available",
                "Could not fetch 8-K earnings releases.",
            );
        }

        let mut combined = String::new();
        for (i, filing) in bundle.events.iter().take(MAX_RELEASES_IN_PROMPT).enumerate() {
            combined.push_str(&format!("\n\n--- 8-K #{} ({}) ---\n", i + 1, filing.date));
            combined.push_str(truncate_chars(&filing.text, PER_RELEASE_MAX_CHARS));
        }

        let prompt = format!("{}{}", PROMPT, truncate_chars(&combined, EXCERPT_MAX_CHARS));
        log::debug!("[{}] {} prompt: {} chars", ticker, self.dimension(), prompt.len());

        match analyze_dimension(analyzer, Dimension::GuidanceAccuracy, &prompt).await {
            Some(result) => result,
            None => DimensionResult::fallback(
                Dimension::GuidanceAccuracy,
                50,
                SERVICE_FAILED_FLAG,
                "Guidance accuracy analysis unavailable.",
            ),
        }
    }
}
