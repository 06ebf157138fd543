//! Capital allocation honesty, scored from the 10-K plus the proxy statement.

use async_trait::async_trait;

use super::{DimensionScorer, SERVICE_FAILED_FLAG};
use crate::analysis::{analyze_dimension, Analyzer, Dimension, DimensionResult};
use crate::edgar::text::truncate_chars;
use crate::edgar::tickers::Ticker;
use crate::fetch::FilingBundle;

const PROMPT: &str = r#"You are analyzing SEC filings to score whether a company's capital allocation matches its stated strategic priorities.

Look for mismatches between:
- Company states "AI/innovation is our #1 priority" but R&D spend is flat or declining
- Company says "talent is our greatest asset" but total compensation declined
- Company emphasizes "long-term value creation" but buybacks dwarf R&D investment
- Compensation structure: are executives bonused on revenue/EPS (short-term) or innovation metrics (long-term)?
- Capex allocation: does spending match stated growth areas?

Score 0-100 where:
- 90-100: Strong alignment between stated priorities and spending
- 70-89: Generally aligned with minor gaps
- 50-69: Some mismatches — stated priorities not backed by capital
- 30-49: Clear misalignment — rhetoric doesn't match spend
- 0-29: Significant capital misallocation vs stated strategy

Return JSON only (no markdown):
{
  "dimension": "capital_honesty",
  "score": <0-100 integer>,
  "evidence": ["<direct quote or data point from filing>", ...],
  "flags": ["<mismatch or concern>", ...],
  "summary": "<1-2 sentence summary>"
}

10-K filing excerpt:
"#;

const ANNUAL_EXCERPT_CHARS: usize = 40_000;
const PROXY_EXCERPT_CHARS: usize = 20_000;
const EXCERPT_MAX_CHARS: usize = 60_000;

pub struct CapitalHonesty;

#[async_trait]
impl DimensionScorer for CapitalHonesty {
    fn dimension(&self) -> Dimension {
        Dimension::CapitalHonesty
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
                    Dimension::CapitalHonesty,
                    0,
                    "No 10-K filing available",
                    "Could not fetch 10-K filing.",
                )
            }
        };

        // Annual financials first, proxy compensation data appended when we
        // have it. The proxy is optional for this dimension.
        let mut combined = truncate_chars(&annual.text, ANNUAL_EXCERPT_CHARS).to_string();
        if let Some(proxy) = &bundle.proxy {
            combined.push_str("\n\n--- PROXY STATEMENT (DEF 14A) ---\n");
            combined.push_str(truncate_chars(&proxy.text, PROXY_EXCERPT_CHARS));
        }

        let prompt = format!("{}{}", PROMPT, truncate_chars(&combined, EXCERPT_MAX_CHARS));
        log::debug!("[{}] {} prompt: {} chars", ticker, self.dimension(), prompt.len());

        match analyze_dimension(analyzer, Dimension::CapitalHonesty, &prompt).await {
            Some(result) => result,
            None => DimensionResult::fallback(
                Dimension::CapitalHonesty,
                50,
                SERVICE_FAILED_FLAG,
                "Capital allocation analysis unavailable.",
            ),
        }
    }
}
