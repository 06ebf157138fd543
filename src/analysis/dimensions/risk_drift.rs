//! Risk language drift, scored from the 10-K Risk Factors section.

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;

use super::{DimensionScorer, SERVICE_FAILED_FLAG};
use crate::analysis::{analyze_dimension, Analyzer, Dimension, DimensionResult};
use crate::edgar::text::truncate_chars;
use crate::edgar::tickers::Ticker;
use crate::fetch::FilingBundle;

const PROMPT: &str = r#"You are analyzing a 10-K SEC filing's Risk Factors section to score a company's risk disclosure transparency.

Look for:
- New risks that appeared (added language about AI dependency, regulatory risk, concentration risk, etc.)
- Missing risks: based on the company's business, what risks are conspicuously absent?
- Specificity of risk language: vague "macro uncertainty" vs specific "revenue from 3 customers represents 40%"
- Boilerplate vs substance: standard legal CYA language vs genuinely informative risk disclosure
- Hidden or minimized risks: risks mentioned briefly that seem material

Score 0-100 where:
- 90-100: Specific, comprehensive risk disclosure — no obvious gaps
- 70-89: Good disclosure with minor gaps
- 50-69: Mix of specific and boilerplate, some material gaps
- 30-49: Mostly boilerplate, important risks understated
- 0-29: Risk factors appear designed to minimize rather than disclose

Return JSON only (no markdown):
{
  "dimension": "risk_drift",
  "score": <0-100 integer>,
  "evidence": ["<direct quote from filing>", ...],
  "flags": ["<concern or missing risk>", ...],
  "summary": "<1-2 sentence summary>"
}

10-K filing (focus on Risk Factors section):
"#;

const SECTION_MAX_CHARS: usize = 30_000;
const FALLBACK_MAX_CHARS: usize = 40_000;

static RISK_SECTION_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    vec![
        Regex::new(r"(?is)ITEM\s+1A[\.\s]+RISK FACTORS(.*?)(?:ITEM\s+1B|ITEM\s+2)").unwrap(),
        Regex::new(r"(?is)Risk Factors(.*?)(?:Item\s+2|PART\s+II)").unwrap(),
    ]
});

/// Best-effort extraction of the labeled Risk Factors region. When no
/// pattern matches, the unstructured head of the filing stands in.
fn extract_risk_section(text: &str) -> &str {
    for pattern in RISK_SECTION_PATTERNS.iter() {
        if let Some(m) = pattern.captures(text).and_then(|caps| caps.get(1)) {
            return truncate_chars(m.as_str(), SECTION_MAX_CHARS);
        }
    }
    truncate_chars(text, FALLBACK_MAX_CHARS)
}

pub struct RiskDrift;

#[async_trait]
impl DimensionScorer for RiskDrift {
    fn dimension(&self) -> Dimension {
        Dimension::RiskDrift
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
                    Dimension::RiskDrift,
                    0,
                    "No 10-K filing available",
                    "Could not fetch 10-K filing.",
                )
            }
        };

        let prompt = format!("{}{}", PROMPT, extract_risk_section(&annual.text));
        log::debug!("[{}] {} prompt: {} chars", ticker, self.dimension(), prompt.len());

        match analyze_dimension(analyzer, Dimension::RiskDrift, &prompt).await {
            Some(result) => result,
            None => DimensionResult::fallback(
                Dimension::RiskDrift,
                50,
                SERVICE_FAILED_FLAG,
                "Risk drift analysis unavailable.",
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_labeled_risk_section() {
        let filing = "PART I\nITEM 1A. RISK FACTORS\nOur revenue depends on three customers.\nITEM 1B. UNRESOLVED STAFF COMMENTS\nNone.";
        let section = extract_risk_section(filing);
        assert!(section.contains("three customers"));
        assert!(!section.contains("UNRESOLVED"));
    }

    #[test]
    fn matches_loose_header_variant() {
        let filing = "Risk Factors\nCompetition is intense.\nItem 2. Properties\nOffices.";
        let section = extract_risk_section(filing);
        assert!(section.contains("Competition is intense."));
        assert!(!section.contains("Offices"));
    }

    #[test]
    fn falls_back_to_document_head() {
        let filing = "x".repeat(50_000);
        let section = extract_risk_section(&filing);
        assert_eq!(section.chars().count(), FALLBACK_MAX_CHARS);
    }
}
