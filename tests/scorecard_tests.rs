use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::NaiveDate;

use truthlens::analysis::{Analyzer, Dimension};
use truthlens::edgar::tickers::Ticker;
use truthlens::fetch::{FilingBundle, FilingDocument, FilingType};
use truthlens::scorer::{score_bundle, Verdict};

/// Answers every prompt with a well-formed judgment for the dimension the
/// prompt asks about, using a fixed score per dimension.
struct CannedAnalyzer;

fn dimension_of_prompt(prompt: &str) -> &'static str {
    for name in [
        "ai_narrative",
        "guidance_accuracy",
        "risk_drift",
        "capital_honesty",
        "esg_substance",
    ] {
        if prompt.contains(&format!("\"dimension\": \"{}\"", name)) {
            return name;
        }
    }
    panic!("Prompt does not name a dimension");
}

fn canned_score(name: &str) -> u8 {
    match name {
        "ai_narrative" => 25,
        "guidance_accuracy" => 90,
        "risk_drift" => 60,
        "capital_honesty" => 70,
        "esg_substance" => 40,
        _ => unreachable!(),
    }
}

#[async_trait]
impl Analyzer for CannedAnalyzer {
    async fn analyze(&self, prompt: &str) -> Result<String> {
        let name = dimension_of_prompt(prompt);
        Ok(format!(
            r#"Here is my analysis.
            {{"dimension": "{}", "score": {},
              "evidence": ["quoted disclosure"],
              "flags": ["one concern"],
              "summary": "Canned judgment."}}"#,
            name,
            canned_score(name)
        ))
    }
}

/// Returns prose with no parseable JSON object at all.
struct MalformedAnalyzer;

#[async_trait]
impl Analyzer for MalformedAnalyzer {
    async fn analyze(&self, _prompt: &str) -> Result<String> {
        Ok("I'm sorry, I cannot analyze this filing.".to_string())
    }
}

/// Fails every call, and records whether it was invoked at all.
struct TrackingFailingAnalyzer {
    called: AtomicBool,
}

#[async_trait]
impl Analyzer for TrackingFailingAnalyzer {
    async fn analyze(&self, _prompt: &str) -> Result<String> {
        self.called.store(true, Ordering::SeqCst);
        Err(anyhow!("service unavailable"))
    }
}

fn doc(filing_type: FilingType, form: &str, text: &str) -> FilingDocument {
    FilingDocument {
        ticker: "TEST".to_string(),
        company: "Test Corp".to_string(),
        filing_type,
        date: NaiveDate::from_ymd_opt(2026, 5, 1).unwrap(),
        url: "https://www.sec.gov/Archives/edgar/data/1/000000000126000001/doc.htm".to_string(),
        text: text.to_string(),
        form: form.parse().unwrap(),
    }
}

fn full_bundle() -> FilingBundle {
    FilingBundle {
        ticker: "TEST".to_string(),
        annual: Some(doc(
            FilingType::Annual,
            "10-K",
            "ITEM 1A. RISK FACTORS\nWe depend on few customers.\nITEM 1B. OTHER\nAI is core to our products.",
        )),
        events: vec![doc(FilingType::EventRelease, "8-K", "Q2 revenue guidance: $5.0-5.2B.")],
        proxy: Some(doc(
            FilingType::ProxyStatement,
            "DEF 14A",
            "Board is 40% women. Scope 1 emissions down 23%.",
        )),
    }
}

fn ticker() -> Ticker {
    Ticker::new("TEST").unwrap()
}

#[tokio::test]
async fn canned_judgments_produce_the_worked_composite() {
    let result = score_bundle(&ticker(), "Q2-2026".to_string(), &full_bundle(), &CannedAnalyzer).await;

    // 25*.25 + 90*.25 + 60*.20 + 70*.15 + 40*.15 = 57.25 -> 57
    assert_eq!(result.composite_score, 57);
    assert_eq!(result.verdict, Verdict::ModerateMonitor);
    assert_eq!(result.company, "Test Corp");
    assert_eq!(result.quarter, "Q2-2026");
    assert_eq!(result.dimensions.len(), 5);

    for (key, dim) in &result.dimensions {
        assert_eq!(*key, dim.dimension);
        assert_eq!(dim.evidence, vec!["quoted disclosure"]);
    }
}

#[tokio::test]
async fn malformed_service_output_degrades_every_dimension_to_neutral() {
    let result =
        score_bundle(&ticker(), "Q2-2026".to_string(), &full_bundle(), &MalformedAnalyzer).await;

    assert_eq!(result.composite_score, 50);
    assert_eq!(result.verdict, Verdict::SignificantNarrativeGap);
    for dim in result.dimensions.values() {
        assert_eq!(dim.score, 50);
        assert!(dim.flags.iter().any(|f| f.contains("Analysis service failed")));
        assert!(dim.evidence.is_empty());
    }
}

#[tokio::test]
async fn all_absent_bundle_yields_documented_defaults_without_touching_the_service() {
    let analyzer = TrackingFailingAnalyzer {
        called: AtomicBool::new(false),
    };
    let bundle = FilingBundle::empty(&ticker());
    let result = score_bundle(&ticker(), "Q2-2026".to_string(), &bundle, &analyzer).await;

    assert!(!analyzer.called.load(Ordering::SeqCst));

    assert_eq!(result.dimension_score(Dimension::AiNarrative), Some(0));
    assert_eq!(result.dimension_score(Dimension::GuidanceAccuracy), Some(50));
    assert_eq!(result.dimension_score(Dimension::RiskDrift), Some(0));
    assert_eq!(result.dimension_score(Dimension::CapitalHonesty), Some(0));
    assert_eq!(result.dimension_score(Dimension::EsgSubstance), Some(30));

    // 0*.25 + 50*.25 + 0*.20 + 0*.15 + 30*.15 = 17
    assert_eq!(result.composite_score, 17);
    assert_eq!(result.verdict, Verdict::HighDivergence);
    assert_eq!(result.company, "TEST");
}

#[tokio::test]
async fn service_failure_on_one_dimension_leaves_the_others_scored() {
    // Proxy-only bundle: esg_substance calls the service, annual-backed
    // dimensions fall back without calling it.
    let bundle = FilingBundle {
        ticker: "TEST".to_string(),
        annual: None,
        events: vec![],
        proxy: Some(doc(FilingType::ProxyStatement, "DEF 14A", "ESG metrics here.")),
    };
    let result = score_bundle(&ticker(), "Q2-2026".to_string(), &bundle, &CannedAnalyzer).await;

    assert_eq!(result.dimension_score(Dimension::EsgSubstance), Some(40));
    assert_eq!(result.dimension_score(Dimension::AiNarrative), Some(0));
    assert_eq!(result.dimension_score(Dimension::CapitalHonesty), Some(0));
    // Display name comes from the proxy when no annual resolved one exists
    assert_eq!(result.company, "Test Corp");
}
