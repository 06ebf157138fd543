use std::time::Duration;

use serde_json::json;

use crate::core::config::TruthlensConfig;
use crate::scorer::CompositeResult;

/// Fire-and-forget scan notification. Disabled unless an endpoint is
/// configured; any delivery failure is swallowed and must never change a
/// scoring outcome.
pub async fn record_scan(config: &TruthlensConfig, result: &CompositeResult) {
    let url = match &config.worklog_url {
        Some(url) => url,
        None => return,
    };

    let payload = json!({
        "project": "truthlens",
        "description": format!(
            "Scored {} for {}: composite={}.",
            result.ticker, result.quarter, result.composite_score
        ),
        "task_type": "analysis",
    });

    let client = reqwest::Client::new();
    let mut request = client
        .post(url)
        .json(&payload)
        .timeout(Duration::from_secs(5));
    if let Some(key) = &config.worklog_key {
        request = request.header("X-WL-Key", key);
    }

    if let Err(e) = request.send().await {
        log::debug!("Audit notification failed: {}", e);
    }
}
