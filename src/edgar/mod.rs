pub mod cache;
pub mod filing;
pub mod report;
pub mod text;
pub mod throttle;
pub mod tickers;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use reqwest::Client;
use tokio::sync::OnceCell;

use filing::FilingIndex;
use throttle::Throttle;
use tickers::{Ticker, TickerDirectory};

const TICKER_URL: &str = "https://www.sec.gov/files/company_tickers.json";

/// The registry seam the fetcher works against. `EdgarClient` is the live
/// implementation; tests substitute in-memory sources.
#[async_trait]
pub trait DocumentSource: Send + Sync {
    /// Resolves a ticker to its CIK. `None` means the symbol is not listed,
    /// which the fetcher treats as "no data available", not a failure.
    async fn resolve_cik(&self, ticker: &Ticker) -> Result<Option<String>>;

    async fn company_name(&self, ticker: &Ticker) -> Result<String>;

    async fn filing_index(&self, cik: &str) -> Result<FilingIndex>;

    /// Retrieves one document and normalizes it to at most `max_chars`.
    async fn fetch_document(&self, url: &str, max_chars: usize) -> Result<String>;
}

/// Throttled client for the SEC EDGAR registry. The symbol directory is
/// fetched once per client and reused across lookups.
pub struct EdgarClient {
    client: Client,
    throttle: Arc<Throttle>,
    user_agent: String,
    directory: OnceCell<Arc<TickerDirectory>>,
}

impl EdgarClient {
    pub fn new(user_agent: impl Into<String>, throttle: Arc<Throttle>) -> Self {
        EdgarClient {
            client: Client::new(),
            throttle,
            user_agent: user_agent.into(),
            directory: OnceCell::new(),
        }
    }

    async fn get_text(&self, url: &str, timeout: Duration) -> Result<String> {
        let url = url::Url::parse(url)?;
        self.throttle.wait().await;
        log::debug!("Fetching URL: {}", url);

        let response = self
            .client
            .get(url.as_str())
            .header(reqwest::header::USER_AGENT, &self.user_agent)
            .header(reqwest::header::ACCEPT_ENCODING, "gzip, deflate")
            .timeout(timeout)
            .send()
            .await?;

        log::debug!("Response status: {}", response.status());
        if !response.status().is_success() {
            return Err(anyhow!(
                "HTTP request failed with status {} for {}",
                response.status(),
                url
            ));
        }

        Ok(response.text().await?)
    }

    pub async fn directory(&self) -> Result<Arc<TickerDirectory>> {
        self.directory
            .get_or_try_init(|| async {
                let body = self.get_text(TICKER_URL, Duration::from_secs(30)).await?;
                let dir = TickerDirectory::parse(&body)?;
                log::debug!("Loaded {} directory entries", dir.len());
                Ok::<_, anyhow::Error>(Arc::new(dir))
            })
            .await
            .map(Arc::clone)
    }
}

#[async_trait]
impl DocumentSource for EdgarClient {
    async fn resolve_cik(&self, ticker: &Ticker) -> Result<Option<String>> {
        Ok(self.directory().await?.cik(ticker))
    }

    async fn company_name(&self, ticker: &Ticker) -> Result<String> {
        Ok(self.directory().await?.company_name(ticker))
    }

    async fn filing_index(&self, cik: &str) -> Result<FilingIndex> {
        let url = filing::submissions_url(cik);
        let body = self.get_text(&url, Duration::from_secs(30)).await?;
        FilingIndex::parse(&body, cik)
    }

    async fn fetch_document(&self, url: &str, max_chars: usize) -> Result<String> {
        let raw = self.get_text(url, Duration::from_secs(60)).await?;
        Ok(text::normalize(&raw, max_chars))
    }
}
