use std::sync::Arc;

use anyhow::Result;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::edgar::cache::DocumentCache;
use crate::edgar::filing::FilingRef;
use crate::edgar::report::ReportType;
use crate::edgar::tickers::Ticker;
use crate::edgar::DocumentSource;

/// Character budgets per filing type, and the event-release lookback bound.
pub const ANNUAL_MAX_CHARS: usize = 80_000;
pub const EVENT_MAX_CHARS: usize = 40_000;
pub const PROXY_MAX_CHARS: usize = 60_000;
pub const MAX_EVENT_FILINGS: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FilingType {
    Annual,
    EventRelease,
    ProxyStatement,
}

/// One retrieved filing, already normalized to bounded plain text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilingDocument {
    pub ticker: String,
    pub company: String,
    pub filing_type: FilingType,
    pub date: NaiveDate,
    pub url: String,
    pub text: String,
    pub form: ReportType,
}

/// Everything gathered for one scoring run. Any slot may be absent; absence
/// flows to the scorers as "no evidence" rather than an error.
#[derive(Debug, Clone, Default)]
pub struct FilingBundle {
    pub ticker: String,
    pub annual: Option<FilingDocument>,
    pub events: Vec<FilingDocument>,
    pub proxy: Option<FilingDocument>,
}

impl FilingBundle {
    pub fn empty(ticker: &Ticker) -> Self {
        FilingBundle {
            ticker: ticker.to_string(),
            ..Default::default()
        }
    }
}

/// Newest annual report, accepting the amended variant.
pub fn find_annual(entries: &[FilingRef]) -> Option<&FilingRef> {
    entries.iter().find(|e| e.form.is_annual())
}

/// Up to `max` newest event releases, most recent first.
pub fn find_events(entries: &[FilingRef], max: usize) -> Vec<&FilingRef> {
    entries
        .iter()
        .filter(|e| e.form == ReportType::Form8K)
        .take(max)
        .collect()
}

/// Newest proxy statement.
pub fn find_proxy(entries: &[FilingRef]) -> Option<&FilingRef> {
    entries.iter().find(|e| e.form == ReportType::FormDef14A)
}

pub struct FilingFetcher {
    source: Arc<dyn DocumentSource>,
    cache: DocumentCache,
}

impl FilingFetcher {
    pub fn new(source: Arc<dyn DocumentSource>, cache: DocumentCache) -> Self {
        FilingFetcher { source, cache }
    }

    /// Gathers the annual report, recent event releases, and proxy statement
    /// for one ticker. Every failure below the bundle level is downgraded:
    /// an unresolvable ticker or a broken index yields an empty bundle, and
    /// a failed document fetch leaves only that slot or entry absent.
    pub async fn fetch_bundle(&self, ticker: &Ticker) -> FilingBundle {
        let cik = match self.source.resolve_cik(ticker).await {
            Ok(Some(cik)) => cik,
            Ok(None) => {
                log::warn!("[{}] Ticker not found in EDGAR directory", ticker);
                return FilingBundle::empty(ticker);
            }
            Err(e) => {
                log::warn!("[{}] Directory lookup failed: {}", ticker, e);
                return FilingBundle::empty(ticker);
            }
        };

        // One index retrieval serves all three filing-type lookups.
        let index = match self.source.filing_index(&cik).await {
            Ok(index) => index,
            Err(e) => {
                log::warn!("[{}] Failed to fetch filing index: {}", ticker, e);
                return FilingBundle::empty(ticker);
            }
        };

        let company = match self.source.company_name(ticker).await {
            Ok(name) => name,
            Err(_) => ticker.to_string(),
        };

        let annual = match find_annual(&index.entries) {
            Some(entry) => {
                log::info!("[{}] Downloading 10-K from {}", ticker, entry.date);
                self.fetch_document(ticker, &company, FilingType::Annual, entry, ANNUAL_MAX_CHARS)
                    .await
                    .map_err(|e| log::warn!("[{}] 10-K fetch failed: {}", ticker, e))
                    .ok()
            }
            None => {
                log::warn!("[{}] No 10-K found", ticker);
                None
            }
        };

        let mut events = Vec::new();
        for entry in find_events(&index.entries, MAX_EVENT_FILINGS) {
            log::info!("[{}] Downloading 8-K from {}", ticker, entry.date);
            match self
                .fetch_document(ticker, &company, FilingType::EventRelease, entry, EVENT_MAX_CHARS)
                .await
            {
                Ok(doc) => events.push(doc),
                // One bad 8-K must not cost us the rest of the list
                Err(e) => log::warn!("[{}] 8-K fetch failed ({}): {}", ticker, entry.date, e),
            }
        }
        log::info!("[{}] Got {} 8-Ks", ticker, events.len());

        let proxy = match find_proxy(&index.entries) {
            Some(entry) => {
                log::info!("[{}] Downloading DEF 14A from {}", ticker, entry.date);
                self.fetch_document(
                    ticker,
                    &company,
                    FilingType::ProxyStatement,
                    entry,
                    PROXY_MAX_CHARS,
                )
                .await
                .map_err(|e| log::warn!("[{}] DEF 14A fetch failed: {}", ticker, e))
                .ok()
            }
            None => {
                log::info!("[{}] No DEF 14A found", ticker);
                None
            }
        };

        FilingBundle {
            ticker: ticker.to_string(),
            annual,
            events,
            proxy,
        }
    }

    /// Fetch-through-cache: a cached URL never reaches the source again.
    async fn fetch_document(
        &self,
        ticker: &Ticker,
        company: &str,
        filing_type: FilingType,
        entry: &FilingRef,
        max_chars: usize,
    ) -> Result<FilingDocument> {
        let text = match self.cache.get(&entry.url) {
            Some(cached) => {
                log::debug!("[{}] Cache hit for {}", ticker, entry.url);
                cached
            }
            None => {
                let text = self.source.fetch_document(&entry.url, max_chars).await?;
                self.cache.put(&entry.url, &text);
                text
            }
        };
        log::debug!("[{}] {}: {} chars", ticker, entry.form, text.len());

        Ok(FilingDocument {
            ticker: ticker.to_string(),
            company: company.to_string(),
            filing_type,
            date: entry.date,
            url: entry.url.clone(),
            text,
            form: entry.form.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Mutex;

    use async_trait::async_trait;

    use crate::edgar::filing::{document_url, FilingIndex};

    fn entry(form: &str, date: &str) -> FilingRef {
        let accession = format!("0000000000-24-{:06}", date.len());
        let url = document_url("12345", &accession, "doc.htm");
        FilingRef {
            form: form.parse().unwrap(),
            date: date.parse().unwrap(),
            accession,
            primary_document: "doc.htm".to_string(),
            url,
        }
    }

    /// Like `entry` but with a per-entry accession, so URLs are distinct.
    fn entry_n(form: &str, date: &str, n: usize) -> FilingRef {
        let accession = format!("0000000000-24-{:06}", n);
        let url = document_url("12345", &accession, "doc.htm");
        FilingRef {
            form: form.parse().unwrap(),
            date: date.parse().unwrap(),
            accession,
            primary_document: "doc.htm".to_string(),
            url,
        }
    }

    /// In-memory registry: a fixed index, per-URL failure injection, and a
    /// log of every document URL that reached the source.
    struct StubSource {
        entries: Vec<FilingRef>,
        fail_urls: HashSet<String>,
        fetched: Mutex<Vec<String>>,
    }

    impl StubSource {
        fn new(entries: Vec<FilingRef>) -> Self {
            StubSource {
                entries,
                fail_urls: HashSet::new(),
                fetched: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl DocumentSource for StubSource {
        async fn resolve_cik(&self, _ticker: &Ticker) -> Result<Option<String>> {
            Ok(Some("12345".to_string()))
        }

        async fn company_name(&self, _ticker: &Ticker) -> Result<String> {
            Ok("Test Corp".to_string())
        }

        async fn filing_index(&self, _cik: &str) -> Result<FilingIndex> {
            Ok(FilingIndex {
                company_name: "Test Corp".to_string(),
                entries: self.entries.clone(),
            })
        }

        async fn fetch_document(&self, url: &str, _max_chars: usize) -> Result<String> {
            self.fetched.lock().unwrap().push(url.to_string());
            if self.fail_urls.contains(url) {
                anyhow::bail!("HTTP request failed with status 503 for {}", url);
            }
            Ok(format!("Filing body for {}", url))
        }
    }

    fn ticker() -> Ticker {
        Ticker::new("TEST").unwrap()
    }

    fn full_index() -> Vec<FilingRef> {
        vec![
            entry_n("10-K", "2024-11-01", 1),
            entry_n("8-K", "2024-10-01", 2),
            entry_n("8-K", "2024-07-01", 3),
            entry_n("8-K", "2024-04-01", 4),
            entry_n("DEF 14A", "2024-02-01", 5),
        ]
    }

    #[tokio::test]
    async fn failed_event_fetch_costs_only_that_entry() {
        let entries = full_index();
        let bad_url = entries[2].url.clone();
        let mut source = StubSource::new(entries);
        source.fail_urls.insert(bad_url.clone());

        let dir = tempfile::tempdir().unwrap();
        let fetcher = FilingFetcher::new(Arc::new(source), DocumentCache::new(dir.path()));
        let bundle = fetcher.fetch_bundle(&ticker()).await;

        assert!(bundle.annual.is_some());
        assert!(bundle.proxy.is_some());
        assert_eq!(bundle.events.len(), 2);
        assert!(bundle.events.iter().all(|d| d.url != bad_url));
        assert_eq!(bundle.annual.unwrap().company, "Test Corp");
    }

    #[tokio::test]
    async fn second_fetch_serves_every_document_from_cache() {
        let source = Arc::new(StubSource::new(full_index()));
        let dir = tempfile::tempdir().unwrap();
        let fetcher =
            FilingFetcher::new(Arc::clone(&source) as Arc<dyn DocumentSource>, DocumentCache::new(dir.path()));

        let first = fetcher.fetch_bundle(&ticker()).await;
        assert_eq!(source.fetched.lock().unwrap().len(), 5);

        let second = fetcher.fetch_bundle(&ticker()).await;
        assert_eq!(source.fetched.lock().unwrap().len(), 5);

        assert_eq!(
            second.annual.unwrap().text,
            first.annual.unwrap().text
        );
        assert_eq!(second.events.len(), 3);
    }

    #[tokio::test]
    async fn unlisted_ticker_yields_an_empty_bundle() {
        struct NoSuchTicker;

        #[async_trait]
        impl DocumentSource for NoSuchTicker {
            async fn resolve_cik(&self, _ticker: &Ticker) -> Result<Option<String>> {
                Ok(None)
            }

            async fn company_name(&self, _ticker: &Ticker) -> Result<String> {
                unreachable!("lookup must stop at CIK resolution")
            }

            async fn filing_index(&self, _cik: &str) -> Result<FilingIndex> {
                unreachable!("lookup must stop at CIK resolution")
            }

            async fn fetch_document(&self, _url: &str, _max_chars: usize) -> Result<String> {
                unreachable!("lookup must stop at CIK resolution")
            }
        }

        let dir = tempfile::tempdir().unwrap();
        let fetcher = FilingFetcher::new(Arc::new(NoSuchTicker), DocumentCache::new(dir.path()));
        let bundle = fetcher.fetch_bundle(&ticker()).await;

        assert_eq!(bundle.ticker, "TEST");
        assert!(bundle.annual.is_none());
        assert!(bundle.events.is_empty());
        assert!(bundle.proxy.is_none());
    }

    #[test]
    fn annual_accepts_amended_form() {
        let entries = vec![entry("8-K", "2024-09-01"), entry("10-K/A", "2024-08-01")];
        assert_eq!(find_annual(&entries).unwrap().form, ReportType::Form10KA);
    }

    #[test]
    fn annual_picks_newest_when_sorted() {
        let entries = vec![
            entry("10-K", "2024-11-01"),
            entry("10-K", "2023-11-01"),
        ];
        assert_eq!(
            find_annual(&entries).unwrap().date,
            "2024-11-01".parse::<NaiveDate>().unwrap()
        );
    }

    #[test]
    fn events_are_bounded_and_in_order() {
        let mut entries = Vec::new();
        for month in (1..=12).rev() {
            entries.push(entry("8-K", &format!("2024-{:02}-15", month)));
        }
        let events = find_events(&entries, MAX_EVENT_FILINGS);
        assert_eq!(events.len(), MAX_EVENT_FILINGS);
        assert_eq!(
            events[0].date,
            "2024-12-15".parse::<NaiveDate>().unwrap()
        );
    }

    #[test]
    fn proxy_ignores_other_forms() {
        let entries = vec![
            entry("8-K", "2024-09-01"),
            entry("DEF 14A", "2024-01-10"),
            entry("10-K", "2023-11-01"),
        ];
        assert_eq!(find_proxy(&entries).unwrap().form, ReportType::FormDef14A);
    }

    #[test]
    fn missing_forms_yield_absent_slots() {
        let entries = vec![entry("S-1", "2024-05-01")];
        assert!(find_annual(&entries).is_none());
        assert!(find_events(&entries, MAX_EVENT_FILINGS).is_empty());
        assert!(find_proxy(&entries).is_none());
    }
}
