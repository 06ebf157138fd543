use anyhow::{anyhow, Result};
use chrono::NaiveDate;
use serde::Deserialize;

use super::report::ReportType;

pub const EDGAR_DATA_URL: &str = "https://data.sec.gov";
pub const EDGAR_ARCHIVES_URL: &str = "https://www.sec.gov/Archives/edgar/data";

/// Submissions payload for one company. The index arrives as parallel
/// arrays; entry `i` of each array describes the same filing.
#[derive(Debug, Deserialize)]
pub struct CompanyFilings {
    pub name: String,
    pub filings: FilingsData,
}

#[derive(Debug, Deserialize)]
pub struct FilingsData {
    pub recent: FilingEntry,
}

#[derive(Debug, Deserialize)]
pub struct FilingEntry {
    #[serde(rename = "accessionNumber")]
    pub accession_number: Vec<String>,
    #[serde(rename = "filingDate")]
    pub filing_date: Vec<NaiveDate>,
    #[serde(rename = "form")]
    pub report_type: Vec<ReportType>,
    #[serde(rename = "primaryDocument")]
    pub primary_document: Vec<String>,
}

/// One entry of a company's filing history, flattened out of the parallel
/// arrays with its document URL already constructed.
#[derive(Debug, Clone)]
pub struct FilingRef {
    pub form: ReportType,
    pub date: NaiveDate,
    pub accession: String,
    pub primary_document: String,
    pub url: String,
}

#[derive(Debug, Clone, Default)]
pub struct FilingIndex {
    pub company_name: String,
    pub entries: Vec<FilingRef>,
}

pub fn submissions_url(cik: &str) -> String {
    // CIK is zero-padded to 10 digits on the data host only
    format!("{}/submissions/CIK{:0>10}.json", EDGAR_DATA_URL, cik)
}

pub fn document_url(cik: &str, accession: &str, primary_document: &str) -> String {
    format!(
        "{}/{}/{}/{}",
        EDGAR_ARCHIVES_URL,
        cik,
        accession.replace('-', ""),
        primary_document
    )
}

impl FilingIndex {
    pub fn parse(json_string: &str, cik: &str) -> Result<Self> {
        let parsed: CompanyFilings = serde_json::from_str(json_string)
            .map_err(|e| anyhow!("Failed to parse submissions JSON: {}", e))?;
        Ok(Self::from_submissions(parsed, cik))
    }

    pub fn from_submissions(parsed: CompanyFilings, cik: &str) -> Self {
        let recent = parsed.filings.recent;
        let len = recent
            .accession_number
            .len()
            .min(recent.filing_date.len())
            .min(recent.report_type.len())
            .min(recent.primary_document.len());

        let mut entries: Vec<FilingRef> = (0..len)
            .map(|i| {
                let accession = recent.accession_number[i].clone();
                let primary_document = recent.primary_document[i].clone();
                let url = document_url(cik, &accession, &primary_document);
                FilingRef {
                    form: recent.report_type[i].clone(),
                    date: recent.filing_date[i],
                    accession,
                    primary_document,
                    url,
                }
            })
            .collect();

        // The registry serves newest-first already; sort anyway so the
        // "most recent" selections below never depend on upstream ordering.
        entries.sort_by(|a, b| b.date.cmp(&a.date));

        FilingIndex {
            company_name: parsed.name,
            entries,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SUBMISSIONS_JSON: &str = r#"{
        "cik": "320193",
        "name": "Apple Inc.",
        "filings": {
            "recent": {
                "accessionNumber": ["0000320193-24-000081", "0000320193-24-000123", "0000320193-24-000007"],
                "filingDate": ["2024-08-02", "2024-11-01", "2024-01-15"],
                "form": ["8-K", "10-K", "DEF 14A"],
                "primaryDocument": ["aapl-8k.htm", "aapl-10k.htm", "aapl-proxy.htm"]
            }
        }
    }"#;

    #[test]
    fn flattens_parallel_arrays_and_builds_urls() {
        let index = FilingIndex::parse(SUBMISSIONS_JSON, "320193").unwrap();
        assert_eq!(index.company_name, "Apple Inc.");
        assert_eq!(index.entries.len(), 3);

        let ten_k = index
            .entries
            .iter()
            .find(|e| e.form == ReportType::Form10K)
            .unwrap();
        assert_eq!(
            ten_k.url,
            "https://www.sec.gov/Archives/edgar/data/320193/000032019324000123/aapl-10k.htm"
        );
    }

    #[test]
    fn entries_are_sorted_newest_first() {
        let index = FilingIndex::parse(SUBMISSIONS_JSON, "320193").unwrap();
        let dates: Vec<_> = index.entries.iter().map(|e| e.date).collect();
        let mut sorted = dates.clone();
        sorted.sort_by(|a, b| b.cmp(a));
        assert_eq!(dates, sorted);
        assert_eq!(index.entries[0].form, ReportType::Form10K);
    }

    #[test]
    fn submissions_url_pads_cik() {
        assert_eq!(
            submissions_url("320193"),
            "https://data.sec.gov/submissions/CIK0000320193.json"
        );
    }
}
