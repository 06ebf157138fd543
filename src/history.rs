use anyhow::Result;
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use sqlx::FromRow;

use crate::analysis::Dimension;
use crate::scorer::CompositeResult;

/// Time series of composite scores, one row per (ticker, quarter).
/// The five per-dimension scores are flattened into nullable columns for
/// query convenience; the full result travels in `scores_json`.
pub struct ScoreStore {
    pool: SqlitePool,
}

#[derive(Debug, Clone, FromRow)]
pub struct ScoreRow {
    pub ticker: String,
    pub company: Option<String>,
    pub quarter: Option<String>,
    pub composite_score: i64,
    pub ai_score: Option<i64>,
    pub guidance_score: Option<i64>,
    pub risk_drift_score: Option<i64>,
    pub capital_score: Option<i64>,
    pub esg_score: Option<i64>,
    pub scanned_at: String,
    pub scores_json: String,
}

impl ScoreStore {
    pub async fn connect(database_url: &str) -> Result<Self> {
        // SQLite is single-writer, and `sqlite::memory:` databases are
        // per-connection; one pinned connection covers both.
        let pool: SqlitePool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect(database_url)
            .await?;
        let store = ScoreStore { pool };
        store.init().await?;
        Ok(store)
    }

    async fn init(&self) -> Result<()> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS scores (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                ticker TEXT NOT NULL,
                company TEXT,
                quarter TEXT,
                composite_score INTEGER,
                ai_score INTEGER,
                guidance_score INTEGER,
                risk_drift_score INTEGER,
                capital_score INTEGER,
                esg_score INTEGER,
                scanned_at TEXT DEFAULT (datetime('now')),
                scores_json TEXT,
                UNIQUE(ticker, quarter)
            )",
        )
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Upserts on (ticker, quarter): a second run for the same quarter
    /// replaces the first.
    pub async fn save(&self, result: &CompositeResult) -> Result<()> {
        let dim = |d: Dimension| result.dimension_score(d).map(i64::from);

        sqlx::query(
            "INSERT OR REPLACE INTO scores
                (ticker, company, quarter, composite_score,
                 ai_score, guidance_score, risk_drift_score, capital_score, esg_score,
                 scanned_at, scores_json)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&result.ticker)
        .bind(&result.company)
        .bind(&result.quarter)
        .bind(i64::from(result.composite_score))
        .bind(dim(Dimension::AiNarrative))
        .bind(dim(Dimension::GuidanceAccuracy))
        .bind(dim(Dimension::RiskDrift))
        .bind(dim(Dimension::CapitalHonesty))
        .bind(dim(Dimension::EsgSubstance))
        .bind(result.scanned_at.to_rfc3339())
        .bind(serde_json::to_string(result)?)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Most-recent-N records for a ticker, newest scan first.
    pub async fn history(&self, ticker: &str, limit: i64) -> Result<Vec<ScoreRow>> {
        let rows = sqlx::query_as::<_, ScoreRow>(
            "SELECT ticker, company, quarter, composite_score,
                    ai_score, guidance_score, risk_drift_score, capital_score, esg_score,
                    scanned_at, scores_json
             FROM scores
             WHERE ticker = ?
             ORDER BY scanned_at DESC
             LIMIT ?",
        )
        .bind(ticker.to_uppercase())
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn latest(&self, ticker: &str) -> Result<Option<ScoreRow>> {
        Ok(self.history(ticker, 1).await?.into_iter().next())
    }

    pub async fn tickers(&self) -> Result<Vec<String>> {
        let rows = sqlx::query_scalar::<_, String>(
            "SELECT DISTINCT ticker FROM scores ORDER BY ticker",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}
