//! JSON sentiment adapters.
//!
//! One adapter per provider, each reading its own file from the data
//! directory:
//!
//! - `{SYMBOL}_feed.json`: aggregated news-sentiment feed,
//!   `{"feed": [{"overall_sentiment_score": 0.21}, ...]}`. A provider notice
//!   (`"Information"` or `"Error Message"`) means the provider refused.
//! - `{SYMBOL}_news.json`: `[{"headline": "...", "summary": "..."}, ...]`.
//! - `{SYMBOL}_recommendations.json`: analyst trends, newest period first,
//!   `[{"period": "2024-01-01", "strongBuy": 10, "buy": 5, ...}, ...]`.
//!
//! A missing file is `UpstreamUnavailable`; an unparsable one is
//! `MalformedInput`.

use crate::domain::error::ScoutError;
use crate::domain::sentiment::{
    analyst_sentiment, feed_sentiment, news_sentiment, NewsItem, RecommendationTrend,
    SentimentSignal, SentimentSource,
};
use crate::ports::sentiment_port::SentimentPort;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Deserialize)]
struct FeedDocument {
    #[serde(default)]
    feed: Vec<FeedItem>,
    #[serde(rename = "Information")]
    information: Option<String>,
    #[serde(rename = "Error Message")]
    error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FeedItem {
    #[serde(default, deserialize_with = "score_from_number_or_string")]
    overall_sentiment_score: f64,
}

#[derive(Debug, Deserialize)]
struct NewsRecord {
    #[serde(default)]
    headline: Option<String>,
    #[serde(default)]
    summary: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TrendRecord {
    #[serde(default)]
    period: String,
    #[serde(default)]
    strong_buy: u32,
    #[serde(default)]
    buy: u32,
    #[serde(default)]
    hold: u32,
    #[serde(default)]
    sell: u32,
    #[serde(default)]
    strong_sell: u32,
}

/// The feed provider sends scores either as numbers or numeric strings.
fn score_from_number_or_string<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(f64),
        Text(String),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Number(n) => Ok(n),
        Raw::Text(s) => s.trim().parse().map_err(serde::de::Error::custom),
    }
}

fn parse_json<T: DeserializeOwned>(source: SentimentSource, json: &str) -> Result<T, ScoutError> {
    serde_json::from_str(json).map_err(|e| ScoutError::MalformedInput {
        reason: format!("{} payload: {}", source, e),
    })
}

/// Score an aggregated-feed payload.
pub fn parse_feed(json: &str) -> Result<SentimentSignal, ScoutError> {
    let doc: FeedDocument = parse_json(SentimentSource::AggregatedFeed, json)?;

    if let Some(message) = doc.information.or(doc.error_message) {
        let reason = if message.to_lowercase().contains("rate limit") {
            "rate limit exceeded".to_string()
        } else {
            message
        };
        return Err(ScoutError::UpstreamUnavailable {
            source_name: SentimentSource::AggregatedFeed.to_string(),
            reason,
        });
    }

    let scores: Vec<f64> = doc.feed.iter().map(|item| item.overall_sentiment_score).collect();
    let score = feed_sentiment(&scores)?;
    Ok(SentimentSignal::present(SentimentSource::AggregatedFeed, score))
}

/// Score a news payload with the lexicon; always present.
pub fn parse_news(json: &str) -> Result<SentimentSignal, ScoutError> {
    let records: Vec<NewsRecord> = parse_json(SentimentSource::NewsText, json)?;
    let items: Vec<NewsItem> = records
        .into_iter()
        .map(|r| NewsItem {
            headline: r.headline.unwrap_or_default(),
            summary: r.summary.unwrap_or_default(),
        })
        .collect();
    Ok(SentimentSignal::present(
        SentimentSource::NewsText,
        news_sentiment(&items),
    ))
}

/// Score analyst recommendation trends; absent when no period is listed.
pub fn parse_recommendations(json: &str) -> Result<SentimentSignal, ScoutError> {
    let records: Vec<TrendRecord> = parse_json(SentimentSource::AnalystConsensus, json)?;
    let trends: Vec<RecommendationTrend> = records
        .into_iter()
        .map(|r| RecommendationTrend {
            period: r.period,
            strong_buy: r.strong_buy,
            buy: r.buy,
            hold: r.hold,
            sell: r.sell,
            strong_sell: r.strong_sell,
        })
        .collect();

    Ok(match analyst_sentiment(&trends) {
        Some(score) => SentimentSignal::present(SentimentSource::AnalystConsensus, score),
        None => SentimentSignal::absent(SentimentSource::AnalystConsensus),
    })
}

pub struct JsonSentimentAdapter {
    base_path: PathBuf,
    source: SentimentSource,
}

impl JsonSentimentAdapter {
    pub fn new(base_path: PathBuf, source: SentimentSource) -> Self {
        Self { base_path, source }
    }

    /// One adapter for each provider, all reading from `base_path`.
    pub fn all(base_path: PathBuf) -> Vec<JsonSentimentAdapter> {
        [
            SentimentSource::AggregatedFeed,
            SentimentSource::NewsText,
            SentimentSource::AnalystConsensus,
        ]
        .into_iter()
        .map(|source| JsonSentimentAdapter::new(base_path.clone(), source))
        .collect()
    }

    fn payload_path(&self, symbol: &str) -> PathBuf {
        let suffix = match self.source {
            SentimentSource::AggregatedFeed => "feed",
            SentimentSource::NewsText => "news",
            SentimentSource::AnalystConsensus => "recommendations",
        };
        self.base_path
            .join(format!("{}_{}.json", symbol.to_uppercase(), suffix))
    }
}

impl SentimentPort for JsonSentimentAdapter {
    fn source(&self) -> SentimentSource {
        self.source
    }

    fn fetch_sentiment(&self, symbol: &str) -> Result<SentimentSignal, ScoutError> {
        let path = self.payload_path(symbol);
        if !path.exists() {
            return Err(ScoutError::UpstreamUnavailable {
                source_name: self.source.to_string(),
                reason: format!("no payload at {}", path.display()),
            });
        }

        let content = fs::read_to_string(&path)?;
        let signal = match self.source {
            SentimentSource::AggregatedFeed => parse_feed(&content)?,
            SentimentSource::NewsText => parse_news(&content)?,
            SentimentSource::AnalystConsensus => parse_recommendations(&content)?,
        };
        log::debug!("{}: {} sentiment {:?}", symbol, self.source, signal.score);
        Ok(signal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use tempfile::TempDir;

    #[test]
    fn feed_averages_scores() {
        let json = r#"{"feed": [{"overall_sentiment_score": 0.2}, {"overall_sentiment_score": "0.4"}]}"#;
        let signal = parse_feed(json).unwrap();
        assert_eq!(signal.source, SentimentSource::AggregatedFeed);
        assert_relative_eq!(signal.score.unwrap(), 0.3, epsilon = 1e-12);
    }

    #[test]
    fn feed_item_without_score_counts_as_zero() {
        let json = r#"{"feed": [{"overall_sentiment_score": 0.6}, {"title": "x"}]}"#;
        assert_relative_eq!(parse_feed(json).unwrap().score.unwrap(), 0.3, epsilon = 1e-12);
    }

    #[test]
    fn empty_feed_is_unavailable_not_neutral() {
        let err = parse_feed(r#"{"feed": []}"#).unwrap_err();
        assert!(matches!(err, ScoutError::UpstreamUnavailable { .. }));
    }

    #[test]
    fn rate_limit_notice_is_unavailable() {
        let json = r#"{"Information": "Our standard API rate limit is 25 requests per day."}"#;
        let err = parse_feed(json).unwrap_err();
        assert!(
            matches!(err, ScoutError::UpstreamUnavailable { reason, .. } if reason == "rate limit exceeded")
        );
    }

    #[test]
    fn news_payload_uses_lexicon() {
        let json = r#"[{"headline": "Shares surge on record profit"}, {"headline": "", "summary": null}]"#;
        let signal = parse_news(json).unwrap();
        assert_eq!(signal.score, Some(1.0));
    }

    #[test]
    fn empty_news_is_present_zero() {
        assert_eq!(parse_news("[]").unwrap().score, Some(0.0));
    }

    #[test]
    fn recommendations_use_latest_period() {
        let json = r#"[
            {"period": "2024-02-01", "strongBuy": 2, "buy": 2, "hold": 0, "sell": 0, "strongSell": 0},
            {"period": "2024-01-01", "strongBuy": 0, "buy": 0, "hold": 0, "sell": 0, "strongSell": 4}
        ]"#;
        let signal = parse_recommendations(json).unwrap();
        assert_relative_eq!(signal.score.unwrap(), 0.75, epsilon = 1e-12);
    }

    #[test]
    fn huge_analyst_counts_do_not_overflow() {
        let json = r#"[{"period": "2024-06-01", "strongBuy": 4294967295, "buy": 1, "hold": 0, "sell": 0, "strongSell": 0}]"#;
        let signal = parse_recommendations(json).unwrap();
        assert_relative_eq!(signal.score.unwrap(), 1.0, epsilon = 1e-9);
    }

    #[test]
    fn no_recommendations_is_absent() {
        let signal = parse_recommendations("[]").unwrap();
        assert!(!signal.is_present());
    }

    #[test]
    fn garbage_is_malformed() {
        let err = parse_news("{not json").unwrap_err();
        assert!(matches!(err, ScoutError::MalformedInput { .. }));
    }

    #[test]
    fn adapters_read_their_own_files() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("AAPL_news.json"),
            r#"[{"headline": "Stock tumbles", "summary": "steep decline"}]"#,
        )
        .unwrap();
        let adapters = JsonSentimentAdapter::all(dir.path().to_path_buf());
        assert_eq!(adapters.len(), 3);

        let news = &adapters[1];
        assert_eq!(news.source(), SentimentSource::NewsText);
        assert_eq!(news.fetch_sentiment("AAPL").unwrap().score, Some(-1.0));

        let err = adapters[0].fetch_sentiment("AAPL").unwrap_err();
        assert!(matches!(err, ScoutError::UpstreamUnavailable { .. }));
    }
}
