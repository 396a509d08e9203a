//! Sentiment scalars and their combination.
//!
//! Every source produces a score in [-1, 1] or is explicitly absent. Absence
//! is never folded into a neutral 0: a missing source simply does not vote.

use crate::domain::error::ScoutError;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SentimentSource {
    /// Provider-aggregated news sentiment feed.
    AggregatedFeed,
    /// Lexicon score over company news headlines and summaries.
    NewsText,
    /// Analyst recommendation consensus.
    AnalystConsensus,
}

impl fmt::Display for SentimentSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SentimentSource::AggregatedFeed => write!(f, "feed"),
            SentimentSource::NewsText => write!(f, "news"),
            SentimentSource::AnalystConsensus => write!(f, "analyst"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SentimentSignal {
    pub source: SentimentSource,
    pub score: Option<f64>,
}

impl SentimentSignal {
    /// A present score, clamped to [-1, 1]. Non-finite input is treated as absent.
    pub fn present(source: SentimentSource, score: f64) -> Self {
        SentimentSignal {
            source,
            score: score.is_finite().then(|| score.clamp(-1.0, 1.0)),
        }
    }

    pub fn absent(source: SentimentSource) -> Self {
        SentimentSignal {
            source,
            score: None,
        }
    }

    pub fn is_present(&self) -> bool {
        self.score.is_some()
    }
}

/// Mean of the present scores, `None` when no source is present.
pub fn effective_sentiment(signals: &[SentimentSignal]) -> Option<f64> {
    let present: Vec<f64> = signals.iter().filter_map(|s| s.score).collect();
    if present.is_empty() {
        None
    } else {
        Some(present.iter().sum::<f64>() / present.len() as f64)
    }
}

const POSITIVE_WORDS: &[&str] = &[
    "up", "rise", "jump", "gain", "bull", "growth", "high", "profit", "buy", "outperform",
    "positive", "surge", "soar",
];

const NEGATIVE_WORDS: &[&str] = &[
    "down", "fall", "drop", "loss", "bear", "decline", "low", "risk", "sell", "underperform",
    "negative", "plunge", "tumble",
];

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewsItem {
    pub headline: String,
    pub summary: String,
}

/// Lexicon sentiment over news items.
///
/// Each item votes +1, 0 or -1 by comparing how many positive and negative
/// lexicon words occur (substring presence) in its lowercased text. Blank
/// items are skipped. The result is the mean vote; 0.0 when nothing was scored.
pub fn news_sentiment(items: &[NewsItem]) -> f64 {
    let mut total = 0i64;
    let mut counted = 0usize;

    for item in items {
        let text = format!("{} {}", item.headline, item.summary).to_lowercase();
        if text.trim().is_empty() {
            continue;
        }

        let positive = POSITIVE_WORDS.iter().filter(|w| text.contains(*w)).count() as i64;
        let negative = NEGATIVE_WORDS.iter().filter(|w| text.contains(*w)).count() as i64;
        total += (positive - negative).signum();
        counted += 1;
    }

    if counted == 0 {
        0.0
    } else {
        total as f64 / counted as f64
    }
}

/// One period of analyst recommendation counts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecommendationTrend {
    pub period: String,
    pub strong_buy: u32,
    pub buy: u32,
    pub hold: u32,
    pub sell: u32,
    pub strong_sell: u32,
}

impl RecommendationTrend {
    pub fn total(&self) -> u64 {
        [self.strong_buy, self.buy, self.hold, self.sell, self.strong_sell]
            .iter()
            .map(|&n| u64::from(n))
            .sum()
    }
}

/// Weighted consensus of the most recent period (first entry).
///
/// Strong buy 1, buy 0.5, hold 0, sell -0.5, strong sell -1, divided by the
/// number of analysts. `None` when there are no periods at all.
pub fn analyst_sentiment(trends: &[RecommendationTrend]) -> Option<f64> {
    let latest = trends.first()?;
    let total = latest.total();
    if total == 0 {
        return Some(0.0);
    }

    let weighted = latest.strong_buy as f64 + latest.buy as f64 * 0.5
        - latest.sell as f64 * 0.5
        - latest.strong_sell as f64;
    Some(weighted / total as f64)
}

/// Mean of provider-supplied per-article scores.
pub fn feed_sentiment(scores: &[f64]) -> Result<f64, ScoutError> {
    if scores.is_empty() {
        return Err(ScoutError::UpstreamUnavailable {
            source_name: SentimentSource::AggregatedFeed.to_string(),
            reason: "no sentiment data in feed".into(),
        });
    }
    if let Some(bad) = scores.iter().find(|s| !s.is_finite()) {
        return Err(ScoutError::MalformedInput {
            reason: format!("non-finite feed score {}", bad),
        });
    }
    Ok(scores.iter().sum::<f64>() / scores.len() as f64)
}
