//! Sentiment provider port trait.

use crate::domain::error::ScoutError;
use crate::domain::sentiment::{SentimentSignal, SentimentSource};

/// One sentiment provider. A provider that cannot answer returns
/// `ScoutError::UpstreamUnavailable`; callers degrade that to an absent
/// signal rather than a neutral score.
pub trait SentimentPort {
    fn source(&self) -> SentimentSource;

    fn fetch_sentiment(&self, symbol: &str) -> Result<SentimentSignal, ScoutError>;
}

/// Query every provider, keeping one signal per provider. Failures become
/// absent signals.
pub fn collect_signals(providers: &[&dyn SentimentPort], symbol: &str) -> Vec<SentimentSignal> {
    providers
        .iter()
        .map(|provider| match provider.fetch_sentiment(symbol) {
            Ok(signal) => signal,
            Err(e) => {
                log::warn!("{}: {} sentiment unavailable ({})", symbol, provider.source(), e);
                SentimentSignal::absent(provider.source())
            }
        })
        .collect()
}
