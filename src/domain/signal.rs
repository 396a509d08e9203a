//! Directive derivation from the latest technical point and sentiment.

use crate::domain::indicator_helpers::{CompletePoint, IndicatorFrame, TechnicalPoint};
use crate::domain::sentiment::{effective_sentiment, SentimentSignal};
use std::fmt;

/// Sentiment must clear this magnitude to confirm a technical signal.
pub const SENTIMENT_THRESHOLD: f64 = 0.15;
pub const RSI_OVERBOUGHT: f64 = 70.0;
pub const RSI_OVERSOLD: f64 = 30.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Directive {
    Call,
    Put,
    Hold,
}

impl Directive {
    pub fn is_actionable(&self) -> bool {
        !matches!(self, Directive::Hold)
    }
}

impl fmt::Display for Directive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Directive::Call => write!(f, "Call"),
            Directive::Put => write!(f, "Put"),
            Directive::Hold => write!(f, "Hold"),
        }
    }
}

/// Golden-cross regime, not overbought, price above the fast average.
pub fn is_bullish(point: &CompletePoint) -> bool {
    point.sma_50 > point.sma_200 && point.rsi_14 < RSI_OVERBOUGHT && point.close > point.sma_50
}

/// Death-cross regime, not oversold, price below the fast average.
pub fn is_bearish(point: &CompletePoint) -> bool {
    point.sma_50 < point.sma_200 && point.rsi_14 > RSI_OVERSOLD && point.close < point.sma_50
}

/// Directive for a single technical point.
///
/// A point still in warm-up is neither bullish nor bearish and yields `Hold`.
pub fn directive_for(point: &TechnicalPoint, sentiment: &[SentimentSignal]) -> Directive {
    let Some(complete) = point.complete() else {
        log::debug!("{}: indicators warming up, holding", point.date);
        return Directive::Hold;
    };

    let bullish = is_bullish(&complete);
    let bearish = is_bearish(&complete);

    match effective_sentiment(sentiment) {
        Some(s) => {
            if bullish && s > SENTIMENT_THRESHOLD {
                Directive::Call
            } else if bearish && s < -SENTIMENT_THRESHOLD {
                Directive::Put
            } else {
                Directive::Hold
            }
        }
        None => {
            if bullish {
                Directive::Call
            } else if bearish {
                Directive::Put
            } else {
                Directive::Hold
            }
        }
    }
}

/// Directive for the most recent bar of `frame`; `Hold` for an empty frame.
pub fn generate_directive(frame: &IndicatorFrame, sentiment: &[SentimentSignal]) -> Directive {
    let directive = match frame.latest() {
        Some(point) => directive_for(point, sentiment),
        None => Directive::Hold,
    };
    log::debug!(
        "{}: directive {} (sentiment {:?})",
        frame.symbol,
        directive,
        effective_sentiment(sentiment)
    );
    directive
}
