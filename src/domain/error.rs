//! Domain error types.

/// Top-level error type for optscout.
#[derive(Debug, thiserror::Error)]
pub enum ScoutError {
    #[error("no price data for {symbol}")]
    DataUnavailable { symbol: String },

    #[error("no expiration at least 21 days out for {symbol}")]
    NoValidExpiration { symbol: String },

    #[error("no eligible contract for {symbol}")]
    NoEligibleContract { symbol: String },

    #[error("indicator warm-up incomplete: have {bars} bars, need {required}")]
    IndicatorWarmupIncomplete { bars: usize, required: usize },

    #[error("{source_name} unavailable: {reason}")]
    UpstreamUnavailable { source_name: String, reason: String },

    #[error("malformed option chain: {reason}")]
    MalformedChain { reason: String },

    #[error("malformed input: {reason}")]
    MalformedInput { reason: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&ScoutError> for std::process::ExitCode {
    fn from(err: &ScoutError) -> Self {
        let code: u8 = match err {
            ScoutError::Io(_) => 1,
            ScoutError::ConfigParse { .. }
            | ScoutError::ConfigMissing { .. }
            | ScoutError::ConfigInvalid { .. } => 2,
            ScoutError::UpstreamUnavailable { .. }
            | ScoutError::MalformedChain { .. }
            | ScoutError::MalformedInput { .. } => 3,
            ScoutError::NoValidExpiration { .. } | ScoutError::NoEligibleContract { .. } => 4,
            ScoutError::DataUnavailable { .. } | ScoutError::IndicatorWarmupIncomplete { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn warmup_message_names_counts() {
        let err = ScoutError::IndicatorWarmupIncomplete {
            bars: 120,
            required: 200,
        };
        assert_eq!(
            err.to_string(),
            "indicator warm-up incomplete: have 120 bars, need 200"
        );
    }

    #[test]
    fn config_missing_message() {
        let err = ScoutError::ConfigMissing {
            section: "backtest".into(),
            key: "symbol".into(),
        };
        assert_eq!(err.to_string(), "missing config key [backtest] symbol");
    }

    #[test]
    fn io_converts_transparently() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: ScoutError = io.into();
        assert!(matches!(err, ScoutError::Io(_)));
        assert_eq!(err.to_string(), "gone");
    }
}
