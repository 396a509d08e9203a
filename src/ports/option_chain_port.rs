//! Option chain port trait.

use crate::domain::error::ScoutError;
use crate::domain::option::OptionChain;

pub trait OptionChainPort {
    /// Full chain for `symbol`. Implementations must hand back a chain that
    /// passes [`OptionChain::validate`], or `ScoutError::MalformedChain`.
    fn fetch_chain(&self, symbol: &str) -> Result<OptionChain, ScoutError>;
}
