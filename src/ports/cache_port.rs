//! Memoization port.
//!
//! The domain never caches. Callers that want to avoid repeated upstream
//! calls own a [`CachePort`] and wrap their ports in a decorator such as
//! [`CachedDataPort`].

use std::cell::RefCell;

use chrono::NaiveDate;

use crate::domain::error::ScoutError;
use crate::domain::ohlcv::OhlcvBar;
use crate::ports::data_port::DataPort;

/// Identity of a cached call: the operation name plus its arguments rendered
/// as strings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CacheKey {
    pub operation: String,
    pub args: Vec<String>,
}

impl CacheKey {
    pub fn new(operation: &str, args: &[&str]) -> Self {
        CacheKey {
            operation: operation.to_string(),
            args: args.iter().map(|a| a.to_string()).collect(),
        }
    }
}

pub trait CachePort<V> {
    fn get(&self, key: &CacheKey) -> Option<V>;
    fn put(&mut self, key: CacheKey, value: V);
    fn clear(&mut self);
}

/// [`DataPort`] decorator that answers repeated `fetch_ohlcv` calls from a
/// cache. Errors are not cached.
pub struct CachedDataPort<'a, C: CachePort<Vec<OhlcvBar>>> {
    inner: &'a dyn DataPort,
    cache: RefCell<C>,
}

impl<'a, C: CachePort<Vec<OhlcvBar>>> CachedDataPort<'a, C> {
    pub fn new(inner: &'a dyn DataPort, cache: C) -> Self {
        CachedDataPort {
            inner,
            cache: RefCell::new(cache),
        }
    }

    pub fn into_cache(self) -> C {
        self.cache.into_inner()
    }
}

impl<C: CachePort<Vec<OhlcvBar>>> DataPort for CachedDataPort<'_, C> {
    fn fetch_ohlcv(
        &self,
        symbol: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<OhlcvBar>, ScoutError> {
        let start = start_date.to_string();
        let end = end_date.to_string();
        let key = CacheKey::new("fetch_ohlcv", &[symbol, &start, &end]);

        if let Some(bars) = self.cache.borrow().get(&key) {
            log::debug!("cache hit for {} {}..{}", symbol, start, end);
            return Ok(bars);
        }

        let bars = self.inner.fetch_ohlcv(symbol, start_date, end_date)?;
        self.cache.borrow_mut().put(key, bars.clone());
        Ok(bars)
    }

    fn list_symbols(&self) -> Result<Vec<String>, ScoutError> {
        self.inner.list_symbols()
    }
}
