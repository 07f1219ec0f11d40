//! Session-local result caching keyed on input fingerprints
//!
//! Each slot holds at most one result. A lookup hits only when the fingerprint of the
//! current inputs is exactly the stored one; edits to the inputs clear slots eagerly
//! through [`ResultCache::invalidate`], so a stale entry is never served.

use crate::api::Place;
use crate::calculator::SingleYearResult;
use crate::error::Result;
use crate::household::{FutureEvent, Person};
use crate::projection::{AnalysisReport, IncomeRange};
use serde::Serialize;

/// Canonical serialization of the inputs that produced a result
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct InputFingerprint(String);

impl InputFingerprint {
    pub fn of<T: Serialize>(inputs: &T) -> Result<Self> {
        Ok(Self(serde_json::to_string(inputs)?))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Inputs that determine a single-year result
#[derive(Debug, Serialize)]
pub struct SingleYearInputs<'a> {
    pub zipcode: &'a str,
    pub place: &'a Place,
    pub people: &'a [Person],
    pub has_married_couple: bool,
    pub income: i64,
    pub coverage_year: i32,
}

/// Inputs that determine a long-term analysis
#[derive(Debug, Serialize)]
pub struct LongTermInputs<'a> {
    pub zipcode: &'a str,
    pub place: Option<&'a Place>,
    pub people: &'a [Person],
    pub has_married_couple: bool,
    pub future_events: &'a [FutureEvent],
    pub income_range: IncomeRange,
}

/// A cached result and the fingerprint it was computed for
#[derive(Debug, Clone)]
pub struct CacheEntry<T> {
    pub fingerprint: InputFingerprint,
    pub result: T,
}

/// Single-entry cache slot
#[derive(Debug)]
pub struct CacheSlot<T> {
    entry: Option<CacheEntry<T>>,

    /// Statistics
    pub cache_hits: u64,
    pub cache_misses: u64,
}

impl<T> Default for CacheSlot<T> {
    fn default() -> Self {
        Self {
            entry: None,
            cache_hits: 0,
            cache_misses: 0,
        }
    }
}

impl<T> CacheSlot<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stored result if it was computed for exactly `fingerprint`
    pub fn get(&mut self, fingerprint: &InputFingerprint) -> Option<&T> {
        match &self.entry {
            Some(entry) if entry.fingerprint == *fingerprint => {
                self.cache_hits += 1;
                Some(&entry.result)
            }
            _ => {
                self.cache_misses += 1;
                None
            }
        }
    }

    /// Replace the slot's content
    pub fn store(&mut self, fingerprint: InputFingerprint, result: T) {
        self.entry = Some(CacheEntry { fingerprint, result });
    }

    pub fn clear(&mut self) {
        self.entry = None;
    }

    pub fn is_empty(&self) -> bool {
        self.entry.is_none()
    }
}

/// Which inputs changed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Invalidation {
    /// People, location, married status or future events
    Household,
    /// The single-year income
    SingleYearIncome,
    /// Start, end or step of the analysis income range
    IncomeRange,
}

/// The two result slots of a session
#[derive(Debug, Default)]
pub struct ResultCache {
    pub single_year: CacheSlot<SingleYearResult>,
    pub long_term: CacheSlot<AnalysisReport>,
}

impl ResultCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear every slot that depends on the changed inputs
    pub fn invalidate(&mut self, change: Invalidation) {
        match change {
            Invalidation::Household => {
                self.single_year.clear();
                self.long_term.clear();
            }
            Invalidation::SingleYearIncome => self.single_year.clear(),
            Invalidation::IncomeRange => self.long_term.clear(),
        }
        log::debug!("Cache invalidated: {:?}", change);
    }
}
