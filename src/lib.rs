//! ACA Forecaster - Household projection and premium subsidy forecasting for marketplace plans
//!
//! This library provides:
//! - Household modeling with composition rules and future events (marriage, births)
//! - Year-by-year household projection until everyone reaches Medicare age
//! - Single-year subsidy and plan-cost estimates with result caching
//! - Long-term premium analysis across projected years and income levels
//! - ZIP-to-county location resolution and prior-year data fallback
//!
//! The marketplace itself is reached through the [`api::MarketplaceApi`] trait; callers
//! supply the transport.

pub mod api;
pub mod cache;
pub mod calculator;
pub mod config;
pub mod error;
pub mod household;
pub mod location;
pub mod projection;
pub mod session;

// Re-export commonly used types
pub use api::{FallbackNotice, FallbackPolicy, MarketplaceApi, Place};
pub use calculator::{SingleYearCalculator, SingleYearRequest, SingleYearResult};
pub use config::ForecastConfig;
pub use error::{ApiError, ForecastError, Result};
pub use household::{FutureEvent, Household, Person, Scenario};
pub use projection::{AnalysisEngine, AnalysisObserver, AnalysisOutcome, AnalysisResultMatrix, IncomeRange};
pub use session::{AnalysisStatus, Session};
