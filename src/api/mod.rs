//! Marketplace API contract: wire types, the client seam and the year-fallback policy

mod client;
mod types;
pub mod fallback;

#[cfg(test)]
pub(crate) mod testing;

pub use client::MarketplaceApi;
pub use fallback::{fetch_with_fallback, FallbackPolicy};
pub use types::{
    ApiHousehold, ApiPerson, CostRange, CountiesResponse, County, Estimate, EstimateRequest, EstimateResponse,
    FallbackNotice, Market, Place, PlanStat, PlanStatsRequest, ServiceResponse, UnemploymentStatus,
};
