//! Marketplace API seam
//!
//! The HTTP transport lives outside this crate. Implementations map transport and
//! status failures onto [`ApiError`]; timeouts are theirs to enforce.

use super::types::{CountiesResponse, EstimateRequest, EstimateResponse, PlanStat, PlanStatsRequest};
use crate::error::ApiError;

/// The three year-parameterized marketplace operations
#[allow(async_fn_in_trait)]
pub trait MarketplaceApi {
    /// Counties served by a ZIP code in a coverage year
    async fn counties_by_zip(&self, zip: &str, year: i32) -> Result<CountiesResponse, ApiError>;

    /// Subsidy eligibility estimate for a household
    async fn eligibility_estimate(&self, request: &EstimateRequest) -> Result<EstimateResponse, ApiError>;

    /// Premium and out-of-pocket statistics per metal level
    async fn plan_stats(&self, request: &PlanStatsRequest) -> Result<Vec<PlanStat>, ApiError>;
}
