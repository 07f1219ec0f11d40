//! Prior-year fallback for marketplace calls
//!
//! Around open enrollment the next coverage year is requested before the marketplace
//! has published it. Inside the fallback window a failed call is retried once against
//! the previous year; outside it, failures propagate untouched.

use super::client::MarketplaceApi;
use super::types::{
    CountiesResponse, EstimateRequest, EstimateResponse, PlanStat, PlanStatsRequest, ServiceResponse,
};
use crate::config::ForecastConfig;
use crate::error::ApiError;
use chrono::{Datelike, Local, NaiveDate};
use std::future::Future;

/// Decides whether a failed call may be retried against the prior coverage year
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FallbackPolicy {
    today: NaiveDate,
    window_start_month: u32,
}

impl FallbackPolicy {
    /// Policy evaluated against the local calendar date
    pub fn new(config: &ForecastConfig) -> Self {
        Self::at(Local::now().date_naive(), config)
    }

    /// Policy evaluated against a fixed date
    pub fn at(today: NaiveDate, config: &ForecastConfig) -> Self {
        Self {
            today,
            window_start_month: config.fallback_window_start_month,
        }
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }

    /// Year to retry with, if the requested year's data is plausibly unpublished
    pub fn fallback_year(&self, requested_year: i32) -> Option<i32> {
        let in_window = self.today.month() >= self.window_start_month;
        if in_window && requested_year > self.today.year() {
            Some(requested_year - 1)
        } else {
            None
        }
    }
}

/// Run `call` for `requested_year`, retrying once with the prior year when allowed
///
/// If the retry fails too, the error from the original year is returned.
pub async fn fetch_with_fallback<T, F, Fut>(
    policy: &FallbackPolicy,
    operation: &str,
    requested_year: i32,
    mut call: F,
) -> Result<ServiceResponse<T>, ApiError>
where
    F: FnMut(i32) -> Fut,
    Fut: Future<Output = Result<T, ApiError>>,
{
    let original_error = match call(requested_year).await {
        Ok(data) => {
            return Ok(ServiceResponse {
                data,
                used_year: requested_year,
                fallback_occurred: false,
            })
        }
        Err(e) => e,
    };

    let Some(fallback_year) = policy.fallback_year(requested_year) else {
        return Err(original_error);
    };

    log::warn!(
        "{} call for year {} failed ({}). Attempting fallback to {}.",
        operation,
        requested_year,
        original_error,
        fallback_year
    );

    match call(fallback_year).await {
        Ok(data) => Ok(ServiceResponse {
            data,
            used_year: fallback_year,
            fallback_occurred: true,
        }),
        Err(fallback_error) => {
            log::error!(
                "Fallback {} call for year {} also failed ({}). Returning original error.",
                operation,
                fallback_year,
                fallback_error
            );
            Err(original_error)
        }
    }
}

/// Counties served by `zip`, with prior-year fallback
pub async fn counties_by_zip<A: MarketplaceApi>(
    api: &A,
    policy: &FallbackPolicy,
    zip: &str,
    year: i32,
) -> Result<ServiceResponse<CountiesResponse>, ApiError> {
    fetch_with_fallback(policy, "counties", year, |y| api.counties_by_zip(zip, y)).await
}

/// Eligibility estimate, with prior-year fallback
pub async fn eligibility_estimate<A: MarketplaceApi>(
    api: &A,
    policy: &FallbackPolicy,
    request: &EstimateRequest,
) -> Result<ServiceResponse<EstimateResponse>, ApiError> {
    fetch_with_fallback(policy, "estimate", request.year, |y| {
        let request = request.with_year(y);
        async move { api.eligibility_estimate(&request).await }
    })
    .await
}

/// Plan statistics, with prior-year fallback
pub async fn plan_stats<A: MarketplaceApi>(
    api: &A,
    policy: &FallbackPolicy,
    request: &PlanStatsRequest,
) -> Result<ServiceResponse<Vec<PlanStat>>, ApiError> {
    fetch_with_fallback(policy, "plan stats", request.year, |y| {
        let request = request.with_year(y);
        async move { api.plan_stats(&request).await }
    })
    .await
}
