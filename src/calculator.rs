//! Single-year subsidy and plan estimate
//!
//! The one-income, one-year sibling of the long-term analysis. Results are cached on
//! the fingerprint of the inputs, so repeating an unchanged calculation costs nothing.
//!
//! # Example
//! ```ignore
//! let calculator = SingleYearCalculator::new(&api, FallbackPolicy::new(&config));
//! let result = calculator.calculate_cached(&request, &mut cache.single_year).await?;
//! println!("Subsidy: {}", format_currency(result.subsidy()));
//! ```

use crate::api::{
    fallback, ApiHousehold, EstimateRequest, EstimateResponse, FallbackNotice, FallbackPolicy, Market,
    MarketplaceApi, Place, PlanStat, PlanStatsRequest,
};
use crate::cache::{CacheSlot, InputFingerprint, SingleYearInputs};
use crate::error::{ForecastError, Result};
use crate::household::Household;
use serde::Serialize;

/// Inputs for a single-year calculation
#[derive(Debug, Clone)]
pub struct SingleYearRequest {
    pub zipcode: String,
    pub place: Place,
    pub household: Household,
    pub income: i64,
    pub coverage_year: i32,
}

impl SingleYearRequest {
    /// Cache key over ZIP, place, people, married status, income and coverage year
    pub fn fingerprint(&self) -> Result<InputFingerprint> {
        InputFingerprint::of(&SingleYearInputs {
            zipcode: &self.zipcode,
            place: &self.place,
            people: &self.household.people,
            has_married_couple: self.household.has_married_couple,
            income: self.income,
            coverage_year: self.coverage_year,
        })
    }
}

/// Estimate and plan statistics for one year
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SingleYearResult {
    pub estimate: EstimateResponse,
    pub plan_stats: Vec<PlanStat>,
    pub fallback_occurred: bool,
    pub requested_year: i32,
    /// Coverage year whose data was returned
    pub year_used: i32,
}

impl SingleYearResult {
    /// Monthly subsidy, zero when none was estimated
    pub fn subsidy(&self) -> f64 {
        self.estimate.aptc()
    }

    pub fn fallback_notice(&self) -> Option<FallbackNotice> {
        self.fallback_occurred.then_some(FallbackNotice {
            requested_year: self.requested_year,
            used_year: self.year_used,
        })
    }
}

/// Runs single-year calculations against the marketplace
pub struct SingleYearCalculator<'a, A> {
    api: &'a A,
    fallback: FallbackPolicy,
}

impl<'a, A: MarketplaceApi> SingleYearCalculator<'a, A> {
    pub fn new(api: &'a A, fallback: FallbackPolicy) -> Self {
        Self { api, fallback }
    }

    /// Request the estimate and plan stats together
    pub async fn calculate(&self, request: &SingleYearRequest) -> Result<SingleYearResult> {
        if request.income < 0 {
            return Err(ForecastError::NegativeIncome(request.income));
        }

        let members = request.household.active_members();
        if members.is_empty() || !members.iter().any(|p| p.aptc_eligible) {
            return Err(ForecastError::NoEligibleMembers);
        }

        let household = ApiHousehold::new(request.income, &members, request.household.has_married_couple);
        let estimate_request = EstimateRequest {
            household: household.clone(),
            place: request.place.clone(),
            year: request.coverage_year,
        };
        let stats_request = PlanStatsRequest {
            market: Market::Individual,
            household,
            place: request.place.clone(),
            year: request.coverage_year,
        };

        let (estimate, stats) = tokio::try_join!(
            fallback::eligibility_estimate(self.api, &self.fallback, &estimate_request),
            fallback::plan_stats(self.api, &self.fallback, &stats_request),
        )?;

        let fallback_occurred = estimate.fallback_occurred || stats.fallback_occurred;
        let year_used = if estimate.fallback_occurred {
            estimate.used_year
        } else {
            stats.used_year
        };
        if fallback_occurred {
            log::warn!(
                "Single-year estimate used {} data instead of {}",
                year_used,
                request.coverage_year
            );
        }

        Ok(SingleYearResult {
            estimate: estimate.data,
            plan_stats: stats.data,
            fallback_occurred,
            requested_year: request.coverage_year,
            year_used,
        })
    }

    /// Return the cached result for unchanged inputs, otherwise calculate and cache
    pub async fn calculate_cached(
        &self,
        request: &SingleYearRequest,
        cache: &mut CacheSlot<SingleYearResult>,
    ) -> Result<SingleYearResult> {
        let fingerprint = request.fingerprint()?;
        if let Some(cached) = cache.get(&fingerprint) {
            log::debug!("Single-year cache hit for income {}", request.income);
            return Ok(cached.clone());
        }

        let result = self.calculate(request).await?;
        cache.store(fingerprint, result.clone());
        Ok(result)
    }
}
