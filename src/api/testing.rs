//! Scripted in-memory marketplace for unit tests
//!
//! Every call is recorded so tests can assert exactly which requests went out.

use super::client::MarketplaceApi;
use super::types::{
    ApiHousehold, CostRange, CountiesResponse, County, Estimate, EstimateRequest, EstimateResponse, Place,
    PlanStat, PlanStatsRequest,
};
use crate::error::ApiError;
use crate::household::{Gender, Person};
use std::cell::RefCell;
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Call {
    Counties { zip: String, year: i32 },
    Estimate { year: i32, income: i64, ages: Vec<u32> },
    PlanStats { year: i32, income: i64, ages: Vec<u32> },
}

impl Call {
    pub(crate) fn year(&self) -> i32 {
        match self {
            Call::Counties { year, .. } | Call::Estimate { year, .. } | Call::PlanStats { year, .. } => *year,
        }
    }
}

pub(crate) fn sample_place() -> Place {
    Place {
        zipcode: "60040".to_string(),
        state: "IL".to_string(),
        countyfips: "17097".to_string(),
        county_name: "Lake County".to_string(),
    }
}

pub(crate) fn county(zip: &str, name: &str, fips: &str, state: &str) -> County {
    County {
        zipcode: zip.to_string(),
        name: name.to_string(),
        fips: fips.to_string(),
        state: state.to_string(),
    }
}

#[derive(Debug, Default)]
pub(crate) struct ScriptedApi {
    unavailable_years: HashSet<i32>,
    failing_incomes: HashSet<i64>,
    counties: HashMap<String, Vec<County>>,
    calls: RefCell<Vec<Call>>,
}

impl ScriptedApi {
    pub(crate) fn new() -> Self {
        let mut counties = HashMap::new();
        counties.insert("60040".to_string(), vec![county("60040", "Lake County", "17097", "IL")]);
        Self {
            counties,
            ..Default::default()
        }
    }

    /// Every call for `year` fails as unpublished
    pub(crate) fn unavailable_year(mut self, year: i32) -> Self {
        self.unavailable_years.insert(year);
        self
    }

    /// Plan-stats calls for `income` fail; estimates still succeed
    pub(crate) fn failing_income(mut self, income: i64) -> Self {
        self.failing_incomes.insert(income);
        self
    }

    pub(crate) fn with_counties(mut self, zip: &str, counties: Vec<County>) -> Self {
        self.counties.insert(zip.to_string(), counties);
        self
    }

    pub(crate) fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    pub(crate) fn years_requested(&self) -> Vec<i32> {
        self.calls.borrow().iter().map(Call::year).collect()
    }

    pub(crate) fn plan_stats_calls(&self) -> usize {
        self.calls
            .borrow()
            .iter()
            .filter(|c| matches!(c, Call::PlanStats { .. }))
            .count()
    }

    pub(crate) fn household(income: i64) -> ApiHousehold {
        let adult = Person::adult("1", "Pat", 40, Gender::Female);
        ApiHousehold::new(income, &[&adult], false)
    }

    /// Monthly subsidy the fake marketplace grants at `income`
    pub(crate) fn aptc_for(income: i64) -> f64 {
        (100_000 - income).max(0) as f64 / 100.0
    }

    /// Plan statistics the fake marketplace returns for `people` members
    pub(crate) fn stats_for(people: usize) -> Vec<PlanStat> {
        let n = people as f64;
        let stat = |metal: &str, min: f64, mean: f64, max: f64| PlanStat {
            metal_level: metal.to_string(),
            total: 12,
            premiums: CostRange { min: min * n, mean: mean * n, max: max * n },
            oopc: CostRange { min: 1_000.0, mean: 2_500.0, max: 6_000.0 },
        };
        vec![
            stat("Bronze", 300.0, 400.0, 500.0),
            stat("Silver", 450.0, 550.0, 700.0),
            stat("Gold", 600.0, 700.0, 900.0),
        ]
    }

    fn check_year(&self, year: i32) -> Result<(), ApiError> {
        if self.unavailable_years.contains(&year) {
            return Err(ApiError::Status {
                status: 404,
                reason: "Not Found".to_string(),
                year,
            });
        }
        Ok(())
    }
}

impl MarketplaceApi for ScriptedApi {
    async fn counties_by_zip(&self, zip: &str, year: i32) -> Result<CountiesResponse, ApiError> {
        self.calls.borrow_mut().push(Call::Counties {
            zip: zip.to_string(),
            year,
        });
        self.check_year(year)?;
        Ok(CountiesResponse {
            counties: self.counties.get(zip).cloned().unwrap_or_default(),
        })
    }

    async fn eligibility_estimate(&self, request: &EstimateRequest) -> Result<EstimateResponse, ApiError> {
        self.calls.borrow_mut().push(Call::Estimate {
            year: request.year,
            income: request.household.income,
            ages: request.household.people.iter().map(|p| p.age).collect(),
        });
        self.check_year(request.year)?;
        Ok(EstimateResponse {
            estimates: vec![Estimate {
                aptc: Some(Self::aptc_for(request.household.income)),
                ..Default::default()
            }],
        })
    }

    async fn plan_stats(&self, request: &PlanStatsRequest) -> Result<Vec<PlanStat>, ApiError> {
        self.calls.borrow_mut().push(Call::PlanStats {
            year: request.year,
            income: request.household.income,
            ages: request.household.people.iter().map(|p| p.age).collect(),
        });
        self.check_year(request.year)?;
        if self.failing_incomes.contains(&request.household.income) {
            return Err(ApiError::Message("Internal Server Error".to_string()));
        }
        Ok(Self::stats_for(request.household.people.len()))
    }
}
