//! Marketplace request and response structures

use crate::household::{Gender, Person, UtilizationLevel, ADULT_DEPENDENT_AGE};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Location used for rating plans
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Place {
    pub zipcode: String,
    pub state: String,
    pub countyfips: String,
    #[serde(rename = "countyName")]
    pub county_name: String,
}

/// A county served by a ZIP code
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct County {
    pub zipcode: String,
    pub name: String,
    pub fips: String,
    pub state: String,
}

impl County {
    pub fn to_place(&self) -> Place {
        Place {
            zipcode: self.zipcode.clone(),
            state: self.state.clone(),
            countyfips: self.fips.clone(),
            county_name: self.name.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CountiesResponse {
    #[serde(default)]
    pub counties: Vec<County>,
}

/// Household member as the marketplace expects it
///
/// Identity, display name, dependent flag and coverage age stay internal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiPerson {
    pub aptc_eligible: bool,
    pub age: u32,
    pub has_mec: bool,
    pub is_pregnant: bool,
    pub is_parent: bool,
    pub uses_tobacco: bool,
    pub gender: Gender,
    pub utilization_level: UtilizationLevel,
}

impl From<&Person> for ApiPerson {
    fn from(person: &Person) -> Self {
        // The marketplace rejects adult dependents flagged as parents
        let is_parent = person.is_parent
            && !(person.is_child_dependent && person.age >= ADULT_DEPENDENT_AGE);
        Self {
            aptc_eligible: person.aptc_eligible,
            age: person.age,
            has_mec: person.has_mec,
            is_pregnant: person.is_pregnant,
            is_parent,
            uses_tobacco: person.uses_tobacco,
            gender: person.gender,
            utilization_level: person.utilization_level,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnemploymentStatus {
    #[default]
    None,
    Received,
    Mixed,
}

/// Household section of estimate and plan-stats requests
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiHousehold {
    pub income: i64,
    pub people: Vec<ApiPerson>,
    pub has_married_couple: bool,
    pub unemployment_received: UnemploymentStatus,
}

impl ApiHousehold {
    /// Build the request household from this year's active members
    pub fn new(income: i64, members: &[&Person], has_married_couple: bool) -> Self {
        Self {
            income,
            people: members.iter().map(|p| ApiPerson::from(*p)).collect(),
            has_married_couple,
            unemployment_received: UnemploymentStatus::None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EstimateRequest {
    pub household: ApiHousehold,
    pub place: Place,
    pub year: i32,
}

impl EstimateRequest {
    pub fn with_year(&self, year: i32) -> Self {
        Self { year, ..self.clone() }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Market {
    #[default]
    Individual,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanStatsRequest {
    pub market: Market,
    pub household: ApiHousehold,
    pub place: Place,
    pub year: i32,
}

impl PlanStatsRequest {
    pub fn with_year(&self, year: i32) -> Self {
        Self { year, ..self.clone() }
    }
}

/// Eligibility estimate for one household member group
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Estimate {
    /// Monthly advance premium tax credit
    pub aptc: Option<f64>,
    #[serde(default)]
    pub hardship_exemption: bool,
    #[serde(default)]
    pub is_medicaid_chip: bool,
    #[serde(default)]
    pub in_coverage_gap: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EstimateResponse {
    #[serde(default)]
    pub estimates: Vec<Estimate>,
}

impl EstimateResponse {
    /// Subsidy of the first estimate, zero when the marketplace returned none
    pub fn aptc(&self) -> f64 {
        self.estimates.first().and_then(|e| e.aptc).unwrap_or(0.0)
    }
}

/// Min / mean / max of a cost across the plans of one metal level
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CostRange {
    pub min: f64,
    pub mean: f64,
    pub max: f64,
}

impl CostRange {
    pub fn shifted(&self, amount: f64) -> Self {
        Self {
            min: self.min + amount,
            mean: self.mean + amount,
            max: self.max + amount,
        }
    }
}

/// Premium and out-of-pocket statistics for one metal level
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanStat {
    /// Bronze, Silver, Gold, or whatever else the marketplace reports
    pub metal_level: String,
    /// Number of plans at this level
    pub total: u32,
    pub premiums: CostRange,
    pub oopc: CostRange,
}

/// Result of a fallback-aware call
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceResponse<T> {
    pub data: T,
    /// Coverage year whose data was actually returned
    pub used_year: i32,
    pub fallback_occurred: bool,
}

/// Requested coverage year was unavailable and an earlier year was used instead
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FallbackNotice {
    pub requested_year: i32,
    pub used_year: i32,
}

impl fmt::Display for FallbackNotice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "We couldn't retrieve data for {}, as it may not be available yet. \
             Displaying results based on {} data. Projections may be less accurate.",
            self.requested_year, self.used_year
        )
    }
}
