//! Load household scenarios from JSON
//!
//! A scenario file holds everything a user would enter in the household step:
//! location, members, planned future events and the incomes to analyze.

use super::{FutureEvent, Household, Person};
use crate::api::Place;
use crate::error::{ForecastError, Result};
use crate::projection::IncomeRange;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

fn default_income() -> i64 {
    90_000
}

/// Household inputs as read from a scenario file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    /// ZIP code the household lives in
    pub zipcode: String,

    /// Pre-resolved location; looked up from `zipcode` when absent
    #[serde(default)]
    pub place: Option<Place>,

    pub people: Vec<Person>,

    #[serde(default)]
    pub has_married_couple: bool,

    #[serde(default)]
    pub future_events: Vec<FutureEvent>,

    /// Income for the single-year estimate
    #[serde(default = "default_income")]
    pub income: i64,

    /// Incomes for the long-term analysis
    #[serde(default)]
    pub income_range: IncomeRange,
}

impl Scenario {
    /// Household snapshot for the current year
    pub fn household(&self) -> Household {
        Household::new(self.people.clone(), self.has_married_couple)
    }
}

/// Load a scenario from a JSON file
pub fn load_scenario<P: AsRef<Path>>(path: P) -> Result<Scenario> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| ForecastError::Io {
        path: path.display().to_string(),
        source,
    })?;
    load_scenario_from_reader(BufReader::new(file))
}

/// Load a scenario from any reader (e.g., string buffer, network stream)
pub fn load_scenario_from_reader<R: std::io::Read>(reader: R) -> Result<Scenario> {
    let scenario: Scenario = serde_json::from_reader(reader)?;
    log::debug!(
        "Loaded scenario for ZIP {} with {} people and {} future events",
        scenario.zipcode,
        scenario.people.len(),
        scenario.future_events.len()
    );
    Ok(scenario)
}
