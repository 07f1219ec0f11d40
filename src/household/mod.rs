//! Household data structures, composition rules and scenario loading

mod data;
mod validation;
pub mod loader;

pub use data::{FutureEvent, Gender, Household, Person, UtilizationLevel, ADULT_DEPENDENT_AGE};
pub use loader::{load_scenario, load_scenario_from_reader, Scenario};
pub use validation::validate_household;
