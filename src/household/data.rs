//! Household data structures matching the marketplace household format

use serde::{Deserialize, Serialize};

/// Age at which a dependent is no longer sent to the marketplace as a parent
pub const ADULT_DEPENDENT_AGE: u32 = 19;

/// Default coverage age for dependents (age 26 ends parental coverage)
fn default_coverage_until_age() -> u32 {
    25
}

fn default_true() -> bool {
    true
}

/// Gender of a household member
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Gender {
    Male,
    Female,
}

/// Expected level of health care use, drives the out-of-pocket estimate
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum UtilizationLevel {
    Low,
    #[default]
    Medium,
    High,
}

/// A single household member
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Person {
    /// Stable identity, never sent to the marketplace
    pub id: String,

    /// Display name, used for column headers only
    pub name: String,

    /// Age in whole years
    pub age: u32,

    pub gender: Gender,

    /// Parent role (exclusive with `is_child_dependent`)
    #[serde(default)]
    pub is_parent: bool,

    /// Child dependent role (exclusive with `is_parent`)
    #[serde(default)]
    pub is_child_dependent: bool,

    /// Last age at which a dependent stays on the household plan
    #[serde(default = "default_coverage_until_age")]
    pub coverage_until_age: u32,

    #[serde(default)]
    pub uses_tobacco: bool,

    #[serde(default)]
    pub is_pregnant: bool,

    /// Has minimum essential coverage from elsewhere (employer, Medicare, ...)
    #[serde(default)]
    pub has_mec: bool,

    /// Seeking marketplace coverage
    #[serde(default = "default_true")]
    pub aptc_eligible: bool,

    #[serde(default)]
    pub utilization_level: UtilizationLevel,
}

impl Person {
    /// Create an adult seeking coverage, with every optional flag cleared
    pub fn adult(id: impl Into<String>, name: impl Into<String>, age: u32, gender: Gender) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            age,
            gender,
            is_parent: false,
            is_child_dependent: false,
            coverage_until_age: default_coverage_until_age(),
            uses_tobacco: false,
            is_pregnant: false,
            has_mec: false,
            aptc_eligible: true,
            utilization_level: UtilizationLevel::Medium,
        }
    }

    /// Create a child dependent covered until `coverage_until_age`
    pub fn child(
        id: impl Into<String>,
        name: impl Into<String>,
        age: u32,
        gender: Gender,
        coverage_until_age: u32,
    ) -> Self {
        Self {
            is_child_dependent: true,
            coverage_until_age,
            utilization_level: UtilizationLevel::Low,
            ..Self::adult(id, name, age, gender)
        }
    }

    /// Builder-style parent flag
    pub fn as_parent(mut self) -> Self {
        self.set_parent(true);
        self
    }

    /// Set the parent role; setting it clears the dependent role
    pub fn set_parent(&mut self, value: bool) {
        self.is_parent = value;
        if value {
            self.is_child_dependent = false;
        }
    }

    /// Set the dependent role; setting it clears the parent role
    pub fn set_child_dependent(&mut self, value: bool) {
        self.is_child_dependent = value;
        if value {
            self.is_parent = false;
        }
    }

    /// A dependent older than their coverage age has left the household plan
    pub fn is_aged_out(&self) -> bool {
        self.is_child_dependent && self.age > self.coverage_until_age
    }

    /// Non-dependent members are the adults of the household
    pub fn is_adult(&self) -> bool {
        !self.is_child_dependent
    }
}

/// A household change scheduled for a future projection year
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum FutureEvent {
    #[serde(rename = "Add Spouse")]
    AddSpouse {
        years_from_now: i32,
        /// Spouse's age today; they join at `current_age + years_from_now`
        current_age: i32,
        gender: Gender,
        #[serde(default)]
        utilization_level: UtilizationLevel,
    },
    #[serde(rename = "Add Child")]
    AddChild {
        years_from_now: i32,
        gender: Gender,
        #[serde(default = "default_coverage_until_age")]
        coverage_until_age: u32,
        #[serde(default)]
        utilization_level: UtilizationLevel,
    },
}

impl FutureEvent {
    pub fn years_from_now(&self) -> i32 {
        match self {
            FutureEvent::AddSpouse { years_from_now, .. }
            | FutureEvent::AddChild { years_from_now, .. } => *years_from_now,
        }
    }

    pub fn is_add_spouse(&self) -> bool {
        matches!(self, FutureEvent::AddSpouse { .. })
    }
}

/// Household composition at one point in time
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Household {
    pub people: Vec<Person>,
    pub has_married_couple: bool,
}

impl Household {
    pub fn new(people: Vec<Person>, has_married_couple: bool) -> Self {
        Self {
            people,
            has_married_couple,
        }
    }

    /// Members still covered this year (aged-out dependents excluded)
    pub fn active_members(&self) -> Vec<&Person> {
        self.people.iter().filter(|p| !p.is_aged_out()).collect()
    }

    /// True when at least one active member is seeking marketplace coverage
    pub fn has_eligible_active_member(&self) -> bool {
        self.people
            .iter()
            .any(|p| !p.is_aged_out() && p.aptc_eligible)
    }

    pub fn is_empty(&self) -> bool {
        self.people.is_empty()
    }

    pub fn len(&self) -> usize {
        self.people.len()
    }
}
