//! Year-by-year household projection
//!
//! Everyone ages one year per step and scheduled events add members. The projection
//! ends once the adults have all reached Medicare age, since marketplace coverage no
//! longer applies to them.

use crate::config::ForecastConfig;
use crate::household::{FutureEvent, Household, Person};
use serde::Serialize;

/// Household composition in one projection year
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectedYear {
    /// Years from today (0 = current year)
    pub offset: u32,

    /// Deep copy of the household for this year
    pub household: Household,
}

impl ProjectedYear {
    /// Members still covered this year
    pub fn active_members(&self) -> Vec<&Person> {
        self.household.active_members()
    }

    /// True when an active member is seeking marketplace coverage
    pub fn has_eligible_member(&self) -> bool {
        self.household.has_eligible_active_member()
    }
}

/// Running state of a household projection
#[derive(Debug, Clone)]
pub struct ProjectionState {
    /// Current year index (0 = today)
    pub year_index: u32,

    /// Household as of `year_index`
    pub household: Household,
}

impl ProjectionState {
    /// Initialize state from today's household
    pub fn from_household(household: &Household) -> Self {
        Self {
            year_index: 0,
            household: household.clone(),
        }
    }

    /// Capture the current year
    pub fn snapshot(&self) -> ProjectedYear {
        ProjectedYear {
            offset: self.year_index,
            household: self.household.clone(),
        }
    }

    /// True once every adult (or, with no adults, every member) is at Medicare age
    pub fn reached_medicare(&self, medicare_age: u32) -> bool {
        let people = &self.household.people;
        if people.is_empty() {
            return false;
        }

        let mut adults = people.iter().filter(|p| p.is_adult()).peekable();
        if adults.peek().is_some() {
            adults.all(|p| p.age >= medicare_age)
        } else {
            people.iter().all(|p| p.age >= medicare_age)
        }
    }

    /// Advance to the next year: age everyone, then apply that year's events
    pub fn advance_year(&mut self, events: &[FutureEvent]) {
        for person in &mut self.household.people {
            person.age = person.age.saturating_add(1);
        }

        let next_index = self.year_index + 1;
        for (i, event) in events.iter().enumerate() {
            if event.years_from_now() != next_index as i32 {
                continue;
            }
            match *event {
                FutureEvent::AddSpouse {
                    years_from_now,
                    current_age,
                    gender,
                    utilization_level,
                } => {
                    let age = current_age.saturating_add(years_from_now).max(0) as u32;
                    let mut spouse = Person::adult(format!("future_spouse_{}", i), "Spouse", age, gender).as_parent();
                    spouse.utilization_level = utilization_level;
                    self.household.people.push(spouse);
                    self.household.has_married_couple = true;
                }
                FutureEvent::AddChild {
                    gender,
                    coverage_until_age,
                    utilization_level,
                    ..
                } => {
                    let mut child = Person::child(format!("future_child_{}", i), "Child", 0, gender, coverage_until_age);
                    child.utilization_level = utilization_level;
                    self.household.people.push(child);
                }
            }
        }

        self.year_index = next_index;
    }
}

/// Project `initial` forward until Medicare age or `config.max_projection_years`
///
/// The first entry is always today's household. Deterministic: the same inputs give
/// the same sequence.
pub fn project_household(initial: &Household, events: &[FutureEvent], config: &ForecastConfig) -> Vec<ProjectedYear> {
    let mut state = ProjectionState::from_household(initial);
    let mut years = Vec::new();

    for _ in 0..config.max_projection_years {
        years.push(state.snapshot());
        if state.reached_medicare(config.medicare_age) {
            break;
        }
        state.advance_year(events);
    }

    years
}
