//! Household composition rules
//!
//! Every violated rule is reported; nothing is corrected silently.

use super::data::{FutureEvent, Person};

/// Check people and future events, returning every rule violation found
pub fn validate_household(people: &[Person], has_married_couple: bool, events: &[FutureEvent]) -> Vec<String> {
    let mut errors = Vec::new();

    if people.is_empty() {
        errors.push("The household must have at least one member.".to_string());
    } else if !people.iter().any(|p| p.aptc_eligible) {
        errors.push("At least one household member must be seeking marketplace coverage.".to_string());
    }

    let has_children = people.iter().any(|p| p.is_child_dependent);
    let has_parents = people.iter().any(|p| p.is_parent);
    if has_children && !has_parents {
        errors.push(
            "At least one household member must be marked as 'Parent' when there is a 'Child dependent'."
                .to_string(),
        );
    }

    for p in people {
        if p.is_parent && p.is_child_dependent {
            errors.push(format!(
                "{} cannot be both a 'Parent' and a 'Child dependent'.",
                p.name
            ));
        }
        if p.is_child_dependent && p.coverage_until_age < p.age {
            errors.push(format!(
                "{}'s 'Coverage Until Age' ({}) cannot be less than their current age ({}).",
                p.name, p.coverage_until_age, p.age
            ));
        }
    }

    for event in events {
        if let FutureEvent::AddSpouse { current_age, .. } = event {
            if *current_age < 0 {
                errors.push("Future spouse's age cannot be negative.".to_string());
            }
        }
        if event.years_from_now() <= 0 {
            errors.push("'Years from now' for a future event must be greater than 0.".to_string());
        }
    }

    let pending_spouses = events.iter().filter(|e| e.is_add_spouse()).count();
    if has_married_couple && pending_spouses > 0 {
        errors.push("A future spouse cannot be added to a household that already has a married couple.".to_string());
    } else if pending_spouses > 1 {
        errors.push("Only one future spouse can be added.".to_string());
    }

    errors
}
