//! Compact column headers for projected households

use super::state::ProjectedYear;
use crate::household::Person;
use std::collections::HashMap;

const FULL_NAME_MAX_MEMBERS: usize = 3;
const FULL_NAME_MAX_CHARS: usize = 11;

/// Identifiers stop growing at this length, even if duplicates remain
pub const MAX_IDENTIFIER_LEN: usize = 11;

fn combined_name_len(members: &[&Person]) -> usize {
    members.iter().map(|p| p.name.chars().count()).sum()
}

/// Label a household as `"<name> <age>"` pairs joined by `" / "`
///
/// Long or large households (or `force_initials`) use the shortest prefixes of each
/// name that tell members apart.
pub fn household_label(members: &[&Person], force_initials: bool) -> String {
    if members.is_empty() {
        return "N/A".to_string();
    }

    let use_full_names = !force_initials
        && members.len() <= FULL_NAME_MAX_MEMBERS
        && combined_name_len(members) <= FULL_NAME_MAX_CHARS;

    let identifiers: Vec<String> = if use_full_names {
        members.iter().map(|p| p.name.clone()).collect()
    } else {
        let names: Vec<&str> = members.iter().map(|p| p.name.as_str()).collect();
        initials(&names)
    };

    identifiers
        .iter()
        .zip(members)
        .map(|(id, p)| format!("{} {}", id, p.age))
        .collect::<Vec<_>>()
        .join(" / ")
}

/// Shortest distinguishing prefixes
///
/// A lone first letter is uppercased; longer identifiers are name prefixes as written.
fn initials(names: &[&str]) -> Vec<String> {
    let mut identifiers: Vec<String> = names
        .iter()
        .map(|name| name.chars().next().map(|c| c.to_uppercase().collect::<String>()).unwrap_or_default())
        .collect();

    let mut len = 1;
    loop {
        let mut counts: HashMap<&str, usize> = HashMap::new();
        for id in &identifiers {
            *counts.entry(id.as_str()).or_default() += 1;
        }
        let colliding: Vec<usize> = identifiers
            .iter()
            .enumerate()
            .filter(|(_, id)| counts[id.as_str()] > 1)
            .map(|(i, _)| i)
            .collect();

        if colliding.is_empty() {
            break;
        }
        len += 1;
        for i in colliding {
            // Prefixes keep the name's own case
            if names[i].chars().count() >= len {
                identifiers[i] = names[i].chars().take(len).collect();
            }
        }
        if len >= MAX_IDENTIFIER_LEN {
            break;
        }
    }

    identifiers
}

/// Whether any projected year is too crowded for full names
///
/// Decided once for the whole projection so every column uses the same style.
pub fn needs_initials(years: &[ProjectedYear]) -> bool {
    years.iter().any(|year| {
        let members = year.active_members();
        members.len() > FULL_NAME_MAX_MEMBERS || combined_name_len(&members) > FULL_NAME_MAX_CHARS
    })
}
