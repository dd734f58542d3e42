//! Era classification from the set of known technologies.

use hearthage_protocol::{Era, TechSet};

use crate::rules::Rules;

/// Classify the current era. Pure function of the tech set.
///
/// Scans the era rules first to last and keeps the LAST rule whose full
/// requirement set is known. Table order is the only ordering: iron lists
/// the same requirement as bronze and appears later, so iron wins once
/// bronze-working is known.
pub fn compute_era(rules: &Rules, tech: &TechSet) -> Era {
    let mut current = Era::Stone;
    for rule in &rules.eras {
        if rule.requires.iter().all(|req| tech.knows(req)) {
            current = rule.era;
        }
    }
    current
}
