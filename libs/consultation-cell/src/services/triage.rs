// libs/consultation-cell/src/services/triage.rs
use crate::models::{TriageData, UrgencyClassification};

const CRITICAL_SIGNS: &[&str] = &[
    "chest pain",
    "severe shortness of breath",
    "loss of consciousness",
    "seizure",
    "hemorrhage",
    "stroke",
    "heart attack",
    "major trauma",
];

const HIGH_SEVERITY_SIGNS: &[&str] = &[
    "high fever",
    "persistent vomiting",
    "severe diarrhea",
    "difficulty breathing",
    "intense pain",
    "mental confusion",
];

/// Score triage data into an urgency band. Critical signs short-circuit to red.
pub fn classify_urgency(triage: &TriageData) -> UrgencyClassification {
    let symptoms = triage.symptoms.to_lowercase();
    let vitals = &triage.vitals;

    let critical_sign = CRITICAL_SIGNS.iter().any(|sign| symptoms.contains(sign));
    let hypoxic = vitals.oxygen_saturation.map_or(false, |sat| sat < 90);
    if critical_sign || hypoxic {
        return UrgencyClassification::Red;
    }

    let mut points = 0u32;

    if let Some(temp) = vitals.temperature_celsius {
        if temp >= 39.5 || temp <= 35.0 {
            points += 3;
        } else if temp >= 38.5 {
            points += 2;
        }
    }

    if vitals.oxygen_saturation.map_or(false, |sat| sat < 95) {
        points += 2;
    }

    match vitals.pain_scale {
        Some(pain) if pain >= 8 => points += 3,
        Some(pain) if pain >= 6 => points += 2,
        _ => {}
    }

    points += 2 * HIGH_SEVERITY_SIGNS
        .iter()
        .filter(|sign| symptoms.contains(*sign))
        .count() as u32;

    match points {
        p if p >= 5 => UrgencyClassification::Red,
        p if p >= 3 => UrgencyClassification::Orange,
        p if p >= 1 => UrgencyClassification::Yellow,
        _ => UrgencyClassification::Green,
    }
}
