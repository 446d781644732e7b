use regex::{Regex, RegexBuilder};

use crate::error::{Result, TourismError};
use crate::models::{Entities, Intent};

const DATE_PATTERNS: &[&str] = &[
    r"\b(today|tomorrow|yesterday)\b",
    r"\b(\d{1,2}[/-]\d{1,2}[/-]\d{2,4})\b",
    r"\b(monday|tuesday|wednesday|thursday|friday|saturday|sunday)\b",
    r"\b(january|february|march|april|may|june|july|august|september|october|november|december)\b",
];

const QUANTITY_PATTERNS: &[&str] = &[
    r"\b(\d+)\s*(people|persons?|guests?|adults?|child(?:ren)?)\b",
    r"\b(\d+)\s*(nights?|days?|hours?)\b",
];

const DOLLAR_PATTERN: &str = r"\$(\d+(?:\.\d{2})?)\b";

const LOCATION_INDICATORS: &[&str] = &["in", "at", "near", "to", "from"];

const ROOM_TYPES: &[&str] = &["single", "double", "suite", "family", "deluxe"];

const SERVICE_PATTERN: &str = r"\b(room|hotel|flight|tour|ticket|rental)\b";

fn compile(pattern: &str, case_insensitive: bool) -> Result<Regex> {
    RegexBuilder::new(pattern)
        .case_insensitive(case_insensitive)
        .build()
        .map_err(|e| TourismError::Internal(format!("Invalid entity pattern '{pattern}': {e}")))
}

/// Best-effort extraction of dates, quantities, locations and intent-specific entities.
pub struct EntityExtractor {
    dates: Vec<Regex>,
    quantities: Vec<Regex>,
    dollars: Regex,
    locations: Vec<Regex>,
    services: Regex,
}

impl EntityExtractor {
    pub fn new() -> Result<Self> {
        Ok(Self {
            dates: DATE_PATTERNS
                .iter()
                .map(|p| compile(p, true))
                .collect::<Result<_>>()?,
            quantities: QUANTITY_PATTERNS
                .iter()
                .map(|p| compile(p, true))
                .collect::<Result<_>>()?,
            dollars: compile(DOLLAR_PATTERN, false)?,
            // The indicator is case-insensitive, the place name must be capitalized.
            locations: LOCATION_INDICATORS
                .iter()
                .map(|indicator| {
                    compile(
                        &format!(r"\b(?i:{indicator})\s+([A-Z][a-z]+(?:\s+[A-Z][a-z]+)*)\b"),
                        false,
                    )
                })
                .collect::<Result<_>>()?,
            services: compile(SERVICE_PATTERN, true)?,
        })
    }

    pub fn extract(&self, text: &str, intent: Intent) -> Entities {
        let mut entities = Entities::new();
        let lower = text.to_lowercase();

        if let Some(dates) = self
            .dates
            .iter()
            .map(|re| first_groups(re, &lower))
            .find(|found| !found.is_empty())
        {
            entities.insert("dates".to_string(), dates);
        }

        let mut numbers = Vec::new();
        for re in &self.quantities {
            for caps in re.captures_iter(&lower) {
                numbers.push(format!("{} {}", &caps[1], &caps[2]));
            }
        }
        for caps in self.dollars.captures_iter(&lower) {
            numbers.push(format!("${}", &caps[1]));
        }
        if !numbers.is_empty() {
            entities.insert("numbers".to_string(), numbers);
        }

        if let Some(locations) = self
            .locations
            .iter()
            .map(|re| first_groups(re, text))
            .find(|found| !found.is_empty())
        {
            entities.insert("locations".to_string(), locations);
        }

        match intent {
            Intent::Booking => {
                let rooms: Vec<String> = ROOM_TYPES
                    .iter()
                    .filter(|room| lower.contains(*room))
                    .map(|room| room.to_string())
                    .collect();
                if !rooms.is_empty() {
                    entities.insert("room_types".to_string(), rooms);
                }
            }
            Intent::Pricing => {
                let services = first_groups(&self.services, &lower);
                if !services.is_empty() {
                    entities.insert("services".to_string(), services);
                }
            }
            _ => {}
        }

        entities
    }
}

fn first_groups(re: &Regex, haystack: &str) -> Vec<String> {
    re.captures_iter(haystack)
        .filter_map(|caps| caps.get(1).map(|m| m.as_str().to_string()))
        .collect()
}
