// src/dataset/mod.rs

use serde::Serialize;
use std::collections::HashSet;

pub const DEFAULT_LOCATION: &str = "World";

/// One row of the feed. Every numeric field is independently optional.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VaccinationRecord {
    pub location: String,
    pub iso_code: String,
    /// `yyyy-MM-dd`, kept as text; zero padding makes string order chronological.
    pub date: String,
    pub people_vaccinated: Option<u64>,
    pub people_fully_vaccinated: Option<u64>,
    pub people_vaccinated_per_hundred: Option<f64>,
    pub people_fully_vaccinated_per_hundred: Option<f64>,
    /// Smoothed doses per day around `date`.
    pub daily_vaccinations: Option<u64>,
    pub daily_vaccinations_per_million: Option<u64>,
}

impl VaccinationRecord {
    /// Placeholder returned when nothing matches a lookup.
    pub fn empty() -> Self {
        Self {
            location: "Unknown".to_string(),
            iso_code: "???".to_string(),
            date: "Never".to_string(),
            people_vaccinated: None,
            people_fully_vaccinated: None,
            people_vaccinated_per_hundred: None,
            people_fully_vaccinated_per_hundred: None,
            daily_vaccinations: None,
            daily_vaccinations_per_million: None,
        }
    }
}

/// All rows from the most recent successful fetch plus the selected location.
#[derive(Debug, Clone)]
pub struct VaccinationDataset {
    records: Vec<VaccinationRecord>,
    location: String,
}

impl Default for VaccinationDataset {
    fn default() -> Self {
        Self::new(DEFAULT_LOCATION)
    }
}

impl VaccinationDataset {
    pub fn new(location: impl Into<String>) -> Self {
        Self {
            records: Vec::new(),
            location: location.into(),
        }
    }

    /// Swap in a whole new row set. The selection is left alone.
    pub fn replace_all(&mut self, records: Vec<VaccinationRecord>) {
        self.records = records;
    }

    /// Select a location. Unknown names are accepted and simply match nothing.
    pub fn set_location(&mut self, name: impl Into<String>) {
        self.location = name.into();
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Distinct location names, unordered.
    pub fn locations(&self) -> HashSet<String> {
        self.records.iter().map(|r| r.location.clone()).collect()
    }

    /// Latest record for the selected location.
    pub fn latest(&self) -> VaccinationRecord {
        self.latest_for(&self.location)
    }

    /// Record for `location` with the greatest date string, or the empty
    /// placeholder. Which of several equal-date rows wins is unspecified.
    pub fn latest_for(&self, location: &str) -> VaccinationRecord {
        self.records
            .iter()
            .filter(|r| r.location == location)
            .max_by(|a, b| a.date.cmp(&b.date))
            .cloned()
            .unwrap_or_else(VaccinationRecord::empty)
    }
}
