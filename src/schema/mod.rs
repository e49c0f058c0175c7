// src/schema/mod.rs

use crate::error::{Result, TrackerError};

pub const LOCATION: &str = "location";
pub const ISO_CODE: &str = "iso_code";
pub const DATE: &str = "date";
pub const PEOPLE_VACCINATED: &str = "people_vaccinated";
pub const PEOPLE_FULLY_VACCINATED: &str = "people_fully_vaccinated";
pub const PEOPLE_VACCINATED_PER_HUNDRED: &str = "people_vaccinated_per_hundred";
pub const PEOPLE_FULLY_VACCINATED_PER_HUNDRED: &str = "people_fully_vaccinated_per_hundred";
pub const DAILY_VACCINATIONS: &str = "daily_vaccinations";
pub const DAILY_VACCINATIONS_PER_MILLION: &str = "daily_vaccinations_per_million";

/// Every column the feed header must carry. Anything else is ignored.
pub const REQUIRED_COLUMNS: &[&str] = &[
    LOCATION,
    ISO_CODE,
    DATE,
    PEOPLE_VACCINATED,
    PEOPLE_FULLY_VACCINATED,
    PEOPLE_VACCINATED_PER_HUNDRED,
    PEOPLE_FULLY_VACCINATED_PER_HUNDRED,
    DAILY_VACCINATIONS,
    DAILY_VACCINATIONS_PER_MILLION,
];

/// Positions of the required columns within one feed's header line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnIndex {
    /// Number of fields in the header; shorter data lines are dropped.
    pub width: usize,
    pub location: usize,
    pub iso_code: usize,
    pub date: usize,
    pub people_vaccinated: usize,
    pub people_fully_vaccinated: usize,
    pub people_vaccinated_per_hundred: usize,
    pub people_fully_vaccinated_per_hundred: usize,
    pub daily_vaccinations: usize,
    pub daily_vaccinations_per_million: usize,
}

impl ColumnIndex {
    /// Build the index from a raw header line. Duplicate names resolve to
    /// the first occurrence.
    pub fn from_header(line: &str) -> Result<Self> {
        let headers: Vec<&str> = line.split(',').collect();
        let find = |name: &str| {
            headers
                .iter()
                .position(|h| *h == name)
                .ok_or_else(|| TrackerError::MissingColumn(name.to_string()))
        };

        Ok(Self {
            width: headers.len(),
            location: find(LOCATION)?,
            iso_code: find(ISO_CODE)?,
            date: find(DATE)?,
            people_vaccinated: find(PEOPLE_VACCINATED)?,
            people_fully_vaccinated: find(PEOPLE_FULLY_VACCINATED)?,
            people_vaccinated_per_hundred: find(PEOPLE_VACCINATED_PER_HUNDRED)?,
            people_fully_vaccinated_per_hundred: find(PEOPLE_FULLY_VACCINATED_PER_HUNDRED)?,
            daily_vaccinations: find(DAILY_VACCINATIONS)?,
            daily_vaccinations_per_million: find(DAILY_VACCINATIONS_PER_MILLION)?,
        })
    }
}
