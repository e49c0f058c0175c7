// src/tracker/mod.rs
pub mod scheduler;

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::{
    collections::HashSet,
    sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard},
};
use tokio::time::Instant;
use tracing::{info, warn};

use crate::dataset::{VaccinationDataset, VaccinationRecord};
use crate::error::{Result, TrackerError};
use crate::estimate::{estimate_people, estimate_per_hundred, format_count, format_percentage};
use crate::fetch::Fetch;
use crate::process::parse_records;

/// Owned, lock-guarded dataset shared by the refresh and read paths.
/// Share it as `Arc<Tracker>`.
pub struct Tracker {
    state: RwLock<VaccinationDataset>,
}

/// Every display value for one rendering, computed from a single view of
/// the dataset.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    pub location: String,
    pub last_updated: String,
    pub percentage: String,
    pub estimated_percentage: String,
    pub people_vaccinated: Option<u64>,
    pub estimated_people_vaccinated: Option<i64>,
    pub people_fully_vaccinated_per_hundred: String,
    pub computed_at: DateTime<Utc>,
}

impl Snapshot {
    /// Short form for a status line: the estimate or the last-known value.
    pub fn headline(&self, live: bool) -> &str {
        if live {
            &self.estimated_percentage
        } else {
            &self.percentage
        }
    }

    /// One line per value, last-known next to estimated.
    pub fn lines(&self) -> Vec<String> {
        vec![
            format!("Percentage vaccinated (last update): {}", self.percentage),
            format!(
                "Estimated percentage vaccinated (real-time): {}",
                self.estimated_percentage
            ),
            format!(
                "People vaccinated (last update): {}",
                format_count(self.people_vaccinated.and_then(|n| i64::try_from(n).ok()))
            ),
            format!(
                "Estimated people vaccinated (real-time): {}",
                format_count(self.estimated_people_vaccinated)
            ),
            format!(
                "Fully vaccinated (last update): {}",
                self.people_fully_vaccinated_per_hundred
            ),
            format!("Last updated: {}", self.last_updated),
            format!("Country: {}", self.location),
        ]
    }
}

impl Default for Tracker {
    fn default() -> Self {
        Self::new(VaccinationDataset::default())
    }
}

impl Tracker {
    pub fn new(dataset: VaccinationDataset) -> Self {
        Self {
            state: RwLock::new(dataset),
        }
    }

    /// Start with `location` selected and no rows.
    pub fn with_location(location: impl Into<String>) -> Self {
        Self::new(VaccinationDataset::new(location))
    }

    // Each mutation is one assignment, so a poisoned lock still holds a whole value.
    fn read(&self) -> RwLockReadGuard<'_, VaccinationDataset> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, VaccinationDataset> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Fetch, parse and swap in a new dataset. Nothing is locked while the
    /// fetch or parse runs; on any error the current rows stay in place.
    /// Returns the number of rows now held.
    #[tracing::instrument(level = "info", skip(self, fetcher))]
    pub async fn try_refresh<F: Fetch>(&self, fetcher: &F, url: &str) -> Result<usize> {
        let start = Instant::now();
        let bytes = fetcher
            .fetch(url)
            .await
            .map_err(|e| TrackerError::Transport {
                url: url.to_string(),
                reason: format!("{:#}", e),
            })?;
        let size_bytes = bytes.len();
        let text = String::from_utf8(bytes)?;

        // offload the parse to the blocking pool
        let records = tokio::task::spawn_blocking(move || parse_records(&text)).await??;
        let rows = records.len();

        let locations = {
            let mut state = self.write();
            state.replace_all(records);
            state.locations().len()
        };
        info!(rows, locations, size_bytes, elapsed = ?start.elapsed(), "dataset replaced");
        Ok(rows)
    }

    /// [`try_refresh`](Self::try_refresh) reduced to success or failure.
    pub async fn refresh<F: Fetch>(&self, fetcher: &F, url: &str) -> bool {
        match self.try_refresh(fetcher, url).await {
            Ok(_) => true,
            Err(e) if e.is_format_failure() => {
                warn!(error = %e, "feed format changed; keeping previous dataset");
                false
            }
            Err(e) => {
                warn!(error = %e, "refresh failed; keeping previous dataset");
                false
            }
        }
    }

    pub fn latest(&self) -> VaccinationRecord {
        self.read().latest()
    }

    pub fn locations(&self) -> HashSet<String> {
        self.read().locations()
    }

    /// Locations in alphabetical order, for selection lists.
    pub fn sorted_locations(&self) -> Vec<String> {
        let mut locs: Vec<String> = self.locations().into_iter().collect();
        locs.sort();
        locs
    }

    pub fn location(&self) -> String {
        self.read().location().to_string()
    }

    pub fn change_location(&self, name: &str) {
        let previous = {
            let mut state = self.write();
            let previous = state.location().to_string();
            state.set_location(name);
            previous
        };
        info!(from = %previous, to = %name, "location changed");
    }

    pub fn percentage_vaccinated(&self, estimate: bool) -> String {
        self.percentage_vaccinated_at(estimate, Utc::now())
    }

    pub fn percentage_vaccinated_at(&self, estimate: bool, now: DateTime<Utc>) -> String {
        let latest = self.latest();
        if estimate {
            format_percentage(estimated_per_hundred_or_none(&latest, now))
        } else {
            format_percentage(latest.people_vaccinated_per_hundred)
        }
    }

    pub fn estimated_people_vaccinated(&self) -> Option<i64> {
        self.estimated_people_vaccinated_at(Utc::now())
    }

    pub fn estimated_people_vaccinated_at(&self, now: DateTime<Utc>) -> Option<i64> {
        estimated_people_or_none(&self.latest(), now)
    }

    pub fn snapshot(&self) -> Snapshot {
        self.snapshot_at(Utc::now())
    }

    pub fn snapshot_at(&self, now: DateTime<Utc>) -> Snapshot {
        let latest = self.latest();
        Snapshot {
            percentage: format_percentage(latest.people_vaccinated_per_hundred),
            estimated_percentage: format_percentage(estimated_per_hundred_or_none(&latest, now)),
            people_vaccinated: latest.people_vaccinated,
            estimated_people_vaccinated: estimated_people_or_none(&latest, now),
            people_fully_vaccinated_per_hundred: format_percentage(
                latest.people_fully_vaccinated_per_hundred,
            ),
            last_updated: latest.date,
            location: latest.location,
            computed_at: now,
        }
    }
}

// A bad date only costs the estimate; last-known values are still shown.
fn estimated_per_hundred_or_none(record: &VaccinationRecord, now: DateTime<Utc>) -> Option<f64> {
    estimate_per_hundred(record, now).unwrap_or_else(|e| {
        warn!(location = %record.location, error = %e, "cannot estimate percentage");
        None
    })
}

fn estimated_people_or_none(record: &VaccinationRecord, now: DateTime<Utc>) -> Option<i64> {
    estimate_people(record, now).unwrap_or_else(|e| {
        warn!(location = %record.location, error = %e, "cannot estimate people vaccinated");
        None
    })
}
