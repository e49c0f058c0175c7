pub mod config;
pub mod dataset;
pub mod error;
pub mod estimate;
pub mod fetch;
pub mod process;
pub mod schema;
pub mod tracker;

pub use dataset::{VaccinationDataset, VaccinationRecord};
pub use error::{Result, TrackerError};
pub use tracker::{Snapshot, Tracker};
