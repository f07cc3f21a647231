//! CSV transfer-job loader.
//!
//! # CSV format
//!
//! One row per transfer job, times in simulated seconds:
//!
//! ```csv
//! quantity,pickup_location,pickup_after,dropoff_location,dropoff_before
//! 5,2,180,10,1800
//! 6,2,180,4,1500
//! ```
//!
//! Rows are validated (positive quantity, non-inverted window) and turned
//! into jobs with sequential ids in file order.

use std::io::Read;
use std::path::Path;

use serde::Deserialize;

use cartage_core::{LocationId, SimTime};
use cartage_fleet::{Job, JobFactory};

use crate::error::GenError;

// ── CSV record ────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct TransferRecord {
    quantity:         u32,
    pickup_location:  u32,
    pickup_after:     i64,
    dropoff_location: u32,
    dropoff_before:   i64,
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Load transfer jobs from a CSV file.
pub fn load_transfers_csv(path: &Path) -> Result<Vec<Job>, GenError> {
    let file = std::fs::File::open(path)?;
    load_transfers_reader(file)
}

/// Like [`load_transfers_csv`] but accepts any `Read` source.
///
/// Useful for testing (pass a `std::io::Cursor`) or embedded schedules.
pub fn load_transfers_reader<R: Read>(reader: R) -> Result<Vec<Job>, GenError> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let mut factory = JobFactory::new();
    let mut jobs = Vec::new();

    for (index, result) in csv_reader.deserialize::<TransferRecord>().enumerate() {
        let row = result.map_err(|e| GenError::Parse(e.to_string()))?;

        if row.quantity == 0 {
            return Err(GenError::Parse(format!("row {index}: quantity must be positive")));
        }
        if row.pickup_after > row.dropoff_before {
            return Err(GenError::Parse(format!(
                "row {index}: pickup_after {} is later than dropoff_before {}",
                row.pickup_after, row.dropoff_before
            )));
        }

        jobs.push(factory.transfer(
            row.quantity,
            LocationId(row.pickup_location),
            SimTime(row.pickup_after),
            LocationId(row.dropoff_location),
            SimTime(row.dropoff_before),
        ));
    }

    Ok(jobs)
}
