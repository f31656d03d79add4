//! CSV sales data loader.
//!
//! Parses point-of-sale export files into canonical `SaleRecord` structs.
//! Expected CSV columns:
//!   Sales Date, Menu, Menu Category, Qty, COGS Total,
//!   and Price and/or Total. Branch is optional.
//!
//! Missing required columns fail the load up front with the full list of
//! absent names. Individual rows that fail validation are skipped with a
//! warning; a load that yields zero usable rows is an error.

use std::collections::HashSet;
use std::io::Read;
use std::path::Path;

use crate::dataset::Dataset;
use crate::error::{EngineError, EngineResult};
use crate::record::RawSaleRow;

/// Columns that must always be present in the header row.
const REQUIRED_COLUMNS: [&str; 5] = ["Sales Date", "Menu", "Menu Category", "Qty", "COGS Total"];

/// Load sales records from a CSV reader.
pub fn load<R: Read>(reader: R) -> EngineResult<Dataset> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    validate_headers(csv_reader.headers()?)?;

    let mut records = Vec::new();
    let mut skipped = 0usize;
    for (line_num, result) in csv_reader.deserialize::<RawSaleRow>().enumerate() {
        let raw = match result {
            Ok(raw) => raw,
            Err(e) => {
                log::warn!("skipping line {}: {}", line_num + 2, e);
                skipped += 1;
                continue;
            }
        };
        match raw.into_record() {
            Ok(record) => records.push(record),
            Err(reason) => {
                log::warn!("skipping line {}: {}", line_num + 2, reason);
                skipped += 1;
            }
        }
    }

    if records.is_empty() {
        return Err(EngineError::EmptyDataset);
    }
    log::debug!("loaded {} records ({} skipped)", records.len(), skipped);
    Ok(Dataset::from_records(records))
}

/// Load sales records from a CSV file path.
pub fn load_file<P: AsRef<Path>>(path: P) -> EngineResult<Dataset> {
    let file = std::fs::File::open(path)?;
    load(file)
}

/// Fail fast on schema mismatch rather than propagate missing-field errors
/// deep into aggregation. `Price` is required only when `Total` is also
/// absent, since either lets revenue be resolved.
fn validate_headers(headers: &csv::StringRecord) -> EngineResult<()> {
    let present: HashSet<&str> = headers.iter().collect();

    let mut missing: Vec<String> = REQUIRED_COLUMNS
        .iter()
        .filter(|col| !present.contains(**col))
        .map(|col| col.to_string())
        .collect();
    if !present.contains("Price") && !present.contains("Total") {
        missing.push("Price".to_string());
    }

    if missing.is_empty() {
        Ok(())
    } else {
        Err(EngineError::MissingColumns(missing))
    }
}
