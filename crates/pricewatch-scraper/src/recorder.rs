//! Append-only persistence for successful observations.

use std::fs::OpenOptions;
use std::path::{Path, PathBuf};

use pricewatch_core::PriceObservation;

use crate::error::RecordError;

/// Sink for observations. Implementations only ever append.
pub trait ObservationRecorder: Send {
    /// Persists one observation.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError`] when the observation could not be stored.
    fn append(&mut self, observation: PriceObservation) -> Result<(), RecordError>;
}

/// Appends `timestamp,name,price` rows to a CSV file with no header.
///
/// The file is opened per row so a crash mid-run keeps every row written so
/// far.
#[derive(Debug, Clone)]
pub struct CsvRecorder {
    path: PathBuf,
}

impl CsvRecorder {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ObservationRecorder for CsvRecorder {
    fn append(&mut self, observation: PriceObservation) -> Result<(), RecordError> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|source| RecordError::Open {
                path: self.path.display().to_string(),
                source,
            })?;

        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);
        writer.write_record([
            observation.formatted_timestamp(),
            observation.product_name.clone(),
            observation.formatted_price(),
        ])?;
        writer.flush().map_err(RecordError::Flush)?;

        tracing::debug!(
            product = %observation.product_name,
            price = %observation.formatted_price(),
            path = %self.path.display(),
            "observation recorded"
        );
        Ok(())
    }
}

/// Keeps observations in memory; used by dry runs and tests.
#[derive(Debug, Default, Clone)]
pub struct MemoryRecorder {
    observations: Vec<PriceObservation>,
}

impl MemoryRecorder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn observations(&self) -> &[PriceObservation] {
        &self.observations
    }
}

impl ObservationRecorder for MemoryRecorder {
    fn append(&mut self, observation: PriceObservation) -> Result<(), RecordError> {
        self.observations.push(observation);
        Ok(())
    }
}
