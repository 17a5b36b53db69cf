//! Flight Dataset

use crate::StorageError;
use feature_engine::FlightRecord;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use tracing::{debug, info};

/// Historical flights loaded from a headered CSV.
///
/// Columns are matched by name (`OPERA`, `TIPOVUELO`, `MES`, `Fecha-I`,
/// `Fecha-O`, `SIGLADES`, `DIANOM`); any other columns are ignored.
#[derive(Debug, Clone, Default)]
pub struct FlightDataset {
    records: Vec<FlightRecord>,
}

impl FlightDataset {
    /// Load a dataset from a CSV file
    pub fn from_csv(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let path = path.as_ref();
        let path_str = path.display().to_string();
        let file = File::open(path).map_err(|source| StorageError::Open {
            path: path_str.clone(),
            source,
        })?;

        let dataset = Self::from_reader(BufReader::new(file))?;
        if dataset.is_empty() {
            return Err(StorageError::Empty(path_str));
        }

        info!("Loaded {} flight records from {}", dataset.len(), path_str);
        Ok(dataset)
    }

    /// Load a dataset from any CSV source
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, StorageError> {
        let mut reader = csv::Reader::from_reader(reader);
        let records = reader
            .deserialize::<FlightRecord>()
            .collect::<Result<Vec<_>, _>>()?;

        debug!("Parsed {} CSV rows", records.len());
        Ok(Self { records })
    }

    /// Records in file order
    pub fn records(&self) -> &[FlightRecord] {
        &self.records
    }

    /// Take ownership of the records
    pub fn into_records(self) -> Vec<FlightRecord> {
        self.records
    }

    /// Number of records
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Check if the dataset is empty
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl From<Vec<FlightRecord>> for FlightDataset {
    fn from(records: Vec<FlightRecord>) -> Self {
        Self { records }
    }
}
