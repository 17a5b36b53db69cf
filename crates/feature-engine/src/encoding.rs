//! Categorical Encoding
//!
//! One-hot encodes airline, flight type and month, then keeps only the
//! pinned columns. Categories outside the pinned set are dropped and pinned
//! columns a record does not produce stay zero, so the output shape never
//! depends on which categories show up in a batch.

use crate::features::{FeatureVector, FEATURE_DIMENSION, FEATURE_NAMES};
use crate::record::FlightRecord;
use tracing::trace;

/// A one-hot category produced by a record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category<'a> {
    /// `OPERA_<name>`
    Airline(&'a str),
    /// `TIPOVUELO_<code>`
    FlightType(&'a str),
    /// `MES_<n>`
    Month(i64),
}

impl<'a> Category<'a> {
    /// The three categories a record one-hot encodes to
    pub fn of(record: &'a FlightRecord) -> [Category<'a>; 3] {
        [
            Category::Airline(&record.airline),
            Category::FlightType(&record.flight_type),
            Category::Month(record.month),
        ]
    }

    /// One-hot column name
    pub fn column_name(&self) -> String {
        match self {
            Category::Airline(name) => format!("OPERA_{name}"),
            Category::FlightType(code) => format!("TIPOVUELO_{code}"),
            Category::Month(month) => format!("MES_{month}"),
        }
    }
}

/// The columns the classifier consumes, declared in pinned order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PinnedFeature {
    LatinAmericanWings,
    Month7,
    Month10,
    GrupoLatam,
    Month12,
    International,
    Month4,
    Month11,
    SkyAirline,
    CopaAir,
}

impl PinnedFeature {
    /// All pinned features in column order
    pub const ALL: [PinnedFeature; FEATURE_DIMENSION] = [
        PinnedFeature::LatinAmericanWings,
        PinnedFeature::Month7,
        PinnedFeature::Month10,
        PinnedFeature::GrupoLatam,
        PinnedFeature::Month12,
        PinnedFeature::International,
        PinnedFeature::Month4,
        PinnedFeature::Month11,
        PinnedFeature::SkyAirline,
        PinnedFeature::CopaAir,
    ];

    /// Position in the feature vector
    pub fn index(self) -> usize {
        self as usize
    }

    /// Column name, e.g. `MES_7`
    pub fn column_name(self) -> &'static str {
        FEATURE_NAMES[self.index()]
    }

    /// Resolve a column name back to its pinned feature
    pub fn from_column_name(name: &str) -> Option<Self> {
        FEATURE_NAMES
            .iter()
            .position(|&column| column == name)
            .map(|idx| Self::ALL[idx])
    }

    /// The category that switches this column on
    pub fn category(self) -> Category<'static> {
        match self {
            PinnedFeature::LatinAmericanWings => Category::Airline("Latin American Wings"),
            PinnedFeature::Month7 => Category::Month(7),
            PinnedFeature::Month10 => Category::Month(10),
            PinnedFeature::GrupoLatam => Category::Airline("Grupo LATAM"),
            PinnedFeature::Month12 => Category::Month(12),
            PinnedFeature::International => Category::FlightType("I"),
            PinnedFeature::Month4 => Category::Month(4),
            PinnedFeature::Month11 => Category::Month(11),
            PinnedFeature::SkyAirline => Category::Airline("Sky Airline"),
            PinnedFeature::CopaAir => Category::Airline("Copa Air"),
        }
    }
}

/// Builds pinned-order feature vectors from flight records
#[derive(Debug, Clone, Copy, Default)]
pub struct CategoricalEncoder;

impl CategoricalEncoder {
    /// Create a new encoder
    pub fn new() -> Self {
        Self
    }

    /// Encode one record
    pub fn encode(&self, record: &FlightRecord) -> FeatureVector {
        let categories = Category::of(record);
        let mut features = FeatureVector::default();

        for feature in PinnedFeature::ALL {
            if categories.contains(&feature.category()) {
                features.set(feature, 1.0);
            }
        }

        trace!(
            "Encoded {:?} -> {:?}",
            categories.map(|c| c.column_name()),
            features.as_slice()
        );
        features
    }

    /// Encode a batch, preserving row order
    pub fn encode_batch(&self, records: &[FlightRecord]) -> Vec<FeatureVector> {
        records.iter().map(|record| self.encode(record)).collect()
    }
}
