//! Feature Vector Assembly

use crate::encoding::PinnedFeature;
use serde::{Deserialize, Serialize};
use std::ops::Index;

/// Number of features the classifier consumes
pub const FEATURE_DIMENSION: usize = 10;

/// Column names in the order the classifier was trained on
pub const FEATURE_NAMES: [&str; FEATURE_DIMENSION] = [
    "OPERA_Latin American Wings",
    "MES_7",
    "MES_10",
    "OPERA_Grupo LATAM",
    "MES_12",
    "TIPOVUELO_I",
    "MES_4",
    "MES_11",
    "OPERA_Sky Airline",
    "OPERA_Copa Air",
];

/// Feature vector for ML inference, one slot per pinned column
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct FeatureVector {
    values: [f64; FEATURE_DIMENSION],
}

impl FeatureVector {
    /// Wrap raw values already laid out in pinned order
    pub fn from_values(values: [f64; FEATURE_DIMENSION]) -> Self {
        Self { values }
    }

    /// Raw values in pinned order
    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }

    /// Look a value up by its column name
    pub fn get(&self, column: &str) -> Option<f64> {
        PinnedFeature::from_column_name(column).map(|feature| self[feature])
    }

    /// Iterate `(column name, value)` pairs in pinned order
    pub fn named(&self) -> impl Iterator<Item = (&'static str, f64)> + '_ {
        FEATURE_NAMES.iter().copied().zip(self.values.iter().copied())
    }

    pub(crate) fn set(&mut self, feature: PinnedFeature, value: f64) {
        self.values[feature.index()] = value;
    }
}

impl Index<PinnedFeature> for FeatureVector {
    type Output = f64;

    fn index(&self, feature: PinnedFeature) -> &f64 {
        &self.values[feature.index()]
    }
}

impl AsRef<[f64]> for FeatureVector {
    fn as_ref(&self) -> &[f64] {
        &self.values
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_named_access() {
        let mut features = FeatureVector::default();
        features.set(PinnedFeature::Month7, 1.0);

        assert_eq!(features.get("MES_7"), Some(1.0));
        assert_eq!(features.get("MES_10"), Some(0.0));
        assert_eq!(features.get("MES_3"), None);
        assert_eq!(features[PinnedFeature::Month7], 1.0);
        assert_eq!(features.as_slice()[1], 1.0);
    }

    #[test]
    fn test_named_iteration_order() {
        let names: Vec<&str> = FeatureVector::default().named().map(|(name, _)| name).collect();
        assert_eq!(names, FEATURE_NAMES);
    }
}
