//! Training and Prediction Pipeline
//!
//! Wires temporal extraction, categorical encoding and the classifier
//! together for both the fit path and the inference path.

use crate::classifier::DelayClassifier;
use crate::InferenceError;
use feature_engine::{
    CategoricalEncoder, DerivedFeatures, FeatureError, FeatureVector, FlightRecord,
};
use tracing::{debug, info};

/// Name of the label column produced in training mode
pub const DEFAULT_TARGET_COLUMN: &str = "delay";

/// Output of [`DelayModel::preprocess`]
#[derive(Debug, Clone, PartialEq)]
pub enum Preprocessed {
    /// Features with aligned labels
    Training {
        features: Vec<FeatureVector>,
        labels: Vec<u8>,
    },
    /// Features only
    Inference { features: Vec<FeatureVector> },
}

impl Preprocessed {
    /// Feature rows in input order
    pub fn features(&self) -> &[FeatureVector] {
        match self {
            Preprocessed::Training { features, .. } => features,
            Preprocessed::Inference { features } => features,
        }
    }

    /// Labels, present only in training mode
    pub fn labels(&self) -> Option<&[u8]> {
        match self {
            Preprocessed::Training { labels, .. } => Some(labels),
            Preprocessed::Inference { .. } => None,
        }
    }

    /// Drop the labels, keeping the features
    pub fn into_features(self) -> Vec<FeatureVector> {
        match self {
            Preprocessed::Training { features, .. } => features,
            Preprocessed::Inference { features } => features,
        }
    }
}

/// Flight delay model: feature pipeline plus classifier
#[derive(Default)]
pub struct DelayModel {
    encoder: CategoricalEncoder,
    classifier: DelayClassifier,
}

impl DelayModel {
    /// Create an unfitted model
    pub fn new() -> Self {
        Self::with_classifier(DelayClassifier::new())
    }

    /// Create a model around an existing classifier
    pub fn with_classifier(classifier: DelayClassifier) -> Self {
        Self {
            encoder: CategoricalEncoder::new(),
            classifier,
        }
    }

    /// Turn raw records into model input.
    ///
    /// With a `target_column` the delay label (deviation strictly above 15
    /// minutes) is computed too. Every record needs parseable scheduled and
    /// actual timestamps in both modes; callers without real values must
    /// pass placeholders. A malformed timestamp fails the whole batch; a
    /// scheduled time outside every period-of-day bucket does not, since the
    /// period is not a model input.
    pub fn preprocess(
        &self,
        records: &[FlightRecord],
        target_column: Option<&str>,
    ) -> Result<Preprocessed, InferenceError> {
        let derived = records
            .iter()
            .map(derive_tolerating_boundary)
            .collect::<Result<Vec<_>, _>>()?;

        let features = self.encoder.encode_batch(records);

        match target_column {
            Some(target) => {
                let labels: Vec<u8> = derived.iter().map(DerivedFeatures::delay_label).collect();
                debug!(
                    "Preprocessed {} rows with target '{}' ({} delayed)",
                    features.len(),
                    target,
                    labels.iter().filter(|&&y| y == 1).count()
                );
                Ok(Preprocessed::Training { features, labels })
            }
            None => {
                debug!("Preprocessed {} rows for inference", features.len());
                Ok(Preprocessed::Inference { features })
            }
        }
    }

    /// Fit the classifier on preprocessed features and labels
    pub fn fit(&self, features: &[FeatureVector], labels: &[u8]) -> Result<(), InferenceError> {
        self.classifier.fit(features, labels)
    }

    /// Predict a 0/1 delay label per feature row
    pub fn predict(&self, features: &[FeatureVector]) -> Result<Vec<u8>, InferenceError> {
        self.classifier.predict(features)
    }

    /// Preprocess historical records in training mode and fit on them
    pub fn train(&self, records: &[FlightRecord]) -> Result<(), InferenceError> {
        info!("Training delay model on {} records", records.len());
        match self.preprocess(records, Some(DEFAULT_TARGET_COLUMN))? {
            Preprocessed::Training { features, labels } => self.fit(&features, &labels),
            Preprocessed::Inference { .. } => Err(InferenceError::InferenceFailed(
                "Training preprocess returned no labels".to_string(),
            )),
        }
    }

    /// Preprocess records in inference mode and predict
    pub fn predict_records(&self, records: &[FlightRecord]) -> Result<Vec<u8>, InferenceError> {
        let features = self.preprocess(records, None)?.into_features();
        self.predict(&features)
    }

    /// Check if the underlying classifier has been fitted
    pub fn is_fitted(&self) -> bool {
        self.classifier.is_fitted()
    }
}

fn derive_tolerating_boundary(record: &FlightRecord) -> Result<DerivedFeatures, FeatureError> {
    match DerivedFeatures::extract(record) {
        Err(FeatureError::BoundaryTime { input }) => {
            debug!("No period-of-day bucket for {}", input);
            DerivedFeatures::without_period(record)
        }
        other => other,
    }
}
