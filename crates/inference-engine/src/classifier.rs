//! Delay Classifier

use crate::gbdt::{Booster, BoosterParams};
use crate::InferenceError;
use feature_engine::FeatureVector;
use std::sync::{Arc, RwLock};
use std::time::Instant;
use tracing::{debug, info};

/// Binary delay classifier.
///
/// Starts unfitted. `fit` trains a fresh booster without holding the lock
/// and swaps it in when done, so a concurrent `predict` sees either the
/// previous state or the new one, never a half-trained model.
pub struct DelayClassifier {
    params: BoosterParams,
    booster: RwLock<Option<Arc<Booster>>>,
}

impl DelayClassifier {
    /// Create an unfitted classifier with the default booster parameters
    pub fn new() -> Self {
        Self::with_params(BoosterParams::default())
    }

    /// Create an unfitted classifier with custom booster parameters.
    ///
    /// `scale_pos_weight` is always recomputed from the labels in `fit`.
    pub fn with_params(params: BoosterParams) -> Self {
        Self {
            params,
            booster: RwLock::new(None),
        }
    }

    /// Train on `features` and aligned 0/1 `labels`, replacing any earlier fit.
    ///
    /// Requires at least one example of each class: the positive class is
    /// weighted by `count(0) / count(1)`.
    pub fn fit(&self, features: &[FeatureVector], labels: &[u8]) -> Result<(), InferenceError> {
        if features.len() != labels.len() {
            return Err(InferenceError::InvalidInputShape {
                expected: format!("{} labels", features.len()),
                actual: format!("{} labels", labels.len()),
            });
        }
        if let Some((index, &value)) = labels.iter().enumerate().find(|&(_, &y)| y > 1) {
            return Err(InferenceError::InvalidLabel { index, value });
        }

        let positives = labels.iter().filter(|&&y| y == 1).count();
        let negatives = labels.len() - positives;
        if positives == 0 || negatives == 0 {
            return Err(InferenceError::ImbalancedTrainingData {
                negatives,
                positives,
            });
        }

        let scale = negatives as f64 / positives as f64;
        let params = BoosterParams {
            scale_pos_weight: scale,
            ..self.params.clone()
        };
        info!(
            "Fitting classifier on {} rows ({} delayed), scale_pos_weight={:.3}",
            labels.len(),
            positives,
            scale
        );

        let start = Instant::now();
        let booster = Booster::train(features, labels, &params)?;

        let mut slot = self
            .booster
            .write()
            .map_err(|e| InferenceError::InferenceFailed(format!("Lock error: {}", e)))?;
        *slot = Some(Arc::new(booster));

        info!("Classifier fitted in {}ms", start.elapsed().as_millis());
        Ok(())
    }

    /// Predict a 0/1 label per row, in input order
    pub fn predict(&self, features: &[FeatureVector]) -> Result<Vec<u8>, InferenceError> {
        let booster = self.current()?.ok_or(InferenceError::NotFitted)?;

        let predictions: Vec<u8> = features
            .iter()
            .map(|f| booster.predict_label(f.as_slice()))
            .collect();

        debug!("Predicted {} rows", predictions.len());
        Ok(predictions)
    }

    /// Check if the classifier has been fitted
    pub fn is_fitted(&self) -> bool {
        matches!(self.current(), Ok(Some(_)))
    }

    fn current(&self) -> Result<Option<Arc<Booster>>, InferenceError> {
        self.booster
            .read()
            .map(|guard| guard.clone())
            .map_err(|e| InferenceError::InferenceFailed(format!("Lock error: {}", e)))
    }
}

impl Default for DelayClassifier {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use feature_engine::PinnedFeature;

    fn row(international: bool) -> FeatureVector {
        let mut values = [0.0; feature_engine::FEATURE_DIMENSION];
        values[PinnedFeature::International.index()] = if international { 1.0 } else { 0.0 };
        FeatureVector::from_values(values)
    }

    /// International flights mostly delayed, national mostly on time
    fn synthetic() -> (Vec<FeatureVector>, Vec<u8>) {
        let mut features = Vec::new();
        let mut labels = Vec::new();
        for i in 0..40 {
            features.push(row(true));
            labels.push(u8::from(i < 30));
        }
        for i in 0..60 {
            features.push(row(false));
            labels.push(u8::from(i < 5));
        }
        (features, labels)
    }

    #[test]
    fn test_predict_before_fit() {
        let classifier = DelayClassifier::new();
        assert!(!classifier.is_fitted());
        assert!(matches!(
            classifier.predict(&[row(true)]),
            Err(InferenceError::NotFitted)
        ));
    }

    #[test]
    fn test_fit_and_predict() {
        let classifier = DelayClassifier::new();
        let (features, labels) = synthetic();
        classifier.fit(&features, &labels).unwrap();

        assert!(classifier.is_fitted());
        let predictions = classifier.predict(&[row(true), row(false), row(true)]).unwrap();
        assert_eq!(predictions, vec![1, 0, 1]);
    }

    #[test]
    fn test_predict_is_repeatable() {
        let classifier = DelayClassifier::new();
        let (features, labels) = synthetic();
        classifier.fit(&features, &labels).unwrap();

        let first = classifier.predict(&features).unwrap();
        let second = classifier.predict(&features).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.len(), features.len());
    }

    #[test]
    fn test_empty_batch_predicts_nothing() {
        let classifier = DelayClassifier::new();
        let (features, labels) = synthetic();
        classifier.fit(&features, &labels).unwrap();
        assert!(classifier.predict(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_fit_without_positives() {
        let classifier = DelayClassifier::new();
        let features = vec![row(true), row(false)];
        let err = classifier.fit(&features, &[0, 0]).unwrap_err();
        assert!(matches!(
            err,
            InferenceError::ImbalancedTrainingData {
                negatives: 2,
                positives: 0
            }
        ));
        assert!(!classifier.is_fitted());
    }

    #[test]
    fn test_fit_without_negatives() {
        let classifier = DelayClassifier::new();
        let features = vec![row(true), row(false)];
        assert!(matches!(
            classifier.fit(&features, &[1, 1]),
            Err(InferenceError::ImbalancedTrainingData { positives: 2, .. })
        ));
    }

    #[test]
    fn test_fit_rejects_bad_labels() {
        let classifier = DelayClassifier::new();
        let features = vec![row(true), row(false)];
        assert!(matches!(
            classifier.fit(&features, &[0, 2]),
            Err(InferenceError::InvalidLabel { index: 1, value: 2 })
        ));
        assert!(matches!(
            classifier.fit(&features, &[0]),
            Err(InferenceError::InvalidInputShape { .. })
        ));
    }

    #[test]
    fn test_refit_replaces_state() {
        let classifier = DelayClassifier::new();
        let (features, labels) = synthetic();
        classifier.fit(&features, &labels).unwrap();
        assert_eq!(classifier.predict(&[row(true)]).unwrap(), vec![1]);

        let flipped: Vec<u8> = labels.iter().map(|&y| 1 - y).collect();
        classifier.fit(&features, &flipped).unwrap();
        assert_eq!(classifier.predict(&[row(true), row(false)]).unwrap(), vec![0, 1]);
    }

    #[test]
    fn test_failed_refit_keeps_previous_model() {
        let classifier = DelayClassifier::new();
        let (features, labels) = synthetic();
        classifier.fit(&features, &labels).unwrap();

        let all_negative = vec![0u8; features.len()];
        assert!(classifier.fit(&features, &all_negative).is_err());
        assert_eq!(classifier.predict(&[row(true)]).unwrap(), vec![1]);
    }

    #[test]
    fn test_concurrent_predict_sees_whole_model() {
        let classifier = DelayClassifier::new();
        let (features, labels) = synthetic();
        let probe = [row(true), row(false)];

        std::thread::scope(|s| {
            s.spawn(|| classifier.fit(&features, &labels).unwrap());

            for _ in 0..200 {
                match classifier.predict(&probe) {
                    Ok(predictions) => assert_eq!(predictions, vec![1, 0]),
                    Err(InferenceError::NotFitted) => {}
                    Err(e) => panic!("unexpected error: {e}"),
                }
            }
        });

        assert_eq!(classifier.predict(&probe).unwrap(), vec![1, 0]);
    }
}
