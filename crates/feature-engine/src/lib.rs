//! Feature Engineering Engine
//!
//! Turns raw flight records into the pinned 10-column feature vector the
//! delay classifier is trained on.

mod encoding;
mod error;
mod features;
mod record;
pub mod temporal;

pub use encoding::{CategoricalEncoder, Category, PinnedFeature};
pub use error::FeatureError;
pub use features::{FeatureVector, FEATURE_DIMENSION, FEATURE_NAMES};
pub use record::FlightRecord;
pub use temporal::{DerivedFeatures, PeriodOfDay};
