// ReferenceProfile - a named, persisted acoustic target
//
// A profile moves forward through three states and never back:
//   Created (no features) -> FeaturesExtracted -> RangesApplied
// Re-applying a tolerance while in RangesApplied is a self-transition that
// replaces the band with one for the new tolerance around the same midpoint.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use crate::analysis::{FeatureRecord, RangeCalculator};
use crate::error::{AnalysisError, StoreError, TrainerError};

/// Reserved feedback configuration, stored but not computed by the engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackRules {
    pub thresholds: (f64, f64),
    pub messages: HashMap<String, String>,
}

/// Lifecycle state derived from the persisted fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ProfileState {
    Created,
    FeaturesExtracted,
    RangesApplied,
}

impl fmt::Display for ProfileState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ProfileState::Created => "Created",
            ProfileState::FeaturesExtracted => "FeaturesExtracted",
            ProfileState::RangesApplied => "RangesApplied",
        };
        f.write_str(name)
    }
}

/// Persisted reference profile
///
/// Serialized field names (`id, language, symbol, audioPath, features,
/// feedbackRules`) are kept stable for importers/exporters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferenceProfile {
    pub id: String,
    pub language: String,
    pub symbol: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Location of the source audio, owned by the file-storage collaborator
    pub audio_path: String,
    #[serde(default)]
    pub features: Option<FeatureRecord>,
    #[serde(default)]
    pub feedback_rules: Option<FeedbackRules>,
    /// Last tolerance applied; present once ranges have been widened
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tolerance_percent: Option<f64>,
}

impl ReferenceProfile {
    /// Create a new profile in state Created with a fresh UUID v4 id
    pub fn new(
        language: impl Into<String>,
        symbol: impl Into<String>,
        description: Option<String>,
        audio_path: impl Into<String>,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            language: language.into(),
            symbol: symbol.into(),
            description,
            audio_path: audio_path.into(),
            features: None,
            feedback_rules: None,
            tolerance_percent: None,
        }
    }

    pub fn state(&self) -> ProfileState {
        match (&self.features, self.tolerance_percent) {
            (None, _) => ProfileState::Created,
            (Some(_), None) => ProfileState::FeaturesExtracted,
            (Some(_), Some(_)) => ProfileState::RangesApplied,
        }
    }

    /// Created -> FeaturesExtracted
    ///
    /// # Errors
    /// `InvalidTransition` if features were already extracted
    pub fn with_features(mut self, features: FeatureRecord) -> Result<Self, StoreError> {
        self.ensure_extractable()?;
        self.features = Some(features);
        Ok(self)
    }

    /// Check that extraction may still run on this profile
    pub fn ensure_extractable(&self) -> Result<(), StoreError> {
        if self.state() != ProfileState::Created {
            return Err(self.transition_error(ProfileState::FeaturesExtracted));
        }
        Ok(())
    }

    /// FeaturesExtracted | RangesApplied -> RangesApplied
    ///
    /// # Errors
    /// - `InvalidTolerance` for a tolerance outside [0, 100]
    /// - `MissingFeatures` while the profile is still in Created
    pub fn with_tolerance(mut self, tolerance_percent: f64) -> Result<Self, TrainerError> {
        RangeCalculator::validate_tolerance(tolerance_percent)?;

        let Some(features) = self.features.as_ref() else {
            return Err(AnalysisError::MissingFeatures {
                id: self.id.clone(),
            }
            .into());
        };

        self.features = Some(RangeCalculator::apply_tolerance(features, tolerance_percent)?);
        self.tolerance_percent = Some(tolerance_percent);
        Ok(self)
    }

    fn transition_error(&self, to: ProfileState) -> StoreError {
        StoreError::InvalidTransition {
            id: self.id.clone(),
            from: self.state().to_string(),
            to: to.to_string(),
        }
    }
}
