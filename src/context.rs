// TrainerContext: service object wiring store, extractor and decoder
//
// Replaces process-wide statics with one explicitly owned value that callers
// construct once and share. Feature extraction and analysis are CPU-bound,
// so they run on the tokio blocking pool; store mutations happen only after
// the blocking work returns, so an abandoned request never leaves a
// half-applied profile behind.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::analysis::{
    score_against_reference, AnalysisReport, FeatureExtractor, FeatureRecord, RangeCalculator,
    ScoringMode, TargetScorer,
};
use crate::audio::{AudioDecoder, WavDecoder};
use crate::config::AppConfig;
use crate::error::{log_analysis_error, log_store_error, AnalysisError, TrainerError};
use crate::reference::{ReferenceProfile, ReferenceStore};

/// Analysis result plus the score and which scorer produced it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisOutcome {
    pub report: AnalysisReport,
    pub similarity_score: f64,
    #[serde(flatten)]
    pub mode: ScoringMode,
}

/// TrainerContext: the request-level API of the trainer core
pub struct TrainerContext {
    config: AppConfig,
    store: Arc<ReferenceStore>,
    extractor: Arc<FeatureExtractor>,
    decoder: Arc<dyn AudioDecoder>,
    target_scorer: TargetScorer,
}

impl TrainerContext {
    /// Build a context with the WAV decoder, opening the store at
    /// `config.store.data_dir`
    ///
    /// # Errors
    /// `StorageUnavailable` if the data directory cannot be created or read
    pub fn new(config: AppConfig) -> Result<Self, TrainerError> {
        Self::with_decoder(config, Arc::new(WavDecoder::new()))
    }

    /// Build a context with a custom audio decode collaborator
    pub fn with_decoder(
        config: AppConfig,
        decoder: Arc<dyn AudioDecoder>,
    ) -> Result<Self, TrainerError> {
        let store = ReferenceStore::open(&config.store.data_dir).map_err(|err| {
            log_store_error(&err, "TrainerContext::new");
            err
        })?;

        Ok(Self {
            extractor: Arc::new(FeatureExtractor::new(&config.analysis)),
            target_scorer: TargetScorer::new(config.scoring.clone()),
            store: Arc::new(store),
            decoder,
            config,
        })
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn store(&self) -> &Arc<ReferenceStore> {
        &self.store
    }

    // ========================================================================
    // REFERENCE LIFECYCLE
    // ========================================================================

    /// Create and persist a new profile in state Created
    pub fn register_reference(
        &self,
        language: &str,
        symbol: &str,
        description: Option<String>,
        audio_path: impl Into<String>,
    ) -> Result<ReferenceProfile, TrainerError> {
        let profile = ReferenceProfile::new(language, symbol, description, audio_path);
        self.store.save(&profile)?;
        log::info!(
            "Registered reference {} ({}/{})",
            profile.id,
            profile.language,
            profile.symbol
        );
        Ok(profile)
    }

    /// Decode a profile's audio, extract features and persist them
    ///
    /// Created -> FeaturesExtracted.
    ///
    /// # Errors
    /// - `ReferenceNotFound` for an unknown id
    /// - `InvalidTransition` if features were already extracted
    /// - `DecodeUnavailable` / `ExtractionFailed` from the pipeline
    /// - `StoreWriteFailed` if persisting fails
    pub async fn extract_reference_features(
        &self,
        id: &str,
    ) -> Result<ReferenceProfile, TrainerError> {
        let profile = self.store.require(id)?;
        profile.ensure_extractable()?;

        let audio_path = PathBuf::from(&profile.audio_path);
        let features = self.decode_and_extract(audio_path).await?;

        let updated = self
            .store
            .update(id, |current| Ok(current.with_features(features)?))?;
        log::info!("Extracted features for reference {}", id);
        Ok(updated)
    }

    /// Widen a profile's stored ranges by a tolerance percentage
    ///
    /// FeaturesExtracted | RangesApplied -> RangesApplied. Reapplying in
    /// RangesApplied replaces the band with one for the new tolerance;
    /// the midpoint is preserved.
    pub fn apply_reference_tolerance(
        &self,
        id: &str,
        tolerance_percent: f64,
    ) -> Result<ReferenceProfile, TrainerError> {
        RangeCalculator::validate_tolerance(tolerance_percent).map_err(|err| {
            log_analysis_error(&err, "apply_reference_tolerance");
            err
        })?;

        let updated = self
            .store
            .update(id, |current| current.with_tolerance(tolerance_percent))?;
        log::info!(
            "Applied {}% tolerance to reference {}",
            tolerance_percent,
            id
        );
        Ok(updated)
    }

    pub fn get_reference(&self, id: &str) -> Result<Option<ReferenceProfile>, TrainerError> {
        Ok(self.store.get(id)?)
    }

    pub fn list_references(&self) -> Result<Vec<ReferenceProfile>, TrainerError> {
        Ok(self.store.list()?)
    }

    /// True when at least one reference has extracted features
    pub fn is_configured(&self) -> Result<bool, TrainerError> {
        Ok(self.store.is_configured()?)
    }

    // ========================================================================
    // ANALYSIS
    // ========================================================================

    /// Extract a feature record from decoded samples on the blocking pool
    pub async fn extract_features(
        &self,
        samples: Vec<f32>,
        sample_rate: u32,
    ) -> Result<FeatureRecord, TrainerError> {
        let extractor = Arc::clone(&self.extractor);
        let features = run_blocking("extract_features", move || {
            extractor.extract_features(&samples, sample_rate)
        })
        .await?;
        Ok(features)
    }

    /// Analyze decoded samples and score them
    ///
    /// With `reference_id` the reference-relative score is authoritative;
    /// without it the target-relative score is used.
    pub async fn analyze_samples(
        &self,
        samples: Vec<f32>,
        sample_rate: u32,
        reference_id: Option<&str>,
    ) -> Result<AnalysisOutcome, TrainerError> {
        let reference = self.resolve_reference(reference_id)?;

        let extractor = Arc::clone(&self.extractor);
        let report = run_blocking("analyze_samples", move || {
            extractor.analyze(&samples, sample_rate)
        })
        .await?;

        Ok(self.score_report(report, reference))
    }

    /// Decode a file and analyze it like `analyze_samples`
    pub async fn analyze_file(
        &self,
        path: impl AsRef<Path>,
        reference_id: Option<&str>,
    ) -> Result<AnalysisOutcome, TrainerError> {
        let reference = self.resolve_reference(reference_id)?;

        let path = path.as_ref().to_path_buf();
        let decoder = Arc::clone(&self.decoder);
        let extractor = Arc::clone(&self.extractor);
        let target_rate = self.config.analysis.sample_rate;
        let report = run_blocking("analyze_file", move || {
            let audio = decoder.decode(&path, target_rate)?;
            extractor.analyze(&audio.samples, audio.sample_rate)
        })
        .await?;

        Ok(self.score_report(report, reference))
    }

    /// Reference-relative score against a stored profile
    ///
    /// A profile without features scores 0.0.
    pub fn score_against_reference(
        &self,
        candidate: &FeatureRecord,
        reference_id: &str,
    ) -> Result<f64, TrainerError> {
        let reference = self.store.require(reference_id)?;
        Ok(score_against_reference(candidate, reference.features.as_ref()))
    }

    /// Target-relative score of an analysis report
    pub fn score_against_target(&self, report: &AnalysisReport) -> f64 {
        self.target_scorer.score_report(report)
    }

    fn resolve_reference(
        &self,
        reference_id: Option<&str>,
    ) -> Result<Option<ReferenceProfile>, TrainerError> {
        match reference_id {
            Some(id) => Ok(Some(self.store.require(id).map_err(|err| {
                log_store_error(&err, "resolve_reference");
                err
            })?)),
            None => Ok(None),
        }
    }

    fn score_report(
        &self,
        report: AnalysisReport,
        reference: Option<ReferenceProfile>,
    ) -> AnalysisOutcome {
        let (similarity_score, mode) = match reference {
            Some(profile) => (
                score_against_reference(&report.features, profile.features.as_ref()),
                ScoringMode::ReferenceRelative {
                    reference_id: profile.id,
                },
            ),
            None => (
                self.target_scorer.score_report(&report),
                ScoringMode::TargetRelative,
            ),
        };

        tracing::info!(similarity_score, ?mode, "candidate scored");

        AnalysisOutcome {
            report,
            similarity_score,
            mode,
        }
    }

    async fn decode_and_extract(&self, path: PathBuf) -> Result<FeatureRecord, AnalysisError> {
        let decoder = Arc::clone(&self.decoder);
        let extractor = Arc::clone(&self.extractor);
        let target_rate = self.config.analysis.sample_rate;

        run_blocking("extract_reference_features", move || {
            let audio = decoder.decode(&path, target_rate)?;
            extractor.extract_features(&audio.samples, audio.sample_rate)
        })
        .await
    }
}

/// Run CPU-bound work on the blocking pool, logging any failure
async fn run_blocking<T, F>(context: &str, work: F) -> Result<T, AnalysisError>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, AnalysisError> + Send + 'static,
{
    let result = match tokio::task::spawn_blocking(work).await {
        Ok(result) => result,
        Err(join_err) => Err(AnalysisError::WorkerFailed {
            reason: join_err.to_string(),
        }),
    };

    result.map_err(|err| {
        log_analysis_error(&err, context);
        err
    })
}
