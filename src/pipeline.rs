//! Input → model → tier → advisory → audit log.

use crate::error::PredictError;
use crate::model::ModelHandle;
use crate::models::{FeatureVector, PredictionResult};
use crate::risk::{classify, AdvisoryCatalog, RiskTier};
use crate::store::PredictionStore;

/// How the raw model output is presented to a given entry point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rounding {
    /// Two decimal places. Used by form submissions.
    TwoDecimals,
    /// Model output as-is. Used by the JSON API.
    Full,
}

impl Rounding {
    /// Two-decimal rounding goes through exact decimal formatting, so the
    /// stored binary value is rounded (ties to even) without an intermediate
    /// multiply.
    pub fn apply(self, value: f64) -> f64 {
        match self {
            Rounding::TwoDecimals => format!("{value:.2}").parse().unwrap_or(value),
            Rounding::Full => value,
        }
    }
}

#[derive(Clone)]
pub struct PredictionPipeline {
    model: ModelHandle,
    store: PredictionStore,
}

impl PredictionPipeline {
    pub fn new(model: ModelHandle, store: PredictionStore) -> Self {
        Self { model, store }
    }

    pub fn model_loaded(&self) -> bool {
        self.model.is_some()
    }

    /// Form submission: every value must parse as a float; output rounded.
    pub fn predict_form(&self, fields: &[(String, String)]) -> Result<PredictionResult, PredictError> {
        let features = FeatureVector::from_form(fields)?;
        self.run(&features, Rounding::TwoDecimals)
    }

    /// JSON API: values are JSON numbers keyed by feature name; output unrounded.
    pub fn predict_json(&self, body: &[u8]) -> Result<PredictionResult, PredictError> {
        let features = FeatureVector::from_json_slice(body)?;
        self.run(&features, Rounding::Full)
    }

    pub fn run(
        &self,
        features: &FeatureVector,
        rounding: Rounding,
    ) -> Result<PredictionResult, PredictError> {
        let model = self.model.as_ref().ok_or(PredictError::ModelUnavailable)?;

        let raw = model
            .predict(features)
            .map_err(|e| PredictError::Inference(e.to_string()))?;
        let pm25 = rounding.apply(raw);

        let tier = classify(pm25);
        if tier.is_none() {
            tracing::warn!("Could not classify pm25 value {}", pm25);
        }
        let result = PredictionResult {
            pm25,
            tier,
            advice: AdvisoryCatalog::advise_or_default(tier).to_string(),
        };

        tracing::info!(
            "Predicted pm25={} tier={}",
            result.pm25,
            RiskTier::label_of(result.tier)
        );

        // The caller gets the prediction even if the audit write fails.
        if let Err(e) = self
            .store
            .append(features, result.pm25, result.risk_category(), &result.advice)
        {
            tracing::error!(
                "Failed to record prediction in {}: {}",
                self.store.path().display(),
                e
            );
        }

        Ok(result)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::error::InputError;
    use crate::model::Regressor;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// Returns a fixed value and counts invocations.
    pub(crate) struct FixedModel {
        pub output: f64,
        pub calls: AtomicUsize,
    }

    impl FixedModel {
        pub(crate) fn new(output: f64) -> Arc<Self> {
            Arc::new(Self {
                output,
                calls: AtomicUsize::new(0),
            })
        }

        pub(crate) fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl Regressor for FixedModel {
        fn predict(&self, _features: &FeatureVector) -> anyhow::Result<f64> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.output)
        }
    }

    struct FailingModel;

    impl Regressor for FailingModel {
        fn predict(&self, _features: &FeatureVector) -> anyhow::Result<f64> {
            anyhow::bail!("artifact exploded")
        }
    }

    pub(crate) fn form_fields() -> Vec<(String, String)> {
        crate::constants::FEATURE_NAMES
            .iter()
            .zip(["25", "30", "18", "1012", "60", "4", "3", "7"])
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn pipeline(model: ModelHandle, dir: &tempfile::TempDir) -> PredictionPipeline {
        PredictionPipeline::new(model, PredictionStore::new(dir.path().join("audit.db")))
    }

    fn store_rows(dir: &tempfile::TempDir) -> usize {
        PredictionStore::new(dir.path().join("audit.db"))
            .recent(100)
            .unwrap()
            .len()
    }

    #[test]
    fn forty_is_unhealthy_for_sensitive_groups() {
        let dir = tempfile::tempdir().unwrap();
        let model = FixedModel::new(40.0);
        let result = pipeline(Some(model.clone()), &dir)
            .predict_form(&form_fields())
            .unwrap();

        assert_eq!(result.pm25, 40.0);
        assert_eq!(result.tier, Some(RiskTier::UnhealthyForSensitive));
        assert_eq!(model.calls(), 1);
        assert_eq!(store_rows(&dir), 1);
    }

    #[test]
    fn tier_and_advice_for_known_outputs() {
        let dir = tempfile::tempdir().unwrap();

        let moderate = pipeline(Some(FixedModel::new(30.0)), &dir)
            .predict_form(&form_fields())
            .unwrap();
        assert_eq!(moderate.risk_category(), "Moderate");
        assert_eq!(
            moderate.advice,
            "Air quality is acceptable. Heart patients should consider limiting prolonged exertion."
        );

        let hazardous = pipeline(Some(FixedModel::new(300.0)), &dir)
            .predict_form(&form_fields())
            .unwrap();
        assert_eq!(hazardous.tier, Some(RiskTier::Hazardous));
        assert_eq!(hazardous.advice, AdvisoryCatalog::advise(RiskTier::Hazardous));

        let boundary = pipeline(Some(FixedModel::new(55.4)), &dir)
            .predict_form(&form_fields())
            .unwrap();
        assert_eq!(boundary.tier, Some(RiskTier::UnhealthyForSensitive));
    }

    #[test]
    fn form_rounds_and_api_does_not() {
        let dir = tempfile::tempdir().unwrap();
        let p = pipeline(Some(FixedModel::new(35.40499)), &dir);

        let form = p.predict_form(&form_fields()).unwrap();
        assert_eq!(form.pm25, 35.4);
        assert_eq!(form.tier, Some(RiskTier::Moderate));

        let body = serde_json::to_vec(&FeatureVector::from_form(&form_fields()).unwrap()).unwrap();
        let api = p.predict_json(&body).unwrap();
        assert_eq!(api.pm25, 35.40499);
        assert_eq!(api.tier, Some(RiskTier::UnhealthyForSensitive));
    }

    #[test]
    fn two_decimal_rounding_uses_exact_value() {
        assert_eq!(Rounding::TwoDecimals.apply(12.004999999999999), 12.0);
        assert_eq!(Rounding::TwoDecimals.apply(0.125), 0.12);
        assert_eq!(Rounding::TwoDecimals.apply(35.40499), 35.4);
        assert_eq!(Rounding::TwoDecimals.apply(-3.456), -3.46);
        assert!(Rounding::TwoDecimals.apply(f64::NAN).is_nan());
        assert_eq!(Rounding::Full.apply(12.004999999999999), 12.004999999999999);
    }

    #[test]
    fn just_under_a_boundary_stays_in_lower_tier() {
        let dir = tempfile::tempdir().unwrap();
        let result = pipeline(Some(FixedModel::new(12.004999999999999)), &dir)
            .predict_form(&form_fields())
            .unwrap();
        assert_eq!(result.pm25, 12.0);
        assert_eq!(result.tier, Some(RiskTier::Good));
    }

    #[test]
    fn malformed_input_never_reaches_model() {
        let dir = tempfile::tempdir().unwrap();
        let model = FixedModel::new(40.0);
        let mut fields = form_fields();
        fields[2].1 = "abc".to_string();

        let err = pipeline(Some(model.clone()), &dir)
            .predict_form(&fields)
            .unwrap_err();
        assert!(matches!(
            err,
            PredictError::InvalidInput(InputError::NotNumeric { .. })
        ));
        assert_eq!(model.calls(), 0);
        assert_eq!(store_rows(&dir), 0);
    }

    #[test]
    fn missing_model_is_unavailable_and_records_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let p = pipeline(None, &dir);

        assert!(matches!(
            p.predict_form(&form_fields()),
            Err(PredictError::ModelUnavailable)
        ));
        let body = serde_json::to_vec(&FeatureVector::from_form(&form_fields()).unwrap()).unwrap();
        assert!(matches!(
            p.predict_json(&body),
            Err(PredictError::ModelUnavailable)
        ));
        assert_eq!(store_rows(&dir), 0);
    }

    #[test]
    fn storage_failure_does_not_change_result() {
        let dir = tempfile::tempdir().unwrap();
        let working = pipeline(Some(FixedModel::new(120.0)), &dir)
            .predict_form(&form_fields())
            .unwrap();

        let broken = PredictionPipeline::new(
            Some(FixedModel::new(120.0)),
            PredictionStore::new(dir.path().join("no-such-dir").join("audit.db")),
        );
        let result = broken.predict_form(&form_fields()).unwrap();
        assert_eq!(result, working);
    }

    #[test]
    fn inference_failure_is_generic() {
        let dir = tempfile::tempdir().unwrap();
        let err = pipeline(Some(Arc::new(FailingModel)), &dir)
            .predict_form(&form_fields())
            .unwrap_err();
        assert!(matches!(err, PredictError::Inference(_)));
        assert_eq!(err.user_message(), "An unexpected error occurred");
        assert_eq!(store_rows(&dir), 0);
    }

    #[test]
    fn nan_output_is_unknown_tier() {
        let dir = tempfile::tempdir().unwrap();
        let body = serde_json::to_vec(&FeatureVector::from_form(&form_fields()).unwrap()).unwrap();
        let result = pipeline(Some(FixedModel::new(f64::NAN)), &dir)
            .predict_json(&body)
            .unwrap();
        assert_eq!(result.risk_category(), "Unknown");
        assert_eq!(result.advice, "No advice available");
    }

    #[test]
    fn same_input_same_result() {
        let dir = tempfile::tempdir().unwrap();
        let p = pipeline(Some(FixedModel::new(77.7)), &dir);
        let first = p.predict_form(&form_fields()).unwrap();
        let second = p.predict_form(&form_fields()).unwrap();
        assert_eq!(first, second);
        assert_eq!(store_rows(&dir), 2);
    }
}
