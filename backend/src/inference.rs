//! Ridge score for SIADH.
//!
//! Inputs are z-scored against the full-cohort means and standard deviations,
//! combined linearly with the fitted ridge coefficients and passed through a
//! logistic transform. Every function here is pure.
//!
//! Non-finite inputs are not guarded: a NaN anywhere yields a NaN probability,
//! which [`RiskCategory::from_probability`] places in the High band.

use serde::Serialize;

use crate::models::{ClinicalInput, Contribution, PredictionResult, RiskCategory};

pub const MODEL_VERSION: &str = "1.0.0";

pub const INTERCEPT: f64 = -2.336;

/// Lower bound of the Moderate band.
pub const MODERATE_THRESHOLD: f64 = 0.33;
/// Lower bound of the High band.
pub const HIGH_THRESHOLD: f64 = 0.66;

pub const CITATION: &str = "Ciortea D.A. et al., \"Impact of Hyponatremia and ADH Secretion in MIS-C and COVID-19: An Integrative Approach of Prognostic and Diagnostic Markers,\" CIIMB, 2024";

#[derive(Debug, Serialize, Clone, Copy, PartialEq)]
pub struct Predictor {
    pub name: &'static str,
    pub label: &'static str,
    pub unit: &'static str,
    pub mean: f64,
    pub sd: f64,
    pub coefficient: f64,
}

impl Predictor {
    pub fn standardize(&self, raw: f64) -> f64 {
        (raw - self.mean) / self.sd
    }
}

/// Same order as [`ClinicalInput::to_array`].
pub const PREDICTORS: [Predictor; 4] = [
    Predictor {
        name: "sodium",
        label: "Serum sodium",
        unit: "mmol/L",
        mean: 137.59,
        sd: 7.01,
        coefficient: -0.603,
    },
    Predictor {
        name: "serum_osmolality",
        label: "Serum osmolality",
        unit: "mOsm/kg",
        mean: 281.33,
        sd: 6.81,
        coefficient: -0.185,
    },
    Predictor {
        name: "up_ratio",
        label: "U/P osmolality ratio",
        unit: "",
        mean: 1.96,
        sd: 1.29,
        coefficient: 1.136,
    },
    Predictor {
        name: "hospital_stay_days",
        label: "Length of hospital stay",
        unit: "days",
        mean: 8.40,
        sd: 6.86,
        coefficient: 0.211,
    },
];

pub fn standardize(input: &ClinicalInput) -> [f64; 4] {
    let raw = input.to_array();
    let mut z = [0.0; 4];
    for (slot, (predictor, value)) in z.iter_mut().zip(PREDICTORS.iter().zip(raw)) {
        *slot = predictor.standardize(value);
    }
    z
}

/// Accumulates left to right from the intercept.
pub fn linear_score(z: &[f64; 4]) -> f64 {
    PREDICTORS
        .iter()
        .zip(z)
        .fold(INTERCEPT, |score, (predictor, z)| score + predictor.coefficient * z)
}

pub fn logistic(score: f64) -> f64 {
    1.0 / (1.0 + (-score).exp())
}

/// Logistic transform of a linear score, then banding.
pub fn from_score(score: f64) -> PredictionResult {
    let probability = logistic(score);
    PredictionResult {
        probability,
        category: RiskCategory::from_probability(probability),
    }
}

pub fn predict(input: &ClinicalInput) -> PredictionResult {
    from_score(linear_score(&standardize(input)))
}

pub fn explain(input: &ClinicalInput) -> Vec<Contribution> {
    explain_standardized(input, &standardize(input))
}

/// Breakdown for an input whose z-scores are already known.
pub fn explain_standardized(input: &ClinicalInput, z: &[f64; 4]) -> Vec<Contribution> {
    PREDICTORS
        .iter()
        .zip(input.to_array())
        .zip(z)
        .map(|((predictor, value), &z_score)| {
            Contribution {
                name: predictor.name.to_string(),
                label: predictor.label.to_string(),
                unit: predictor.unit.to_string(),
                value,
                z_score,
                coefficient: predictor.coefficient,
                contribution: predictor.coefficient * z_score,
            }
        })
        .collect()
}

pub fn model_info() -> ModelInfo {
    ModelInfo {
        name: "PredictADH".to_string(),
        kind: "ridge regression + logistic link".to_string(),
        version: MODEL_VERSION.to_string(),
        intercept: INTERCEPT,
        predictors: PREDICTORS.to_vec(),
        thresholds: Thresholds {
            moderate: MODERATE_THRESHOLD,
            high: HIGH_THRESHOLD,
        },
        citation: CITATION.to_string(),
    }
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct Thresholds {
    pub moderate: f64,
    pub high: f64,
}

#[derive(Debug, Serialize, Clone)]
pub struct ModelInfo {
    pub name: String,
    pub kind: String,
    pub version: String,
    pub intercept: f64,
    pub predictors: Vec<Predictor>,
    pub thresholds: Thresholds,
    pub citation: String,
}
