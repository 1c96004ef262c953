use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::ApiError;
use crate::inference::{self, HIGH_THRESHOLD, MODEL_VERSION, MODERATE_THRESHOLD, PREDICTORS};

/// The four lab values the ridge model is fitted on.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq)]
pub struct ClinicalInput {
    /// Serum sodium, mmol/L.
    pub sodium: f64,
    /// Serum osmolality, mOsm/kg.
    #[serde(alias = "serumOsmolality")]
    pub serum_osmolality: f64,
    /// Urine-to-plasma osmolality ratio.
    #[serde(alias = "upRatio")]
    pub up_ratio: f64,
    /// Length of hospital stay, days.
    #[serde(alias = "hospitalStayDays")]
    pub hospital_stay_days: f64,
}

impl Default for ClinicalInput {
    fn default() -> Self {
        ClinicalInput {
            sodium: 135.0,
            serum_osmolality: 280.0,
            up_ratio: 2.0,
            hospital_stay_days: 7.0,
        }
    }
}

impl ClinicalInput {
    pub fn new(sodium: f64, serum_osmolality: f64, up_ratio: f64, hospital_stay_days: f64) -> Self {
        ClinicalInput {
            sodium,
            serum_osmolality,
            up_ratio,
            hospital_stay_days,
        }
    }

    /// Values in the same order as [`PREDICTORS`].
    pub fn to_array(&self) -> [f64; 4] {
        [
            self.sodium,
            self.serum_osmolality,
            self.up_ratio,
            self.hospital_stay_days,
        ]
    }

    /// Rejects NaN and infinities. Ranges are not checked: a
    /// negative sodium is still scored.
    pub fn validate(&self) -> Result<(), ApiError> {
        for (predictor, value) in PREDICTORS.iter().zip(self.to_array()) {
            if !value.is_finite() {
                return Err(ApiError::Validation(format!(
                    "{} must be a finite number (value: {})",
                    predictor.label, value
                )));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum RiskCategory {
    Low,
    Moderate,
    High,
}

impl RiskCategory {
    /// `p < 0.33` is Low, `p < 0.66` is Moderate, anything else (NaN included) is High.
    pub fn from_probability(probability: f64) -> Self {
        if probability < MODERATE_THRESHOLD {
            RiskCategory::Low
        } else if probability < HIGH_THRESHOLD {
            RiskCategory::Moderate
        } else {
            RiskCategory::High
        }
    }

    /// Visual treatment of the band in the UI.
    pub fn style(&self) -> &'static str {
        match self {
            RiskCategory::Low => "success",
            RiskCategory::Moderate => "warning",
            RiskCategory::High => "error",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            RiskCategory::Low => "Low probability of SIADH",
            RiskCategory::Moderate => "Moderate probability of SIADH",
            RiskCategory::High => "High probability of SIADH",
        }
    }

    pub fn marker(&self) -> &'static str {
        match self {
            RiskCategory::Low => "🟢",
            RiskCategory::Moderate => "🟠",
            RiskCategory::High => "🔴",
        }
    }
}

impl std::fmt::Display for RiskCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            RiskCategory::Low => "Low",
            RiskCategory::Moderate => "Moderate",
            RiskCategory::High => "High",
        };
        f.write_str(name)
    }
}

/// Output of the score engine.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct PredictionResult {
    pub probability: f64,
    pub category: RiskCategory,
}

/// Share of the linear score carried by one predictor.
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct Contribution {
    pub name: String,
    pub label: String,
    pub unit: String,
    pub value: f64,
    pub z_score: f64,
    pub coefficient: f64,
    pub contribution: f64,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct DisplayHints {
    pub probability_text: String,
    pub style: String,
    pub label: String,
    pub marker: String,
}

impl DisplayHints {
    pub fn for_result(result: &PredictionResult) -> Self {
        DisplayHints {
            probability_text: format!("{:.2}", result.probability),
            style: result.category.style().to_string(),
            label: result.category.label().to_string(),
            marker: result.category.marker().to_string(),
        }
    }
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct ReferenceLine {
    pub at: f64,
    pub label: String,
    pub color: String,
}

/// Horizontal bar on a fixed [0, 1] axis.
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct BarChart {
    pub label: String,
    pub axis_min: f64,
    pub axis_max: f64,
    pub value: f64,
    pub reference_lines: Vec<ReferenceLine>,
}

impl BarChart {
    pub fn for_probability(probability: f64) -> Self {
        BarChart {
            label: "SIADH Probability".to_string(),
            axis_min: 0.0,
            axis_max: 1.0,
            value: probability,
            reference_lines: vec![
                ReferenceLine {
                    at: MODERATE_THRESHOLD,
                    label: "Moderate risk".to_string(),
                    color: "orange".to_string(),
                },
                ReferenceLine {
                    at: HIGH_THRESHOLD,
                    label: "High risk".to_string(),
                    color: "red".to_string(),
                },
            ],
        }
    }
}

/// Everything the UI needs to render one prediction.
#[derive(Debug, Serialize, Clone)]
pub struct PredictionReport {
    pub input: ClinicalInput,
    pub score: f64,
    pub probability: f64,
    pub category: RiskCategory,
    pub contributions: Vec<Contribution>,
    pub display: DisplayHints,
    pub chart: BarChart,
    pub timestamp: String,
    pub model_version: String,
}

impl PredictionReport {
    pub fn new(input: &ClinicalInput) -> Self {
        let z = inference::standardize(input);
        let score = inference::linear_score(&z);
        let result = inference::from_score(score);

        PredictionReport {
            input: *input,
            score,
            probability: result.probability,
            category: result.category,
            contributions: inference::explain_standardized(input, &z),
            display: DisplayHints::for_result(&result),
            chart: BarChart::for_probability(result.probability),
            timestamp: chrono::Utc::now().to_rfc3339(),
            model_version: MODEL_VERSION.to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
    pub timestamp: String,
    pub execution_time_ms: Option<u64>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        ApiResponse {
            success: true,
            data: Some(data),
            error: None,
            timestamp: chrono::Utc::now().to_rfc3339(),
            execution_time_ms: None,
        }
    }

    pub fn error(message: &str) -> Self {
        ApiResponse {
            success: false,
            data: None,
            error: Some(message.to_string()),
            timestamp: chrono::Utc::now().to_rfc3339(),
            execution_time_ms: None,
        }
    }

    pub fn timed(mut self, start: Instant) -> Self {
        self.execution_time_ms = Some(start.elapsed().as_millis() as u64);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn defaults_match_the_form() {
        assert_eq!(
            ClinicalInput::default(),
            ClinicalInput::new(135.0, 280.0, 2.0, 7.0)
        );
    }

    #[test]
    fn accepts_camel_case_fields() {
        let json = r#"{"sodium":130,"serumOsmolality":270,"upRatio":3.5,"hospitalStayDays":10}"#;
        let input: ClinicalInput = serde_json::from_str(json).unwrap();
        assert_eq!(input, ClinicalInput::new(130.0, 270.0, 3.5, 10.0));
    }

    #[test]
    fn category_bands_are_half_open() {
        assert_eq!(RiskCategory::from_probability(0.0), RiskCategory::Low);
        assert_eq!(RiskCategory::from_probability(0.3299999), RiskCategory::Low);
        assert_eq!(RiskCategory::from_probability(0.33), RiskCategory::Moderate);
        assert_eq!(RiskCategory::from_probability(0.6599999), RiskCategory::Moderate);
        assert_eq!(RiskCategory::from_probability(0.66), RiskCategory::High);
        assert_eq!(RiskCategory::from_probability(1.0), RiskCategory::High);
        assert_eq!(RiskCategory::from_probability(f64::NAN), RiskCategory::High);
    }

    #[test]
    fn validate_only_rejects_non_finite() {
        assert!(ClinicalInput::new(-10.0, 0.0, -1.0, 0.0).validate().is_ok());
        let err = ClinicalInput::new(135.0, f64::NAN, 2.0, 7.0)
            .validate()
            .unwrap_err();
        assert!(err.to_string().contains("Serum osmolality"));
        assert!(ClinicalInput::new(135.0, 280.0, f64::INFINITY, 7.0)
            .validate()
            .is_err());
    }

    #[test]
    fn display_rounds_to_two_decimals() {
        let display = DisplayHints::for_result(&PredictionResult {
            probability: 0.6549,
            category: RiskCategory::Moderate,
        });
        assert_eq!(display.probability_text, "0.65");
        assert_eq!(display.style, "warning");
        assert_eq!(display.marker, "🟠");
    }

    #[test]
    fn chart_has_fixed_reference_lines() {
        let chart = BarChart::for_probability(0.42);
        assert_eq!(chart.value, 0.42);
        assert_eq!((chart.axis_min, chart.axis_max), (0.0, 1.0));
        let lines: Vec<f64> = chart.reference_lines.iter().map(|l| l.at).collect();
        assert_eq!(lines, vec![0.33, 0.66]);
    }

    #[test]
    fn report_for_defaults() {
        let report = PredictionReport::new(&ClinicalInput::default());
        assert_eq!(report.category, RiskCategory::Low);
        assert_eq!(report.display.probability_text, "0.11");
        assert_eq!(report.contributions.len(), 4);
        assert_eq!(report.model_version, MODEL_VERSION);
    }

    #[test]
    fn report_agrees_with_engine() {
        let input = ClinicalInput::new(128.0, 265.0, 3.1, 12.0);
        let report = PredictionReport::new(&input);
        let result = inference::predict(&input);

        assert_eq!(report.probability.to_bits(), result.probability.to_bits());
        assert_eq!(report.category, result.category);
        assert_eq!(
            report.score.to_bits(),
            inference::linear_score(&inference::standardize(&input)).to_bits()
        );
        assert_eq!(report.contributions, inference::explain(&input));
    }
}
