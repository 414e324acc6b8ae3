//! Sampling parameters and model selection for text generation.

use serde::{Deserialize, Serialize};

use crate::errors::AppError;

pub const DEFAULT_TEMPERATURE: f32 = 0.7;
pub const DEFAULT_TOP_P: f32 = 0.9;
pub const DEFAULT_TOP_K: u32 = 40;

const TEMPERATURE_RANGE: (f32, f32) = (0.0, 2.0);
const TOP_P_RANGE: (f32, f32) = (0.0, 1.0);
const TOP_K_RANGE: (u32, u32) = (1, 100);

/// The local models the generator is allowed to load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ModelChoice {
    #[default]
    #[serde(rename = "Nous-Hermes-2-Mistral-7B-DPO.Q4_0")]
    NousHermes2Mistral,
    #[serde(rename = "Meta-Llama-3-8B-Instruct.Q4_0")]
    Llama3Instruct,
}

impl ModelChoice {
    pub fn model_name(self) -> &'static str {
        match self {
            ModelChoice::NousHermes2Mistral => "Nous-Hermes-2-Mistral-7B-DPO.Q4_0",
            ModelChoice::Llama3Instruct => "Meta-Llama-3-8B-Instruct.Q4_0",
        }
    }
}

/// Sampling knobs passed to every generation call.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplingParams {
    /// 0.0 – 2.0
    pub temperature: f32,
    /// 0.0 – 1.0
    pub top_p: f32,
    /// 1 – 100
    pub top_k: u32,
}

impl Default for SamplingParams {
    fn default() -> Self {
        Self {
            temperature: DEFAULT_TEMPERATURE,
            top_p: DEFAULT_TOP_P,
            top_k: DEFAULT_TOP_K,
        }
    }
}

impl SamplingParams {
    pub fn validate(&self) -> Result<(), AppError> {
        let (t_min, t_max) = TEMPERATURE_RANGE;
        if !(t_min..=t_max).contains(&self.temperature) {
            return Err(AppError::Validation(format!(
                "temperature must be within {t_min}–{t_max}, got {}",
                self.temperature
            )));
        }
        let (p_min, p_max) = TOP_P_RANGE;
        if !(p_min..=p_max).contains(&self.top_p) {
            return Err(AppError::Validation(format!(
                "top_p must be within {p_min}–{p_max}, got {}",
                self.top_p
            )));
        }
        let (k_min, k_max) = TOP_K_RANGE;
        if !(k_min..=k_max).contains(&self.top_k) {
            return Err(AppError::Validation(format!(
                "top_k must be within {k_min}–{k_max}, got {}",
                self.top_k
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        let params = SamplingParams::default();
        assert!((params.temperature - 0.7).abs() < 1e-6);
        assert!((params.top_p - 0.9).abs() < 1e-6);
        assert_eq!(params.top_k, 40);
        assert!(params.validate().is_ok());
    }

    #[test]
    fn test_bounds_are_inclusive() {
        let low = SamplingParams {
            temperature: 0.0,
            top_p: 0.0,
            top_k: 1,
        };
        let high = SamplingParams {
            temperature: 2.0,
            top_p: 1.0,
            top_k: 100,
        };
        assert!(low.validate().is_ok());
        assert!(high.validate().is_ok());
    }

    #[test]
    fn test_out_of_range_values_rejected() {
        let cases = [
            SamplingParams {
                temperature: 2.1,
                ..SamplingParams::default()
            },
            SamplingParams {
                top_p: -0.1,
                ..SamplingParams::default()
            },
            SamplingParams {
                top_k: 0,
                ..SamplingParams::default()
            },
            SamplingParams {
                top_k: 101,
                ..SamplingParams::default()
            },
            SamplingParams {
                temperature: f32::NAN,
                ..SamplingParams::default()
            },
        ];
        for params in cases {
            assert!(
                matches!(params.validate(), Err(AppError::Validation(_))),
                "{params:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let params: SamplingParams = serde_json::from_str(r#"{"top_k": 10}"#).unwrap();
        assert_eq!(params.top_k, 10);
        assert!((params.temperature - DEFAULT_TEMPERATURE).abs() < 1e-6);
    }

    #[test]
    fn test_model_choice_serializes_as_model_name() {
        let json = serde_json::to_string(&ModelChoice::Llama3Instruct).unwrap();
        assert_eq!(json, "\"Meta-Llama-3-8B-Instruct.Q4_0\"");
        let parsed: ModelChoice =
            serde_json::from_str("\"Nous-Hermes-2-Mistral-7B-DPO.Q4_0\"").unwrap();
        assert_eq!(parsed, ModelChoice::NousHermes2Mistral);
        assert_eq!(ModelChoice::default().model_name(), "Nous-Hermes-2-Mistral-7B-DPO.Q4_0");
    }
}
