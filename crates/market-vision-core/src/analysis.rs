//! The structured assessment returned for a chart.
//!
//! Field names match the JSON the model is instructed to produce
//! (camelCase). Required fields fail deserialization when absent; optional
//! ones default to `None` and are omitted when serialized again.

use crate::error::RelayError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Trading signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Signal {
    Buy,
    Sell,
    Hold,
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Signal::Buy => "BUY",
            Signal::Sell => "SELL",
            Signal::Hold => "HOLD",
        };
        f.write_str(s)
    }
}

/// Findings from one analysis method (price action, Fibonacci, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodAnalysis {
    /// Method label, e.g. "Fibonacci Analysis"
    pub method: String,
    /// Usually 2-3 findings
    pub findings: Vec<String>,
    pub signal: Signal,
    /// 1 (weak) to 10 (strong)
    pub strength: u8,
}

/// Suggested trade levels, as display strings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entry_price: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stop_loss: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub take_profit1: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub take_profit2: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub risk_reward_ratio: Option<String>,
}

/// Conditions that would confirm either direction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scenarios {
    pub bullish_condition: String,
    pub bearish_condition: String,
}

/// Values the model read off the chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EstimatedData {
    pub current_price: String,
    pub candle_type: String,
}

/// Full analysis of one chart image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub symbol: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeframe: Option<String>,

    pub signal: Signal,
    /// 0-100
    pub confidence: u8,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_action: Option<MethodAnalysis>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fibonacci: Option<MethodAnalysis>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub elliot_wave: Option<MethodAnalysis>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume_analysis: Option<MethodAnalysis>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub market_structure: Option<MethodAnalysis>,

    pub technical: Vec<String>,
    pub fundamental: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recommendation: Option<Recommendation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scenarios: Option<Scenarios>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_data: Option<EstimatedData>,

    pub reasoning: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warnings: Option<Vec<String>>,
}

impl AnalysisResult {
    /// The per-method sub-records that are present, in prompt order.
    pub fn methods(&self) -> Vec<&MethodAnalysis> {
        [
            &self.price_action,
            &self.fibonacci,
            &self.elliot_wave,
            &self.volume_analysis,
            &self.market_structure,
        ]
        .into_iter()
        .filter_map(Option::as_ref)
        .collect()
    }

    /// Range checks serde can't express.
    pub fn validate(&self) -> Result<(), RelayError> {
        if self.confidence > 100 {
            return Err(RelayError::MalformedResult(format!(
                "confidence must be between 0 and 100, got {}",
                self.confidence
            )));
        }
        for method in self.methods() {
            if !(1..=10).contains(&method.strength) {
                return Err(RelayError::MalformedResult(format!(
                    "{} strength must be between 1 and 10, got {}",
                    method.method, method.strength
                )));
            }
        }
        Ok(())
    }
}
