//! Flattened view of a turn outcome for API responses.
//!
//! The chat endpoint does not return the full [`StructuredReport`]; it returns the
//! subset the dashboard displays, plus a percentage gauge derived from the emission
//! estimate. A degraded turn gets the same shape with placeholder values so the
//! client never has to branch on response layout.

use serde::{Deserialize, Serialize};

use crate::report::{CropDetail, FarmingPractices, FertilizerRecommendation, StructuredReport};

/// Emission value treated as 100% on the gauge, in kg CO2-equivalent.
pub const EMISSION_CEILING_KG: f64 = 100.0;

/// Display-ready summary of one turn.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportSummary {
    pub response: String,
    #[serde(rename = "CarbonEmission")]
    pub carbon_emission: f64,
    /// Emission as a share of [`EMISSION_CEILING_KG`], clamped to 0..=100.
    pub carbon_percentage: f64,
    pub fertilizer_recommendations: Vec<FertilizerRecommendation>,
    pub farming_practices: FarmingPractices,
    pub crop_details: Vec<CropDetail>,
    pub suggestions: Vec<String>,
    pub crop_residue_management: String,
}

impl ReportSummary {
    /// Flattens a parsed report.
    pub fn from_report(report: StructuredReport) -> Self {
        Self {
            response: report.response,
            carbon_emission: report.carbon_emission,
            carbon_percentage: carbon_percentage(report.carbon_emission),
            fertilizer_recommendations: report.fertilizer_recommendations,
            farming_practices: report.farming_practices,
            crop_details: report.crop_details,
            suggestions: report.suggestions,
            crop_residue_management: report.crop_residue_management.as_wire_str().to_string(),
        }
    }

    /// Summary for a turn whose reply did not parse as a report: the raw text
    /// becomes the response and every structured field takes its placeholder.
    pub fn degraded(raw: impl Into<String>) -> Self {
        Self {
            response: raw.into(),
            carbon_emission: 0.0,
            carbon_percentage: 0.0,
            fertilizer_recommendations: Vec::new(),
            farming_practices: FarmingPractices::default(),
            crop_details: Vec::new(),
            suggestions: Vec::new(),
            crop_residue_management: "none".to_string(),
        }
    }
}

/// Maps an emission estimate onto the 0..=100 gauge. Non-positive values read as 0;
/// anything at or above the ceiling reads as 100.
pub fn carbon_percentage(emission_kg: f64) -> f64 {
    if emission_kg > 0.0 {
        (emission_kg / EMISSION_CEILING_KG * 100.0).min(100.0)
    } else {
        0.0
    }
}
