//! Typed form of the advisor's structured output.
//!
//! [`StructuredReport`] mirrors the response schema in [`crate::schema`]: the twelve
//! top-level fields are required, so a model output missing any of them fails to parse
//! and the turn degrades to raw text (see [`crate::advisor`]). Nested fields are all
//! optional; the model fills them in as the conversation collects data.
//!
//! Field names on the wire follow the original service contract (`CarbonEmission`,
//! `cropName`, `crop_yield`, ...), which is mixed-style; serde renames keep the Rust
//! side uniform.

use serde::{Deserialize, Serialize};

/// Schema-conformant record parsed from one assistant turn.
///
/// Produced fresh each turn; continuity across turns comes from the model seeing the
/// full transcript, not from this code merging records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructuredReport {
    /// Estimated carbon emissions in kg CO2-equivalent.
    #[serde(rename = "CarbonEmission")]
    pub carbon_emission: f64,
    /// Explanation and recommendations, or the next question to the user.
    pub response: String,
    pub crop_details: Vec<CropDetail>,
    pub farming_practices: FarmingPractices,
    pub machinery_usage: Vec<MachineryUsage>,
    pub livestock_management: LivestockManagement,
    pub renewable_energy_usage: bool,
    pub crop_residue_management: ResidueManagement,
    pub carbon_sequestration_practices: CarbonSequestration,
    pub transportation_emissions: TransportationEmissions,
    pub fertilizer_recommendations: Vec<FertilizerRecommendation>,
    pub suggestions: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CropDetail {
    #[serde(default, rename = "cropName", skip_serializing_if = "Option::is_none")]
    pub crop_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub area: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<AreaUnit>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crop_yield: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AreaUnit {
    Acres,
    Hectares,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FarmingPractices {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tillage_method: Option<TillageMethod>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub irrigation_type: Option<IrrigationType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub irrigation_frequency: Option<f64>,
    #[serde(default)]
    pub fertilizer_usage: Vec<FertilizerUsage>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TillageMethod {
    Conventional,
    Reduced,
    #[serde(rename = "no-till")]
    NoTill,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IrrigationType {
    Flood,
    Drip,
    Sprinkler,
    None,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FertilizerUsage {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fertilizer_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub application_frequency: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<AmountUnit>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AmountUnit {
    Kg,
    Liters,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MachineryUsage {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub machinery_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hours_per_season: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fuel_type: Option<FuelType>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FuelType {
    Diesel,
    Gasoline,
    Electric,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LivestockManagement {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_livestock: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub livestock_count: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub livestock_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manure_management: Option<ManureManagement>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ManureManagement {
    Compost,
    Spread,
    Stored,
    None,
}

/// What happens to crop residue after harvest. Wire values include a spaced variant
/// (`"left on field"`), kept verbatim from the original contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResidueManagement {
    Burned,
    #[serde(rename = "left on field")]
    LeftOnField,
    Composted,
    Removed,
}

impl ResidueManagement {
    pub fn as_wire_str(&self) -> &'static str {
        match self {
            Self::Burned => "burned",
            Self::LeftOnField => "left on field",
            Self::Composted => "composted",
            Self::Removed => "removed",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CarbonSequestration {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_crops: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agroforestry: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub biochar_usage: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransportationEmissions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance_to_market: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<DistanceUnit>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transport_method: Option<TransportMethod>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DistanceUnit {
    Km,
    Miles,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportMethod {
    Truck,
    Train,
    Ship,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FertilizerRecommendation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fertilizer_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<AmountUnit>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub best_time_to_apply: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// A complete wire payload as the model would emit it.
    pub(crate) fn sample_report_json() -> String {
        serde_json::json!({
            "CarbonEmission": 42.5,
            "response": "Based on 2 acres of wheat with conventional tillage...",
            "crop_details": [
                {"cropName": "wheat", "area": 2.0, "unit": "acres", "crop_yield": 3.5}
            ],
            "farming_practices": {
                "tillage_method": "conventional",
                "irrigation_type": "drip",
                "irrigation_frequency": 3,
                "fertilizer_usage": [
                    {"fertilizer_type": "urea", "application_frequency": 2, "amount": 50, "unit": "kg"}
                ]
            },
            "machinery_usage": [
                {"machinery_type": "tractor", "hours_per_season": 40, "fuel_type": "diesel"}
            ],
            "livestock_management": {
                "has_livestock": false
            },
            "renewable_energy_usage": false,
            "crop_residue_management": "left on field",
            "carbon_sequestration_practices": {"cover_crops": true},
            "transportation_emissions": {
                "distance_to_market": 12, "unit": "km", "transport_method": "truck"
            },
            "fertilizer_recommendations": [
                {"fertilizer_type": "DAP", "amount": 20, "unit": "kg",
                 "best_time_to_apply": "before sowing", "reason": "low phosphorus"}
            ],
            "suggestions": ["switch to no-till", "consider cover crops"]
        })
        .to_string()
    }

    #[test]
    fn parses_complete_report() {
        let report: StructuredReport = serde_json::from_str(&sample_report_json()).unwrap();
        assert_eq!(report.carbon_emission, 42.5);
        assert_eq!(report.crop_details[0].crop_name.as_deref(), Some("wheat"));
        assert_eq!(report.crop_details[0].unit, Some(AreaUnit::Acres));
        assert_eq!(
            report.farming_practices.tillage_method,
            Some(TillageMethod::Conventional)
        );
        assert_eq!(report.crop_residue_management, ResidueManagement::LeftOnField);
        assert_eq!(report.machinery_usage[0].fuel_type, Some(FuelType::Diesel));
        assert_eq!(report.suggestions.len(), 2);
    }

    #[test]
    fn missing_required_field_fails_to_parse() {
        let mut value: serde_json::Value =
            serde_json::from_str(&sample_report_json()).unwrap();
        value.as_object_mut().unwrap().remove("CarbonEmission");
        let result = serde_json::from_value::<StructuredReport>(value);
        assert!(result.is_err());
    }

    #[test]
    fn nested_fields_are_optional() {
        let mut value: serde_json::Value =
            serde_json::from_str(&sample_report_json()).unwrap();
        value["farming_practices"] = serde_json::json!({});
        value["livestock_management"] = serde_json::json!({});
        let report = serde_json::from_value::<StructuredReport>(value).unwrap();
        assert!(report.farming_practices.tillage_method.is_none());
        assert!(report.farming_practices.fertilizer_usage.is_empty());
    }

    #[test]
    fn unknown_enum_value_fails() {
        let mut value: serde_json::Value =
            serde_json::from_str(&sample_report_json()).unwrap();
        value["crop_residue_management"] = serde_json::json!("vaporized");
        assert!(serde_json::from_value::<StructuredReport>(value).is_err());
    }

    #[test]
    fn residue_wire_str_round_trips() {
        for residue in [
            ResidueManagement::Burned,
            ResidueManagement::LeftOnField,
            ResidueManagement::Composted,
            ResidueManagement::Removed,
        ] {
            let wire = serde_json::to_value(residue).unwrap();
            assert_eq!(wire.as_str(), Some(residue.as_wire_str()));
        }
    }
}
