//! The response schema sent with every model call.
//!
//! Built once as a static constant (not per call) and handed to the service as its
//! structured-output contract. The typed counterpart is [`crate::report::StructuredReport`];
//! `REQUIRED_FIELDS` is the single source of truth for the required set; the first
//! schema access asserts agreement in debug builds, and tests check it in release.
//!
//! Types use the service's uppercase spelling (`OBJECT`, `STRING`, ...) as the
//! generative-language REST API expects for `responseSchema`.

use once_cell::sync::Lazy;
use serde_json::{json, Value};

/// Top-level fields the model must populate on every turn.
pub const REQUIRED_FIELDS: [&str; 12] = [
    "CarbonEmission",
    "response",
    "crop_details",
    "farming_practices",
    "machinery_usage",
    "livestock_management",
    "renewable_energy_usage",
    "crop_residue_management",
    "carbon_sequestration_practices",
    "transportation_emissions",
    "fertilizer_recommendations",
    "suggestions",
];

/// True when the schema's `required` array and property set both equal
/// [`REQUIRED_FIELDS`]. Checked on first schema access in debug builds and in tests.
fn required_set_is_consistent(schema: &Value) -> bool {
    let Some(required) = schema["required"].as_array() else {
        return false;
    };
    let Some(properties) = schema["properties"].as_object() else {
        return false;
    };
    required.len() == REQUIRED_FIELDS.len()
        && required
            .iter()
            .zip(REQUIRED_FIELDS)
            .all(|(v, field)| v.as_str() == Some(field))
        && properties.len() == REQUIRED_FIELDS.len()
        && REQUIRED_FIELDS.iter().all(|f| properties.contains_key(*f))
}

static REPORT_SCHEMA: Lazy<Value> = Lazy::new(|| {
    let schema = json!({
        "type": "OBJECT",
        "required": REQUIRED_FIELDS,
        "properties": {
            "CarbonEmission": {
                "type": "NUMBER",
                "description": "Estimated carbon emissions in kg CO2-equivalent"
            },
            "response": {
                "type": "STRING",
                "description": "Explanation and recommendations"
            },
            "crop_details": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "cropName": {"type": "STRING"},
                        "area": {"type": "NUMBER"},
                        "unit": {"type": "STRING", "enum": ["acres", "hectares"]},
                        "crop_yield": {"type": "NUMBER"}
                    }
                }
            },
            "farming_practices": {
                "type": "OBJECT",
                "properties": {
                    "tillage_method": {
                        "type": "STRING",
                        "enum": ["conventional", "reduced", "no-till"]
                    },
                    "irrigation_type": {
                        "type": "STRING",
                        "enum": ["flood", "drip", "sprinkler", "none"]
                    },
                    "irrigation_frequency": {"type": "NUMBER"},
                    "fertilizer_usage": {
                        "type": "ARRAY",
                        "items": {
                            "type": "OBJECT",
                            "properties": {
                                "fertilizer_type": {"type": "STRING"},
                                "application_frequency": {"type": "NUMBER"},
                                "amount": {"type": "NUMBER"},
                                "unit": {"type": "STRING", "enum": ["kg", "liters"]}
                            }
                        }
                    }
                }
            },
            "machinery_usage": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "machinery_type": {"type": "STRING"},
                        "hours_per_season": {"type": "NUMBER"},
                        "fuel_type": {
                            "type": "STRING",
                            "enum": ["diesel", "gasoline", "electric"]
                        }
                    }
                }
            },
            "livestock_management": {
                "type": "OBJECT",
                "properties": {
                    "has_livestock": {"type": "BOOLEAN"},
                    "livestock_count": {"type": "NUMBER"},
                    "livestock_type": {"type": "STRING"},
                    "manure_management": {
                        "type": "STRING",
                        "enum": ["compost", "spread", "stored", "none"]
                    }
                }
            },
            "renewable_energy_usage": {"type": "BOOLEAN"},
            "crop_residue_management": {
                "type": "STRING",
                "enum": ["burned", "left on field", "composted", "removed"]
            },
            "carbon_sequestration_practices": {
                "type": "OBJECT",
                "properties": {
                    "cover_crops": {"type": "BOOLEAN"},
                    "agroforestry": {"type": "BOOLEAN"},
                    "biochar_usage": {"type": "BOOLEAN"}
                }
            },
            "transportation_emissions": {
                "type": "OBJECT",
                "properties": {
                    "distance_to_market": {"type": "NUMBER"},
                    "unit": {"type": "STRING", "enum": ["km", "miles"]},
                    "transport_method": {"type": "STRING", "enum": ["truck", "train", "ship"]}
                }
            },
            "fertilizer_recommendations": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "fertilizer_type": {"type": "STRING"},
                        "amount": {"type": "NUMBER"},
                        "unit": {"type": "STRING", "enum": ["kg", "liters"]},
                        "best_time_to_apply": {"type": "STRING"},
                        "reason": {"type": "STRING"}
                    }
                }
            },
            "suggestions": {
                "type": "ARRAY",
                "items": {"type": "STRING"}
            }
        }
    });
    debug_assert!(
        required_set_is_consistent(&schema),
        "report schema disagrees with REQUIRED_FIELDS"
    );
    schema
});

/// Returns the report schema constant.
pub fn report_schema() -> &'static Value {
    &REPORT_SCHEMA
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn consistency_check_accepts_the_real_schema() {
        assert!(required_set_is_consistent(report_schema()));
    }

    #[test]
    fn consistency_check_rejects_a_drifted_schema() {
        let mut drifted = report_schema().clone();
        drifted["required"]
            .as_array_mut()
            .unwrap()
            .push(json!("soil_type"));
        assert!(!required_set_is_consistent(&drifted));

        let mut missing_property = report_schema().clone();
        missing_property["properties"]
            .as_object_mut()
            .unwrap()
            .remove("suggestions");
        assert!(!required_set_is_consistent(&missing_property));
    }

    #[test]
    fn required_set_matches_constant() {
        let required: Vec<&str> = report_schema()["required"]
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v.as_str().unwrap())
            .collect();
        assert_eq!(required, REQUIRED_FIELDS);
    }

    #[test]
    fn every_required_field_has_a_property() {
        let properties = report_schema()["properties"].as_object().unwrap();
        for field in REQUIRED_FIELDS {
            assert!(properties.contains_key(field), "missing property: {field}");
        }
        assert_eq!(properties.len(), REQUIRED_FIELDS.len());
    }

    #[test]
    fn residue_enum_matches_typed_variants() {
        let values: Vec<&str> = report_schema()["properties"]["crop_residue_management"]
            ["enum"]
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v.as_str().unwrap())
            .collect();
        assert_eq!(values, vec!["burned", "left on field", "composted", "removed"]);
    }

    #[test]
    fn schema_parses_sample_report_fields() {
        // The typed report and the schema must agree on field names.
        let report: crate::report::StructuredReport =
            serde_json::from_str(&crate::report::tests::sample_report_json()).unwrap();
        let value = serde_json::to_value(&report).unwrap();
        let properties = report_schema()["properties"].as_object().unwrap();
        for key in value.as_object().unwrap().keys() {
            assert!(properties.contains_key(key), "schema missing field: {key}");
        }
    }
}
