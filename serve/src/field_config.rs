//! `/api/field-config`: renders a field-simulator configuration file.
//!
//! Takes the field geometry as JSON and answers with a YAML document shaped for the
//! cropcraft simulator: an `output_enabled` list, per-format `output` entries, and a
//! `field` block with numbered beds (`bed1`, `bed2`, ...). Optional noise and stones
//! blocks are only emitted when the request carries at least one of their values.

use std::sync::Arc;

use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::json;
use serde_yaml::{Mapping, Value};
use tracing::error;

use crate::app::AppState;

const ATTACHMENT: &str = "attachment; filename=\"cropcraft_config.yaml\"";

#[derive(Debug, Deserialize)]
pub(crate) struct FieldConfigRequest {
    headland_width: f64,
    bed_width: f64,
    plants_count: u32,
    plant_distance: f64,
    output_format: OutputFormat,
    beds: Vec<BedSpec>,
    #[serde(default)]
    noise: Option<NoiseSpec>,
    #[serde(default)]
    stones: Option<StonesSpec>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
enum OutputFormat {
    Blender,
    Gazebo,
    Both,
}

#[derive(Debug, Serialize, Deserialize)]
struct BedSpec {
    plant_type: String,
    plant_height: f64,
    rows_count: u32,
    row_distance: f64,
    beds_count: u32,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct NoiseSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    position: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    tilt: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    scale: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    missing: Option<f64>,
}

impl NoiseSpec {
    fn is_empty(&self) -> bool {
        self.position.is_none() && self.tilt.is_none() && self.scale.is_none() && self.missing.is_none()
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct StonesSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    density: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    noise_scale: Option<f64>,
}

impl StonesSpec {
    fn is_empty(&self) -> bool {
        self.density.is_none() && self.noise_scale.is_none()
    }
}

fn yaml_key(key: &str) -> Value {
    Value::String(key.to_string())
}

fn render_yaml(request: &FieldConfigRequest) -> Result<String, serde_yaml::Error> {
    let mut output_enabled = Vec::new();
    let mut output = Mapping::new();
    if matches!(request.output_format, OutputFormat::Blender | OutputFormat::Both) {
        output_enabled.push(yaml_key("blender"));
        output.insert(
            yaml_key("blender"),
            serde_yaml::to_value(json!({
                "type": "blender_file",
                "filename": "cropcraft_test3.blend"
            }))?,
        );
    }
    if matches!(request.output_format, OutputFormat::Gazebo | OutputFormat::Both) {
        output_enabled.push(yaml_key("gazebo"));
        output.insert(
            yaml_key("gazebo"),
            serde_yaml::to_value(json!({
                "type": "gazebo_model",
                "name": "cropcraft_test3",
                "author": "Farm Saathi User"
            }))?,
        );
    }

    let mut beds = Mapping::new();
    for (i, bed) in request.beds.iter().enumerate() {
        beds.insert(yaml_key(&format!("bed{}", i + 1)), serde_yaml::to_value(bed)?);
    }

    let mut field = Mapping::new();
    field.insert(yaml_key("headland_width"), request.headland_width.into());
    field.insert(yaml_key("bed_width"), request.bed_width.into());
    field.insert(yaml_key("plants_count"), request.plants_count.into());
    field.insert(yaml_key("plant_distance"), request.plant_distance.into());
    field.insert(yaml_key("beds"), Value::Mapping(beds));
    if let Some(noise) = &request.noise {
        if !noise.is_empty() {
            field.insert(yaml_key("noise"), serde_yaml::to_value(noise)?);
        }
    }
    if let Some(stones) = &request.stones {
        if !stones.is_empty() {
            field.insert(yaml_key("stones"), serde_yaml::to_value(stones)?);
        }
    }

    let mut root = Mapping::new();
    root.insert(yaml_key("output_enabled"), Value::Sequence(output_enabled));
    root.insert(yaml_key("output"), Value::Mapping(output));
    root.insert(yaml_key("field"), Value::Mapping(field));
    serde_yaml::to_string(&Value::Mapping(root))
}

/// Renders the configuration and answers it as a YAML attachment.
pub(crate) async fn generate(
    State(_state): State<Arc<AppState>>,
    Json(request): Json<FieldConfigRequest>,
) -> Response {
    match render_yaml(&request) {
        Ok(yaml) => (
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, "application/x-yaml"),
                (header::CONTENT_DISPOSITION, ATTACHMENT),
            ],
            yaml,
        )
            .into_response(),
        Err(e) => {
            error!(error = %e, "failed to render field config");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"error": "Failed to generate configuration"})),
            )
                .into_response()
        }
    }
}
