//! End-to-end HTTP tests against a server bound to 127.0.0.1:0 with a scripted model.

use std::sync::Arc;

use serde_json::json;
use tokio::net::TcpListener;

use saathi::{Advisor, MockLlm};
use serve::{AppState, SqliteProduceStore};

fn report_json(emission: f64, response: &str) -> String {
    json!({
        "CarbonEmission": emission,
        "response": response,
        "crop_details": [],
        "farming_practices": {},
        "machinery_usage": [],
        "livestock_management": {},
        "renewable_energy_usage": false,
        "crop_residue_management": "composted",
        "carbon_sequestration_practices": {},
        "transportation_emissions": {},
        "fertilizer_recommendations": [],
        "suggestions": ["use drip irrigation"]
    })
    .to_string()
}

/// Starts a server with the given model; lookups stay unconfigured.
async fn start_server(llm: Arc<MockLlm>) -> String {
    let advisor = Advisor::new(llm);
    let produce = Arc::new(SqliteProduceStore::in_memory().unwrap());
    let state = Arc::new(AppState::new(advisor, None, produce));
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        serve::run_serve_on_listener(listener, state).await.unwrap();
    });
    format!("http://{addr}")
}

#[tokio::test]
async fn empty_query_is_rejected() {
    let base = start_server(Arc::new(MockLlm::replying("unused"))).await;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("{base}/api/chat"))
        .json(&json!({"query": "   "}))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 400);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["error"], "Query cannot be empty");
}

#[tokio::test]
async fn chat_turn_returns_summary_with_session_id() {
    let base = start_server(Arc::new(MockLlm::replying(report_json(30.0, "Noted.")))).await;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("{base}/api/chat"))
        .json(&json!({"query": "I grow 2 acres of wheat"}))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["response"], "Noted.");
    assert_eq!(body["CarbonEmission"], 30.0);
    assert_eq!(body["carbon_percentage"], 30.0);
    assert_eq!(body["crop_residue_management"], "composted");
    assert_eq!(body["suggestions"][0], "use drip irrigation");
    for key in [
        "fertilizer_recommendations",
        "farming_practices",
        "crop_details",
    ] {
        assert!(body.get(key).is_some(), "missing key: {key}");
    }
    assert!(body["session_id"].as_str().is_some_and(|s| !s.is_empty()));
}

#[tokio::test]
async fn session_keeps_context_between_turns() {
    let llm = Arc::new(MockLlm::scripted(vec![
        report_json(10.0, "How much fertilizer?"),
        report_json(22.0, "Here is the estimate."),
    ]));
    let base = start_server(llm.clone()).await;
    let client = reqwest::Client::new();

    let first: serde_json::Value = client
        .post(format!("{base}/api/chat"))
        .json(&json!({"query": "one hectare of rice"}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let session_id = first["session_id"].as_str().unwrap().to_string();

    let second: serde_json::Value = client
        .post(format!("{base}/api/chat"))
        .json(&json!({"session_id": session_id, "query": "50 kg urea"}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(second["CarbonEmission"], 22.0);
    // The second call carried the first exchange plus the new question.
    assert_eq!(llm.seen_turn_counts(), vec![1, 3]);
}

#[tokio::test]
async fn plain_text_reply_degrades_to_placeholder_summary() {
    let base = start_server(Arc::new(MockLlm::replying("tell me more about your farm"))).await;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("{base}/api/chat"))
        .json(&json!({"query": "hello"}))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["response"], "tell me more about your farm");
    assert_eq!(body["CarbonEmission"], 0.0);
    assert_eq!(body["carbon_percentage"], 0.0);
    assert_eq!(body["crop_residue_management"], "none");
}

#[tokio::test]
async fn model_failure_is_a_server_error() {
    let base = start_server(Arc::new(MockLlm::failing("quota exhausted"))).await;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("{base}/api/chat"))
        .json(&json!({"query": "hello"}))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 500);
    let body: serde_json::Value = response.json().await.unwrap();
    let message = body["error"].as_str().unwrap();
    assert!(message.starts_with("failed to get response:"));
    assert!(message.contains("quota exhausted"));
}

#[tokio::test]
async fn lookups_answer_503_when_unconfigured() {
    let base = start_server(Arc::new(MockLlm::replying("unused"))).await;
    let client = reqwest::Client::new();

    for path in ["/api/weather?lat=28.6&lon=77.2", "/api/news", "/api/prices"] {
        let response = client.get(format!("{base}{path}")).send().await.unwrap();
        assert_eq!(response.status(), 503, "path: {path}");
    }
}

#[tokio::test]
async fn produce_create_list_delete_round_trip() {
    let base = start_server(Arc::new(MockLlm::replying("unused"))).await;
    let client = reqwest::Client::new();

    let created: serde_json::Value = client
        .post(format!("{base}/api/produce"))
        .json(&json!({"farmer_id": 7, "crop": "wheat", "quantity": 12.0, "price": 2200.0}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(created["unit"], "quintals");
    let id = created["id"].as_i64().unwrap();

    let listings: serde_json::Value = client
        .get(format!("{base}/api/produce?farmer_id=7"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(listings.as_array().unwrap().len(), 1);

    // Another farmer cannot delete it.
    let response = client
        .delete(format!("{base}/api/produce/{id}?farmer_id=8"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 404);

    let response = client
        .delete(format!("{base}/api/produce/{id}?farmer_id=7"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 204);

    let listings: serde_json::Value = client
        .get(format!("{base}/api/produce?farmer_id=7"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(listings.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn field_config_returns_yaml_attachment() {
    let base = start_server(Arc::new(MockLlm::replying("unused"))).await;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("{base}/api/field-config"))
        .json(&json!({
            "headland_width": 2.0,
            "bed_width": 1.5,
            "plants_count": 120,
            "plant_distance": 0.3,
            "output_format": "both",
            "beds": [{
                "plant_type": "maize", "plant_height": 1.2,
                "rows_count": 4, "row_distance": 0.4, "beds_count": 2
            }]
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    let disposition = response
        .headers()
        .get("content-disposition")
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(disposition.contains("cropcraft_config.yaml"));

    let yaml = response.text().await.unwrap();
    assert!(yaml.contains("field:"));
    assert!(yaml.contains("bed1:"));
    assert!(yaml.contains("- blender"));
    assert!(yaml.contains("- gazebo"));
}
