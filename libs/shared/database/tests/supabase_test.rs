use serde_json::{json, Value};
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;

fn config_for(server: &MockServer) -> AppConfig {
    AppConfig {
        supabase_url: server.uri(),
        supabase_anon_key: "anon".to_string(),
        supabase_jwt_secret: "secret".to_string(),
        supabase_service_role_key: "service".to_string(),
        cloudflare_realtime_app_id: String::new(),
        cloudflare_realtime_api_token: String::new(),
        cloudflare_realtime_base_url: String::new(),
        video_join_base_url: String::new(),
        upstream_timeout_ms: 100,
        escalation_interval_seconds: 1,
        server_port: 0,
    }
}

#[tokio::test]
async fn select_sends_service_key_and_query() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/consultations"))
        .and(query_param("status", "eq.triage"))
        .and(header("apikey", "anon"))
        .and(header("authorization", "Bearer service"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{ "id": 1 }])))
        .mount(&server)
        .await;

    let client = SupabaseClient::new(&config_for(&server));
    let rows: Vec<Value> = client.select("consultations", "status=eq.triage").await.unwrap();

    assert_eq!(rows.len(), 1);
}

#[tokio::test]
async fn rpc_surfaces_server_errors() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/rest/v1/rpc/commit_consultation_transition"))
        .respond_with(ResponseTemplate::new(500).set_body_string("connection reset"))
        .mount(&server)
        .await;

    let client = SupabaseClient::new(&config_for(&server));
    let result: anyhow::Result<bool> = client
        .rpc("commit_consultation_transition", json!({}))
        .await;

    let message = result.unwrap_err().to_string();
    assert!(message.contains("500"));
}
