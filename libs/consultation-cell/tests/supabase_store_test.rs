use assert_matches::assert_matches;
use chrono::Utc;
use serde_json::json;
use uuid::Uuid;
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use consultation_cell::*;
use shared_models::auth::{Actor, Role};
use shared_utils::test_utils::{MockSupabaseResponses, TestConfig};

fn repository_for(server: &MockServer) -> SupabaseConsultationRepository {
    let config = TestConfig {
        supabase_url: server.uri(),
        ..TestConfig::default()
    };
    SupabaseConsultationRepository::new(&config.to_app_config())
}

fn claimed_record() -> (ConsultationRecord, StatusHistoryEntry) {
    let nurse = Actor::new(Uuid::new_v4(), Role::Nurse);
    let mut record = ConsultationRecord::new(Uuid::new_v4(), ConsultationKind::Urgent);
    record.status = ConsultationStatus::InNursingAttendance;
    record.assigned_nurse_id = Some(nurse.id);
    record.version = 4;

    let mut entry = StatusHistoryEntry::new(
        record.id,
        ConsultationStatus::AwaitingNurse,
        ConsultationStatus::InNursingAttendance,
        &nurse,
        Utc::now(),
    );
    entry.assigned_to = Some(nurse.id);
    (record, entry)
}

fn awaiting_nurse_v3() -> ExpectedState {
    ExpectedState {
        status: ConsultationStatus::AwaitingNurse,
        version: 3,
    }
}

#[tokio::test]
async fn commit_goes_through_transition_function() {
    let server = MockServer::start().await;
    let (record, entry) = claimed_record();

    Mock::given(method("POST"))
        .and(path("/rest/v1/rpc/commit_consultation_transition"))
        .and(body_partial_json(json!({
            "p_expected_status": "awaiting_nurse",
            "p_expected_version": 3,
            "p_record": { "id": record.id, "status": "in_nursing_attendance", "version": 4 },
            "p_entry": { "to_status": "in_nursing_attendance", "actor_role": "nurse" }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!(true)))
        .expect(1)
        .mount(&server)
        .await;

    let applied = repository_for(&server)
        .commit_transition(awaiting_nurse_v3(), &record, &entry)
        .await
        .unwrap();
    assert!(applied);
}

#[tokio::test]
async fn commit_reports_lost_race() {
    let server = MockServer::start().await;
    let (record, entry) = claimed_record();

    Mock::given(method("POST"))
        .and(path("/rest/v1/rpc/commit_consultation_transition"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!(false)))
        .mount(&server)
        .await;

    let applied = repository_for(&server)
        .commit_transition(awaiting_nurse_v3(), &record, &entry)
        .await
        .unwrap();
    assert!(!applied);
}

#[tokio::test]
async fn conditional_update_filters_on_status_and_version() {
    let server = MockServer::start().await;
    let (record, _) = claimed_record();

    Mock::given(method("PATCH"))
        .and(path("/rest/v1/consultations"))
        .and(query_param("id", format!("eq.{}", record.id)))
        .and(query_param("status", "eq.in_nursing_attendance"))
        .and(query_param("version", "eq.4"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let applied = repository_for(&server)
        .update_if_status(ExpectedState::of(&record), &record)
        .await
        .unwrap();
    assert!(!applied);
}

#[tokio::test]
async fn get_decodes_stored_rows() {
    let server = MockServer::start().await;
    let (record, _) = claimed_record();

    Mock::given(method("GET"))
        .and(path("/rest/v1/consultations"))
        .and(query_param("id", format!("eq.{}", record.id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([record])))
        .mount(&server)
        .await;

    let repository = repository_for(&server);
    let fetched = repository.get(record.id).await.unwrap();
    assert_eq!(fetched, Some(record));
}

#[tokio::test]
async fn outages_surface_as_retryable_storage_errors() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/consultation_status_history"))
        .respond_with(
            ResponseTemplate::new(503)
                .set_body_json(MockSupabaseResponses::error_response("unavailable", "503")),
        )
        .mount(&server)
        .await;

    let result = repository_for(&server).history(Uuid::new_v4()).await;
    assert_matches!(&result, Err(ConsultationError::StorageError(_)));
    assert!(result.unwrap_err().is_retryable());
}

#[tokio::test]
async fn open_listing_filters_terminal_statuses_server_side() {
    let server = MockServer::start().await;
    let (record, _) = claimed_record();

    Mock::given(method("GET"))
        .and(path("/rest/v1/consultations"))
        .and(query_param("status", "not.in.(finalized,cancelled)"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([record])))
        .expect(1)
        .mount(&server)
        .await;

    let listed = repository_for(&server).list(&ConsultationFilter::open()).await.unwrap();
    assert_eq!(listed, vec![record]);
}
