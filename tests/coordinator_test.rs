//! Coordinator integration tests against a mock registry
//!
//! Covers the remediation table end-to-end, the delete-then-recreate
//! dossier retarget, and the no-network-on-validation-failure guarantee.

use brosync::adapters::brostar::BrostarClient;
use brosync::config::{secret_string, BrostarConfig, Environment, PollConfig, RetryConfig};
use brosync::core::upload::UploadCoordinator;
use brosync::domain::{
    BroDomain, BroId, BrosyncError, QualityRegime, RegistrationType, RequestType, SourceDocument,
    UploadTask, UploadTaskMetadata,
};
use mockito::Matcher;
use serde_json::json;
use std::sync::Arc;

fn coordinator_for(server: &mockito::Server) -> UploadCoordinator {
    let config = BrostarConfig {
        base_url: Some(server.url()),
        public_api_base: format!("{}/public", server.url()),
        api_key: Some(secret_string("test-key".to_string())),
        poll: PollConfig {
            interval_ms: 10,
            ceiling_ms: 100,
        },
        retry: RetryConfig {
            max_retries: 2,
            initial_delay_ms: 1,
            max_delay_ms: 2,
            backoff_multiplier: 2.0,
        },
        ..Default::default()
    };
    UploadCoordinator::new(Arc::new(
        BrostarClient::new(&config, Environment::Staging).unwrap(),
    ))
}

async fn failed_list_mock(server: &mut mockito::Server, tasks: serde_json::Value) -> mockito::Mock {
    server
        .mock("GET", "/uploadtasks/")
        .match_query(Matcher::UrlEncoded("status".into(), "FAILED".into()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(json!({"next": null, "results": tasks}).to_string())
        .create_async()
        .await
}

#[tokio::test]
async fn test_already_delivered_task_is_marked_completed_only() {
    let mut server = mockito::Server::new_async().await;
    let _list = failed_list_mock(
        &mut server,
        json!([{
            "uuid": "t1",
            "status": "FAILED",
            "log": "Dit brondocument is al eerder via het bronhouderportaal aangeleverd aan de BRO.",
            "metadata": {"requestReference": "ref"},
            "sourcedocument_data": {},
        }]),
    )
    .await;

    let mark_delivered = server
        .mock("PATCH", "/uploadtasks/t1/")
        .match_body(Matcher::PartialJson(json!({
            "status": "COMPLETED",
            "progress": 100.0,
            "log": "",
        })))
        .with_status(200)
        .with_body("{}")
        .expect(1)
        .create_async()
        .await;

    let coordinator = coordinator_for(&server);
    let summary = coordinator.remediate_failed().await.unwrap();

    assert_eq!(summary.examined, 1);
    assert_eq!(summary.remediated, 1);
    assert_eq!(summary.skipped, 0);
    // Exactly one patch: no other remediation is attempted on this task.
    mark_delivered.assert_async().await;
}

#[tokio::test]
async fn test_event_before_latest_patches_metadata_then_request_type() {
    let mut server = mockito::Server::new_async().await;
    let _list = failed_list_mock(
        &mut server,
        json!([{
            "uuid": "t2",
            "status": "FAILED",
            "log": "De gebeurtenis mag niet voor de laatst geregistreerde gebeurtenis liggen.",
            "metadata": {"requestReference": "ref", "qualityRegime": "IMBRO"},
            "sourcedocument_data": {},
        }]),
    )
    .await;

    let metadata_patch = server
        .mock("PATCH", "/uploadtasks/t2/")
        .match_body(Matcher::PartialJson(json!({
            "metadata": {"correctionReason": "eigenCorrectie"},
        })))
        .with_status(200)
        .with_body("{}")
        .expect(1)
        .create_async()
        .await;

    let request_type_patch = server
        .mock("PATCH", "/uploadtasks/t2/")
        .match_body(Matcher::PartialJson(json!({"request_type": "insert"})))
        .with_status(200)
        .with_body("{}")
        .expect(1)
        .create_async()
        .await;

    let coordinator = coordinator_for(&server);
    let summary = coordinator.remediate_failed().await.unwrap();

    assert_eq!(summary.remediated, 1);
    metadata_patch.assert_async().await;
    request_type_patch.assert_async().await;
}

#[tokio::test]
async fn test_event_date_corrected_to_construction_date() {
    let mut server = mockito::Server::new_async().await;
    let _list = failed_list_mock(
        &mut server,
        json!([{
            "uuid": "t3",
            "status": "FAILED",
            "log": "De datum 2021-03-01 moet liggen na of op de inrichtingsdatum 2022-05-17.",
            "metadata": {},
            "sourcedocument_data": {"eventDate": "2021-03-01", "wellStability": "nee"},
        }]),
    )
    .await;

    let document_patch = server
        .mock("PATCH", "/uploadtasks/t3/")
        .match_body(Matcher::PartialJson(json!({
            "sourcedocument_data": {"eventDate": "2022-05-17", "wellStability": "nee"},
        })))
        .with_status(200)
        .with_body("{}")
        .expect(1)
        .create_async()
        .await;

    let coordinator = coordinator_for(&server);
    let summary = coordinator.remediate_failed().await.unwrap();

    assert_eq!(summary.remediated, 1);
    document_patch.assert_async().await;
}

#[tokio::test]
async fn test_unknown_log_is_left_for_manual_handling() {
    let mut server = mockito::Server::new_async().await;
    let _list = failed_list_mock(
        &mut server,
        json!([{
            "uuid": "t4",
            "status": "FAILED",
            "log": "Some error nobody has seen before",
            "metadata": {},
            "sourcedocument_data": {},
        }]),
    )
    .await;

    let no_patch = server
        .mock("PATCH", "/uploadtasks/t4/")
        .expect(0)
        .create_async()
        .await;

    let coordinator = coordinator_for(&server);
    let summary = coordinator.remediate_failed().await.unwrap();

    assert_eq!(summary.examined, 1);
    assert_eq!(summary.remediated, 0);
    assert_eq!(summary.skipped, 1);
    no_patch.assert_async().await;
}

#[tokio::test]
async fn test_invalid_task_makes_no_http_request() {
    let mut server = mockito::Server::new_async().await;
    let no_post = server
        .mock("POST", "/uploadtasks/")
        .expect(0)
        .create_async()
        .await;

    // A replace without a correction reason violates the metadata
    // invariant: validation must fail before any request goes out.
    let task = UploadTask {
        bro_domain: BroDomain::Gmw,
        project_number: "1".to_string(),
        registration_type: RegistrationType::GmwConstruction,
        request_type: RequestType::Replace,
        metadata: UploadTaskMetadata {
            request_reference: "ref".to_string(),
            delivery_accountable_party: Some("27296013".to_string()),
            quality_regime: QualityRegime::Imbro,
            bro_id: Some("GMW000000042".to_string()),
            correction_reason: None,
        },
        sourcedocument_data: SourceDocument::Raw(json!({})),
    };

    let coordinator = coordinator_for(&server);
    let err = coordinator.submit(&task).await.unwrap_err();
    assert!(matches!(err, BrosyncError::Validation(_)));
    no_post.assert_async().await;
}

fn retarget_detail() -> serde_json::Value {
    json!({
        "uuid": "old1",
        "created_at": "2024-01-01T00:00:00Z",
        "updated_at": "2024-01-02T00:00:00Z",
        "data_owner": "org",
        "bro_domain": "GLD",
        "project_number": "5871",
        "registration_type": "GLD_Addition",
        "request_type": "registration",
        "status": "COMPLETED",
        "progress": 100.0,
        "log": "done",
        "bro_id": "GLD000000001",
        "bro_delivery_url": "https://example/delivery/1",
        "metadata": {
            "requestReference": "GLD000000001: IMBRO reguliereMeting",
            "qualityRegime": "IMBRO",
            "broId": "GLD000000001",
        },
        "sourcedocument_data": {"observationType": "reguliereMeting"},
    })
}

async fn mock_task_list(server: &mut mockito::Server, bro_id: &str) -> mockito::Mock {
    server
        .mock("GET", "/uploadtasks/")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("registration_type".into(), "GLD_Addition".into()),
            Matcher::UrlEncoded("bro_id".into(), bro_id.into()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(json!({"next": null, "results": [{"uuid": "old1"}]}).to_string())
        .create_async()
        .await
}

#[tokio::test]
async fn test_retarget_deletes_then_recreates() {
    let mut server = mockito::Server::new_async().await;
    let _list = mock_task_list(&mut server, "GLD000000001").await;

    let _detail = server
        .mock("GET", "/uploadtasks/old1")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(retarget_detail().to_string())
        .create_async()
        .await;

    // Phase 1: the delete submission. Server-managed fields must be gone,
    // mutable fields cleared, correction reason set.
    let delete_post = server
        .mock("POST", "/uploadtasks/")
        .match_body(Matcher::PartialJson(json!({
            "request_type": "delete",
            "status": "PENDING",
            "log": "",
            "progress": 0,
            "bro_id": "",
            "metadata": {"correctionReason": "eigenCorrectie"},
        })))
        .with_status(201)
        .with_header("content-type", "application/json")
        .with_body(json!({"uuid": "del1", "status": "PENDING"}).to_string())
        .expect(1)
        .create_async()
        .await;

    let _delete_poll = server
        .mock("GET", "/uploadtasks/del1/")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(json!({"uuid": "del1", "status": "COMPLETED"}).to_string())
        .create_async()
        .await;

    // Phase 2: the recreate submission against the target dossier.
    let recreate_post = server
        .mock("POST", "/uploadtasks/")
        .match_body(Matcher::PartialJson(json!({
            "request_type": "registration",
            "metadata": {
                "broId": "GLD000000002",
                "requestReference": "GLD000000002: IMBRO reguliereMeting",
            },
        })))
        .with_status(201)
        .with_header("content-type", "application/json")
        .with_body(json!({"uuid": "new1", "status": "PENDING"}).to_string())
        .expect(1)
        .create_async()
        .await;

    let _recreate_poll = server
        .mock("GET", "/uploadtasks/new1/")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(json!({"uuid": "new1", "status": "COMPLETED"}).to_string())
        .create_async()
        .await;

    let coordinator = coordinator_for(&server);
    let migrated = coordinator
        .retarget_dossier(
            &BroId::new("GLD000000001").unwrap(),
            &BroId::new("GLD000000002").unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(migrated, 1);
    delete_post.assert_async().await;
    recreate_post.assert_async().await;
}

#[tokio::test]
async fn test_retarget_delete_failure_skips_recreate() {
    let mut server = mockito::Server::new_async().await;
    let _list = mock_task_list(&mut server, "GLD000000001").await;

    let _detail = server
        .mock("GET", "/uploadtasks/old1")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(retarget_detail().to_string())
        .create_async()
        .await;

    let _delete_post = server
        .mock("POST", "/uploadtasks/")
        .match_body(Matcher::PartialJson(json!({"request_type": "delete"})))
        .with_status(201)
        .with_header("content-type", "application/json")
        .with_body(json!({"uuid": "del1", "status": "PENDING"}).to_string())
        .create_async()
        .await;

    // The delete phase never completes within the ceiling.
    let _delete_poll = server
        .mock("GET", "/uploadtasks/del1/")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(json!({"uuid": "del1", "status": "FAILED", "log": "boom"}).to_string())
        .create_async()
        .await;

    let recreate_post = server
        .mock("POST", "/uploadtasks/")
        .match_body(Matcher::PartialJson(json!({"request_type": "registration"})))
        .expect(0)
        .create_async()
        .await;

    let coordinator = coordinator_for(&server);
    let err = coordinator
        .retarget_dossier(
            &BroId::new("GLD000000001").unwrap(),
            &BroId::new("GLD000000002").unwrap(),
        )
        .await
        .unwrap_err();

    assert!(err.to_string().contains("delete phase"), "{err}");
    recreate_post.assert_async().await;
}

#[tokio::test]
async fn test_bulk_retarget_skips_empty_dossiers() {
    let mut server = mockito::Server::new_async().await;

    // The public observations summary reports nothing registered.
    let _summary = server
        .mock("GET", "/public/objects/GLD000000001/observationsSummary")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body("[]")
        .create_async()
        .await;

    let no_list = server
        .mock("GET", "/uploadtasks/")
        .expect(0)
        .create_async()
        .await;

    let coordinator = coordinator_for(&server);
    let pairs = vec![(
        BroId::new("GLD000000001").unwrap(),
        BroId::new("GLD000000002").unwrap(),
    )];
    let summary = coordinator.retarget_dossiers(&pairs, true).await.unwrap();

    assert_eq!(summary.total, 1);
    assert_eq!(summary.skipped, 1);
    assert_eq!(summary.migrated, 0);
    assert_eq!(summary.delete_ids, vec!["GLD000000001".to_string()]);
    no_list.assert_async().await;
}

#[tokio::test]
async fn test_delete_stuck_tasks() {
    let mut server = mockito::Server::new_async().await;
    let _list = server
        .mock("GET", "/uploadtasks/")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("status".into(), "PROCESSING".into()),
            Matcher::UrlEncoded("log".into(), "XML is not valid".into()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({"next": null, "results": [{"uuid": "s1"}, {"uuid": "s2"}]}).to_string(),
        )
        .create_async()
        .await;

    let delete_s1 = server
        .mock("DELETE", "/uploadtasks/s1")
        .with_status(204)
        .expect(1)
        .create_async()
        .await;
    let delete_s2 = server
        .mock("DELETE", "/uploadtasks/s2")
        .with_status(204)
        .expect(1)
        .create_async()
        .await;

    let coordinator = coordinator_for(&server);
    let deleted = coordinator.delete_stuck_tasks("XML is not valid").await.unwrap();

    assert_eq!(deleted, 2);
    delete_s1.assert_async().await;
    delete_s2.assert_async().await;
}

#[tokio::test]
async fn test_total_events_delivered() {
    let mut server = mockito::Server::new_async().await;
    let _list = server
        .mock("GET", "/uploadtasks/")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("status".into(), "COMPLETED".into()),
            Matcher::UrlEncoded("registration_type".into(), "GLD_Addition".into()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "next": null,
                "results": [
                    {"uuid": "a", "bro_id": "GLD000000001",
                     "sourcedocument_data": {"timeValuePairsCount": 7000}},
                    {"uuid": "b", "bro_id": "GLD000000001",
                     "sourcedocument_data": {"timeValuePairsCount": 300}},
                    {"uuid": "c", "bro_id": "GLD000000002",
                     "sourcedocument_data": {"timeValuePairsCount": 12}},
                ],
            })
            .to_string(),
        )
        .create_async()
        .await;

    let coordinator = coordinator_for(&server);
    let report = coordinator.total_events_delivered().await.unwrap();

    assert_eq!(report.total_events, 7312);
    assert_eq!(report.distinct_dossiers, 2);
}
