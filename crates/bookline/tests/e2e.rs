// SPDX-FileCopyrightText: 2026 Bookline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end integration tests for the complete Bookline pipeline.
//!
//! Each test creates an isolated InboxHarness with a temp SQLite store and
//! drives the real gateway router over it. Tests are independent and
//! order-insensitive.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use tower::ServiceExt;

use bookline_core::types::{BookingStage, SenderRole};
use bookline_storage::NewConversation;
use bookline_test_utils::{harness::TEST_BEARER_TOKEN, InboxHarness};

fn authed(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header("authorization", format!("Bearer {TEST_BEARER_TOKEN}"))
        .body(Body::empty())
        .unwrap()
}

fn post_json(uri: &str, body: String) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("authorization", format!("Bearer {TEST_BEARER_TOKEN}"))
        .header("content-type", "application/json")
        .body(Body::from(body))
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

// ---- Scenario 1: stuck conversation rescued by a manual booking link ----

#[tokio::test]
async fn awaiting_confirm_becomes_confirmed_after_link() {
    let harness = InboxHarness::new().await.unwrap();
    let id = harness
        .seed_in_progress("+15550001111", BookingStage::AwaitingConfirm, "2026-03-01T10:00:00.000Z")
        .await
        .unwrap();

    // The inbox classifies the conversation as in progress.
    let response = harness.router().oneshot(authed("/v1/inbox")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["total_count"], 1);
    assert_eq!(json["rows"][0]["status"], "in_progress");
    assert_eq!(json["rows"][0]["status_label"], "In progress");

    // Operator links a manually created booking.
    let response = harness
        .router()
        .oneshot(post_json(
            &format!("/v1/conversations/{id}/booking"),
            r#"{"booking_id": 501, "calendar_event_id": "evt_abc"}"#.to_string(),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["newly_linked"], true);

    // Derivation now reports success, stale stage notwithstanding.
    let response = harness
        .router()
        .oneshot(authed(&format!("/v1/conversations/{id}")))
        .await
        .unwrap();
    let json = body_json(response).await;
    assert_eq!(json["conversation"]["booking_id"], 501);
    assert_eq!(json["conversation"]["calendar_event_id"], "evt_abc");

    let response = harness
        .router()
        .oneshot(authed("/v1/inbox?status=confirmed"))
        .await
        .unwrap();
    let json = body_json(response).await;
    assert_eq!(json["total_count"], 1);
    assert_eq!(json["rows"][0]["conversation"]["id"], id);

    // And nothing is left in progress.
    let response = harness
        .router()
        .oneshot(authed("/v1/inbox?status=in_progress"))
        .await
        .unwrap();
    let json = body_json(response).await;
    assert_eq!(json["total_count"], 0);
}

// ---- Scenario 2: escalated conversation surfaces to the operator ----

#[tokio::test]
async fn needs_human_row_is_included_and_excluded_by_filters() {
    let harness = InboxHarness::new().await.unwrap();
    let id = harness
        .seed_conversation(&NewConversation {
            phone: Some("+15550002222".into()),
            needs_human: true,
            needs_human_reason: Some("customer requested refund".into()),
            last_message_at: Some("2026-03-01T11:00:00.000Z".into()),
            ..NewConversation::default()
        })
        .await
        .unwrap();

    let response = harness
        .router()
        .oneshot(authed("/v1/inbox?needs_human=true"))
        .await
        .unwrap();
    let json = body_json(response).await;
    assert_eq!(json["total_count"], 1);
    assert_eq!(json["rows"][0]["conversation"]["id"], id);
    assert_eq!(json["rows"][0]["status"], "needs_human");
    assert_eq!(
        json["rows"][0]["conversation"]["needs_human_reason"],
        "customer requested refund"
    );

    let response = harness
        .router()
        .oneshot(authed("/v1/inbox?status=confirmed"))
        .await
        .unwrap();
    let json = body_json(response).await;
    assert_eq!(json["total_count"], 0);
}

// ---- Scenario 3: detail projection and NotFound ----

#[tokio::test]
async fn detail_assembles_thread_draft_and_customer() {
    let harness = InboxHarness::new().await.unwrap();

    let customer_id = harness
        .seed_customer(Some("Dana Reyes"), Some("+15550003333"), Some("dana@example.com"))
        .await
        .unwrap();
    let id = harness
        .seed_conversation(&NewConversation {
            phone: Some("+15550003333".into()),
            customer_id: Some(customer_id),
            stage: Some(BookingStage::ChoosingSlot),
            ..NewConversation::default()
        })
        .await
        .unwrap();
    harness
        .seed_message(id, SenderRole::Customer, "need my gutters cleaned", "2026-03-01T09:00:00.000Z")
        .await
        .unwrap();
    harness
        .seed_message(id, SenderRole::Business, "we have friday 2pm open", "2026-03-01T09:00:10.000Z")
        .await
        .unwrap();
    harness
        .seed_draft(id, Some("gutter cleaning"), Some("12 Elm St"), Some("2026-03-06T14:00:00.000Z"))
        .await
        .unwrap();

    let response = harness
        .router()
        .oneshot(authed(&format!("/v1/conversations/{id}")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;

    assert_eq!(json["messages"][0]["sender_role"], "customer");
    assert_eq!(json["messages"][0]["body"], "need my gutters cleaned");
    assert_eq!(json["messages"][1]["sender_role"], "business");
    assert_eq!(json["booking_draft"]["address"], "12 Elm St");
    assert_eq!(json["customer"]["name"], "Dana Reyes");
    assert_eq!(json["customer"]["email"], "dana@example.com");
}

#[tokio::test]
async fn missing_conversation_is_404_not_empty_success() {
    let harness = InboxHarness::new().await.unwrap();

    let response = harness
        .router()
        .oneshot(authed("/v1/conversations/4242"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = body_json(response).await;
    assert_eq!(json["code"], "not_found");
    assert!(json["error"].as_str().unwrap().contains("4242"));
}

// ---- Scenario 4: stable pagination over the wire ----

#[tokio::test]
async fn paginating_the_inbox_covers_every_row_exactly_once() {
    let harness = InboxHarness::new().await.unwrap();

    // Five rows share one timestamp to force the id tie-break.
    for i in 0..5 {
        harness
            .seed_in_progress(
                &format!("+1555010000{i}"),
                BookingStage::SelectingService,
                "2026-03-02T09:00:00.000Z",
            )
            .await
            .unwrap();
    }
    for i in 0..3 {
        harness
            .seed_in_progress(
                &format!("+1555020000{i}"),
                BookingStage::SelectingService,
                "2026-03-02T10:00:00.000Z",
            )
            .await
            .unwrap();
    }

    let mut collected = Vec::new();
    for page in 1..=3 {
        let response = harness
            .router()
            .oneshot(authed(&format!("/v1/inbox?page={page}&limit=3")))
            .await
            .unwrap();
        let json = body_json(response).await;
        assert_eq!(json["total_count"], 8);
        assert_eq!(json["total_pages"], 3);
        for row in json["rows"].as_array().unwrap() {
            collected.push(row["conversation"]["id"].as_i64().unwrap());
        }
    }

    assert_eq!(collected.len(), 8, "no gaps");
    let mut deduped = collected.clone();
    deduped.sort_unstable();
    deduped.dedup();
    assert_eq!(deduped.len(), 8, "no duplicates");

    // Most-recent first: every 10:00 row precedes every 09:00 row.
    let full = harness.router().oneshot(authed("/v1/inbox")).await.unwrap();
    let json = body_json(full).await;
    let phones: Vec<String> = json["rows"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["conversation"]["phone"].as_str().unwrap().to_string())
        .collect();
    assert!(phones[..3].iter().all(|p| p.starts_with("+15550200")));
    assert!(phones[3..].iter().all(|p| p.starts_with("+15550100")));
}

// ---- Scenario 5: malformed filters are rejected loudly ----

#[tokio::test]
async fn inverted_date_range_is_rejected_over_the_wire() {
    let harness = InboxHarness::new().await.unwrap();
    harness
        .seed_in_progress("+15550001111", BookingStage::ChoosingSlot, "2026-03-01T10:00:00.000Z")
        .await
        .unwrap();

    let response = harness
        .router()
        .oneshot(authed(
            "/v1/inbox?date_from=2026-03-02T00:00:00Z&date_to=2026-03-01T00:00:00Z",
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "validation");
}

// ---- Scenario 6: idempotent link, explicit conflict ----

#[tokio::test]
async fn relink_is_noop_and_conflicting_link_is_409() {
    let harness = InboxHarness::new().await.unwrap();
    let id = harness
        .seed_in_progress("+15550001111", BookingStage::CreatingBooking, "2026-03-01T10:00:00.000Z")
        .await
        .unwrap();
    let uri = format!("/v1/conversations/{id}/booking");

    let response = harness
        .router()
        .oneshot(post_json(&uri, r#"{"booking_id": 501}"#.to_string()))
        .await
        .unwrap();
    assert_eq!(body_json(response).await["newly_linked"], true);

    let response = harness
        .router()
        .oneshot(post_json(&uri, r#"{"booking_id": 501}"#.to_string()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["newly_linked"], false);

    let response = harness
        .router()
        .oneshot(post_json(&uri, r#"{"booking_id": 777}"#.to_string()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);

    // Linking a booking to a conversation that does not exist is a 404.
    let response = harness
        .router()
        .oneshot(post_json(
            "/v1/conversations/31337/booking",
            r#"{"booking_id": 501}"#.to_string(),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ---- Scenario 7: export bundle ----

#[tokio::test]
async fn export_bundle_reproduces_the_detail_projection() {
    let harness = InboxHarness::new().await.unwrap();
    let id = harness
        .seed_in_progress("+15550001111", BookingStage::OfferingUpsells, "2026-03-01T10:00:00.000Z")
        .await
        .unwrap();
    harness
        .seed_message(id, SenderRole::Customer, "sure, add the window wash", "2026-03-01T10:00:00.000Z")
        .await
        .unwrap();

    let detail = harness
        .router()
        .oneshot(authed(&format!("/v1/conversations/{id}")))
        .await
        .unwrap();
    let detail_json = body_json(detail).await;

    let export = harness
        .router()
        .oneshot(authed(&format!("/v1/conversations/{id}/export")))
        .await
        .unwrap();
    assert_eq!(export.status(), StatusCode::OK);
    let export_json = body_json(export).await;

    assert_eq!(export_json["detail"], detail_json);
    assert_eq!(export_json["conversation_id"], id);
}

// ---- Auth is enforced end to end ----

#[tokio::test]
async fn unauthenticated_requests_are_rejected() {
    let harness = InboxHarness::new().await.unwrap();

    let response = harness
        .router()
        .oneshot(Request::builder().uri("/v1/inbox").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // Health stays public.
    let response = harness
        .router()
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}
