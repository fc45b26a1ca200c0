// SPDX-FileCopyrightText: 2026 Bookline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP request handlers for the gateway REST API.
//!
//! Handles GET /v1/inbox, GET /v1/conversations/{id},
//! POST /v1/conversations/{id}/booking, GET /v1/conversations/{id}/export,
//! and the public GET /health.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};

use bookline_core::types::ConversationDetail;
use bookline_core::{BookingStage, BookingStatus, InboxEntry, InboxFilter};

use crate::error::ApiError;
use crate::server::GatewayState;

/// Query parameters for GET /v1/inbox. All optional, AND-combined.
#[derive(Debug, Default, Deserialize)]
pub struct InboxParams {
    /// Derived-status filter.
    #[serde(default)]
    pub status: Option<BookingStatus>,
    #[serde(default)]
    pub stage: Option<BookingStage>,
    #[serde(default)]
    pub needs_human: Option<bool>,
    /// Substring match on the phone number.
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub booking_id: Option<i64>,
    #[serde(default)]
    pub date_from: Option<String>,
    #[serde(default)]
    pub date_to: Option<String>,
    /// 1-indexed page, default 1.
    #[serde(default)]
    pub page: Option<u32>,
    /// Page size, defaulted and capped by config.
    #[serde(default)]
    pub limit: Option<u32>,
}

/// One inbox row with display metadata resolved from the status registry.
#[derive(Debug, Serialize)]
pub struct InboxRow {
    #[serde(flatten)]
    pub entry: InboxEntry,
    pub status_label: &'static str,
    pub status_style: &'static str,
}

impl From<InboxEntry> for InboxRow {
    fn from(entry: InboxEntry) -> Self {
        let meta = entry.status.meta();
        InboxRow {
            entry,
            status_label: meta.label,
            status_style: meta.style_class,
        }
    }
}

/// Response body for GET /v1/inbox.
#[derive(Debug, Serialize)]
pub struct InboxResponse {
    pub rows: Vec<InboxRow>,
    /// Size of the filtered set before pagination.
    pub total_count: u64,
    pub total_pages: u64,
    pub page: u32,
    pub limit: u32,
}

/// Request body for POST /v1/conversations/{id}/booking.
#[derive(Debug, Deserialize)]
pub struct LinkBookingRequest {
    pub booking_id: i64,
    #[serde(default)]
    pub calendar_event_id: Option<String>,
}

/// Response body for POST /v1/conversations/{id}/booking.
#[derive(Debug, Serialize)]
pub struct LinkBookingResponse {
    pub conversation_id: i64,
    pub booking_id: i64,
    /// `false` when the identical link already existed (idempotent no-op).
    pub newly_linked: bool,
}

/// Response body for GET /v1/conversations/{id}/export.
///
/// The `detail` field reproduces the detail projection losslessly; the
/// envelope only adds provenance for offline troubleshooting.
#[derive(Debug, Serialize)]
pub struct ExportBundle {
    pub conversation_id: i64,
    pub exported_at: String,
    pub detail: ConversationDetail,
}

/// Response body for GET /health.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_secs: u64,
}

/// GET /health (public)
///
/// Liveness only -- does not touch the store, so monitoring keeps working
/// while the database is down.
pub async fn get_health(State(state): State<GatewayState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: state.started_at.elapsed().as_secs(),
    })
}

/// GET /v1/inbox
///
/// Filtered, paginated inbox of conversations annotated with derived
/// status. Empty result sets are a 200 with zero rows; a store failure is
/// a 503.
pub async fn get_inbox(
    State(state): State<GatewayState>,
    Query(params): Query<InboxParams>,
) -> Result<Json<InboxResponse>, ApiError> {
    let filter = InboxFilter {
        status: params.status,
        stage: params.stage,
        needs_human: params.needs_human,
        phone: params.phone,
        booking_id: params.booking_id,
        date_from: params.date_from,
        date_to: params.date_to,
    };
    let page = params.page.unwrap_or(1);
    let limit = params
        .limit
        .map(|l| l.min(state.page_limits.max_limit))
        .unwrap_or(state.page_limits.default_limit);

    let result = state.store.query_inbox(&filter, page, limit).await?;

    let total_pages = result.total_count.div_ceil(u64::from(limit.max(1)));
    Ok(Json(InboxResponse {
        rows: result.rows.into_iter().map(InboxRow::from).collect(),
        total_count: result.total_count,
        total_pages,
        page,
        limit,
    }))
}

/// GET /v1/conversations/{id}
///
/// Consolidated detail projection. 404 when the conversation does not
/// exist; an existing conversation with zero messages is a 200.
pub async fn get_conversation_detail(
    State(state): State<GatewayState>,
    Path(id): Path<i64>,
) -> Result<Json<ConversationDetail>, ApiError> {
    let detail = state.store.conversation_detail(id).await?;
    Ok(Json(detail))
}

/// POST /v1/conversations/{id}/booking
///
/// Link a manually created booking to a conversation. Idempotent on the
/// same booking id; 409 when the conversation is already linked to a
/// different booking; 404 when it does not exist.
pub async fn post_link_booking(
    State(state): State<GatewayState>,
    Path(id): Path<i64>,
    Json(body): Json<LinkBookingRequest>,
) -> Result<Json<LinkBookingResponse>, ApiError> {
    let newly_linked = state
        .store
        .link_booking(id, body.booking_id, body.calendar_event_id)
        .await?;

    tracing::info!(
        conversation_id = id,
        booking_id = body.booking_id,
        newly_linked,
        "booking linked"
    );

    Ok(Json(LinkBookingResponse {
        conversation_id: id,
        booking_id: body.booking_id,
        newly_linked,
    }))
}

/// GET /v1/conversations/{id}/export
///
/// Verbatim dump of one conversation's detail projection for offline
/// troubleshooting.
pub async fn get_export(
    State(state): State<GatewayState>,
    Path(id): Path<i64>,
) -> Result<Json<ExportBundle>, ApiError> {
    let detail = state.store.conversation_detail(id).await?;
    Ok(Json(ExportBundle {
        conversation_id: id,
        exported_at: chrono::Utc::now().to_rfc3339(),
        detail,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};
    use std::time::Instant;

    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    use bookline_core::types::ConversationRecord;
    use bookline_core::{derive_booking_status, BooklineError, InboxPage, InboxStore};

    use crate::auth::AuthConfig;
    use crate::server::{build_router, GatewayState, PageLimits};

    /// In-memory store with the contract semantics the handlers rely on.
    struct MockStore {
        rows: Mutex<Vec<ConversationRecord>>,
        fail: bool,
    }

    impl MockStore {
        fn new(rows: Vec<ConversationRecord>) -> Self {
            Self {
                rows: Mutex::new(rows),
                fail: false,
            }
        }

        fn failing() -> Self {
            Self {
                rows: Mutex::new(Vec::new()),
                fail: true,
            }
        }

        fn unavailable() -> BooklineError {
            BooklineError::Storage {
                source: "database unreachable".into(),
            }
        }
    }

    #[async_trait]
    impl InboxStore for MockStore {
        async fn query_inbox(
            &self,
            filter: &InboxFilter,
            page: u32,
            limit: u32,
        ) -> Result<InboxPage, BooklineError> {
            if self.fail {
                return Err(Self::unavailable());
            }
            filter.validate()?;
            if page == 0 || limit == 0 {
                return Err(BooklineError::Validation("page and limit must be >= 1".into()));
            }

            let rows = self.rows.lock().unwrap();
            let mut matching: Vec<ConversationRecord> = rows
                .iter()
                .filter(|r| {
                    filter
                        .status
                        .is_none_or(|s| derive_booking_status(r) == s)
                        && filter.needs_human.is_none_or(|n| r.needs_human == n)
                })
                .cloned()
                .collect();
            matching.sort_by(|a, b| {
                b.last_message_at
                    .cmp(&a.last_message_at)
                    .then(b.id.cmp(&a.id))
            });

            let total_count = matching.len() as u64;
            let start = ((page - 1) * limit) as usize;
            let entries = matching
                .into_iter()
                .skip(start)
                .take(limit as usize)
                .map(|conversation| InboxEntry {
                    status: derive_booking_status(&conversation),
                    conversation,
                })
                .collect();

            Ok(InboxPage {
                rows: entries,
                total_count,
            })
        }

        async fn conversation_detail(
            &self,
            id: i64,
        ) -> Result<ConversationDetail, BooklineError> {
            if self.fail {
                return Err(Self::unavailable());
            }
            let rows = self.rows.lock().unwrap();
            let conversation = rows
                .iter()
                .find(|r| r.id == id)
                .cloned()
                .ok_or_else(|| BooklineError::conversation_not_found(id))?;
            Ok(ConversationDetail {
                conversation,
                messages: Vec::new(),
                booking_draft: None,
                customer: None,
            })
        }

        async fn link_booking(
            &self,
            id: i64,
            booking_id: i64,
            calendar_event_id: Option<String>,
        ) -> Result<bool, BooklineError> {
            if self.fail {
                return Err(Self::unavailable());
            }
            let mut rows = self.rows.lock().unwrap();
            let record = rows
                .iter_mut()
                .find(|r| r.id == id)
                .ok_or_else(|| BooklineError::conversation_not_found(id))?;
            match record.booking_id {
                Some(current) if current == booking_id => Ok(false),
                Some(current) => Err(BooklineError::Conflict {
                    message: format!("already linked to booking {current}"),
                }),
                None => {
                    record.booking_id = Some(booking_id);
                    record.calendar_event_id = calendar_event_id;
                    Ok(true)
                }
            }
        }

        async fn health_check(&self) -> Result<(), BooklineError> {
            if self.fail {
                return Err(Self::unavailable());
            }
            Ok(())
        }
    }

    fn record(id: i64, last_message_at: &str) -> ConversationRecord {
        ConversationRecord {
            id,
            phone: Some(format!("+1555000{id:04}")),
            last_message_at: Some(last_message_at.to_string()),
            created_at: "2026-03-01T00:00:00.000Z".into(),
            updated_at: "2026-03-01T00:00:00.000Z".into(),
            ..ConversationRecord::default()
        }
    }

    fn router_with(store: MockStore) -> axum::Router {
        build_router(GatewayState {
            store: Arc::new(store),
            auth: AuthConfig {
                bearer_token: Some("test-token".to_string()),
            },
            page_limits: PageLimits {
                default_limit: 25,
                max_limit: 100,
            },
            started_at: Instant::now(),
        })
    }

    fn authed(uri: &str) -> Request<Body> {
        Request::builder()
            .uri(uri)
            .header("authorization", "Bearer test-token")
            .body(Body::empty())
            .unwrap()
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn health_is_public() {
        let app = router_with(MockStore::new(vec![]));
        let response = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["status"], "ok");
    }

    #[tokio::test]
    async fn v1_routes_reject_missing_and_wrong_tokens() {
        let app = router_with(MockStore::new(vec![]));
        let response = app
            .clone()
            .oneshot(Request::builder().uri("/v1/inbox").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/v1/inbox")
                    .header("authorization", "Bearer wrong")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn no_token_configured_fails_closed() {
        let app = build_router(GatewayState {
            store: Arc::new(MockStore::new(vec![])),
            auth: AuthConfig { bearer_token: None },
            page_limits: PageLimits {
                default_limit: 25,
                max_limit: 100,
            },
            started_at: Instant::now(),
        });
        let response = app.oneshot(authed("/v1/inbox")).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn inbox_rows_carry_registry_metadata() {
        let mut needs_human = record(1, "2026-03-01T10:00:00.000Z");
        needs_human.needs_human = true;
        let app = router_with(MockStore::new(vec![needs_human]));

        let response = app.oneshot(authed("/v1/inbox")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;

        assert_eq!(json["total_count"], 1);
        assert_eq!(json["total_pages"], 1);
        assert_eq!(json["page"], 1);
        assert_eq!(json["limit"], 25);
        let row = &json["rows"][0];
        assert_eq!(row["status"], "needs_human");
        assert_eq!(row["status_label"], "Needs human");
        assert_eq!(row["status_style"], "status-needs-human");
        assert_eq!(row["conversation"]["id"], 1);
    }

    #[tokio::test]
    async fn inbox_status_filter_and_pagination_params() {
        let mut confirmed = record(1, "2026-03-01T10:00:00.000Z");
        confirmed.booking_id = Some(900);
        let in_progress = {
            let mut r = record(2, "2026-03-01T11:00:00.000Z");
            r.stage = Some(BookingStage::ChoosingSlot);
            r
        };
        let app = router_with(MockStore::new(vec![confirmed, in_progress]));

        let response = app
            .clone()
            .oneshot(authed("/v1/inbox?status=confirmed"))
            .await
            .unwrap();
        let json = body_json(response).await;
        assert_eq!(json["total_count"], 1);
        assert_eq!(json["rows"][0]["conversation"]["id"], 1);

        // limit above the configured max is capped, not an error.
        let response = app
            .oneshot(authed("/v1/inbox?limit=10000"))
            .await
            .unwrap();
        let json = body_json(response).await;
        assert_eq!(json["limit"], 100);
    }

    #[tokio::test]
    async fn inbox_inverted_date_range_is_400() {
        let app = router_with(MockStore::new(vec![]));
        let response = app
            .oneshot(authed(
                "/v1/inbox?date_from=2026-03-02T00:00:00Z&date_to=2026-03-01T00:00:00Z",
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert_eq!(json["code"], "validation");
    }

    #[tokio::test]
    async fn detail_404_is_distinct_from_empty() {
        let app = router_with(MockStore::new(vec![record(1, "2026-03-01T10:00:00.000Z")]));

        let response = app.clone().oneshot(authed("/v1/conversations/1")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["conversation"]["id"], 1);
        assert_eq!(json["messages"], serde_json::json!([]));

        let response = app.oneshot(authed("/v1/conversations/99")).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let json = body_json(response).await;
        assert_eq!(json["code"], "not_found");
    }

    #[tokio::test]
    async fn link_booking_round_trip_and_conflict() {
        let app = router_with(MockStore::new(vec![record(1, "2026-03-01T10:00:00.000Z")]));

        let link = |booking_id: i64| {
            Request::builder()
                .method("POST")
                .uri("/v1/conversations/1/booking")
                .header("authorization", "Bearer test-token")
                .header("content-type", "application/json")
                .body(Body::from(format!(
                    r#"{{"booking_id": {booking_id}, "calendar_event_id": "evt_abc"}}"#
                )))
                .unwrap()
        };

        let response = app.clone().oneshot(link(501)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["newly_linked"], true);

        // Idempotent repeat.
        let response = app.clone().oneshot(link(501)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["newly_linked"], false);

        // Different booking id conflicts.
        let response = app.clone().oneshot(link(502)).await.unwrap();
        assert_eq!(response.status(), StatusCode::CONFLICT);
        let json = body_json(response).await;
        assert_eq!(json["code"], "conflict");

        // The inbox now shows the conversation as confirmed.
        let response = app.oneshot(authed("/v1/inbox?status=confirmed")).await.unwrap();
        let json = body_json(response).await;
        assert_eq!(json["total_count"], 1);
    }

    #[tokio::test]
    async fn export_reproduces_detail_losslessly() {
        let app = router_with(MockStore::new(vec![record(1, "2026-03-01T10:00:00.000Z")]));

        let detail = app.clone().oneshot(authed("/v1/conversations/1")).await.unwrap();
        let detail_json = body_json(detail).await;

        let export = app.oneshot(authed("/v1/conversations/1/export")).await.unwrap();
        assert_eq!(export.status(), StatusCode::OK);
        let export_json = body_json(export).await;

        assert_eq!(export_json["conversation_id"], 1);
        assert!(export_json["exported_at"].is_string());
        assert_eq!(export_json["detail"], detail_json);
    }

    #[tokio::test]
    async fn store_failure_is_503_not_empty_result() {
        let app = router_with(MockStore::failing());

        let response = app.clone().oneshot(authed("/v1/inbox")).await.unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        let json = body_json(response).await;
        assert_eq!(json["code"], "data_source_unavailable");

        // Health stays up while the store is down.
        let response = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
