use std::sync::Arc;

use axum::http::StatusCode;
use axum::{Json, Router, routing::post};
use chrono::{NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tracing::warn;

use crate::codec;
use crate::config::Settings;
use crate::editor::Edit;
use crate::error::RecurrenceError;
use crate::interface::{EditReply, SessionId, SessionRegistry};
use crate::rule::{RuleParts, SessionLimits, TerminationMode};

#[derive(Deserialize)]
pub struct DescribeRequest {
    pub rule: String,
    #[serde(default)]
    pub placeholder: Option<String>,
}

#[derive(Serialize)]
pub struct DescribeResponse {
    pub description: String,
}

#[derive(Deserialize)]
pub struct OpenRequest {
    #[serde(default)]
    pub value: String,
    /// Anchor start of the session; defaults to now.
    #[serde(default)]
    pub anchor: Option<NaiveDateTime>,
    #[serde(default)]
    pub max_count: Option<u32>,
    #[serde(default)]
    pub max_until: Option<NaiveDate>,
    #[serde(default)]
    pub hide_advanced: Option<bool>,
}

#[derive(Deserialize)]
pub struct EditRequest {
    pub id: u64,
    pub edit: Edit,
}

#[derive(Deserialize)]
pub struct ResetRequest {
    pub id: u64,
    #[serde(default)]
    pub value: String,
}

#[derive(Deserialize)]
pub struct CloseRequest {
    pub id: u64,
}

#[derive(Serialize)]
pub struct SessionResponse {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rule: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parts: Option<RuleParts>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<TerminationMode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub changed: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub closed: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SessionResponse {
    fn ok(reply: EditReply) -> Self {
        Self {
            status: "ok".into(),
            id: Some(reply.id.0),
            rule: Some(reply.rule),
            description: Some(reply.description),
            parts: Some(reply.parts),
            mode: Some(reply.mode),
            changed: Some(reply.changed),
            closed: None,
            error: None,
        }
    }
    fn closed(closed: bool) -> Self {
        Self {
            status: "ok".into(),
            id: None,
            rule: None,
            description: None,
            parts: None,
            mode: None,
            changed: None,
            closed: Some(closed),
            error: None,
        }
    }
    fn error(error: &RecurrenceError) -> (StatusCode, Json<Self>) {
        let status = match error {
            RecurrenceError::UnknownSession(_) => StatusCode::NOT_FOUND,
            RecurrenceError::Decode { .. } | RecurrenceError::Encode { .. } => {
                StatusCode::BAD_REQUEST
            }
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let message = format!("{error}");
        warn!(%message, code = %status.as_u16(), "session operation failed");
        let body = Self {
            status: "error".into(),
            id: None,
            rule: None,
            description: None,
            parts: None,
            mode: None,
            changed: None,
            closed: None,
            error: Some(message),
        };
        (status, Json(body))
    }
}

pub fn router(registry: Arc<SessionRegistry>, settings: Arc<Settings>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([axum::http::Method::POST])
        .allow_headers(Any);

    let open_registry = Arc::clone(&registry);
    let open_settings = Arc::clone(&settings);
    let edit_registry = Arc::clone(&registry);
    let reset_registry = Arc::clone(&registry);
    let close_registry = Arc::clone(&registry);

    Router::new()
        .route(
            "/v1/describe",
            post(|Json(req): Json<DescribeRequest>| async move {
                // the stateless read path used by list and detail views
                let placeholder = req
                    .placeholder
                    .unwrap_or_else(|| codec::DEFAULT_PLACEHOLDER.to_string());
                let description = codec::describe_or(&req.rule, &placeholder);
                (StatusCode::OK, Json(DescribeResponse { description }))
            }),
        )
        .route(
            "/v1/session/open",
            post(move |Json(req): Json<OpenRequest>| {
                let registry = Arc::clone(&open_registry);
                let settings = Arc::clone(&open_settings);
                async move {
                    let anchor = req.anchor.unwrap_or_else(|| Utc::now().naive_utc());
                    let limits = SessionLimits {
                        anchor,
                        max_count: req.max_count.unwrap_or(settings.max_count),
                        max_until: req.max_until.or(settings.max_until),
                        hide_advanced: req.hide_advanced.unwrap_or(settings.hide_advanced),
                    };
                    match registry.open(&req.value, limits) {
                        Ok(reply) => (StatusCode::OK, Json(SessionResponse::ok(reply))),
                        Err(e) => SessionResponse::error(&e),
                    }
                }
            }),
        )
        .route(
            "/v1/session/edit",
            post(move |Json(req): Json<EditRequest>| {
                let registry = Arc::clone(&edit_registry);
                async move {
                    match registry.edit(SessionId(req.id), req.edit) {
                        Ok(reply) => (StatusCode::OK, Json(SessionResponse::ok(reply))),
                        Err(e) => SessionResponse::error(&e),
                    }
                }
            }),
        )
        .route(
            "/v1/session/reset",
            post(move |Json(req): Json<ResetRequest>| {
                let registry = Arc::clone(&reset_registry);
                async move {
                    match registry.reset(SessionId(req.id), &req.value) {
                        Ok(reply) => (StatusCode::OK, Json(SessionResponse::ok(reply))),
                        Err(e) => SessionResponse::error(&e),
                    }
                }
            }),
        )
        .route(
            "/v1/session/close",
            post(move |Json(req): Json<CloseRequest>| {
                let registry = Arc::clone(&close_registry);
                async move {
                    match registry.close(SessionId(req.id)) {
                        Ok(closed) => (StatusCode::OK, Json(SessionResponse::closed(closed))),
                        Err(e) => SessionResponse::error(&e),
                    }
                }
            }),
        )
        .layer(cors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rule::Weekday;

    #[test]
    fn edit_wire_shape() {
        let edit: Edit = serde_json::from_str(r#"{"field":"interval","value":2}"#)
            .expect("interval edit");
        assert_eq!(edit, Edit::Interval(2));

        let edit: Edit = serde_json::from_str(r#"{"field":"by_weekday","value":[1,3]}"#)
            .expect("weekday edit");
        assert_eq!(
            edit,
            Edit::ByWeekday(vec![Weekday::Monday, Weekday::Wednesday])
        );

        let edit: Edit =
            serde_json::from_str(r#"{"field":"termination_mode","value":"count"}"#)
                .expect("mode edit");
        assert_eq!(edit, Edit::TerminationMode(TerminationMode::AfterCount));

        let edit: Edit =
            serde_json::from_str(r#"{"field":"toggle_advanced"}"#).expect("toggle edit");
        assert_eq!(edit, Edit::ToggleAdvanced);
    }

    #[test]
    fn weekday_ordinals_outside_range_are_rejected() {
        let result: Result<Edit, _> =
            serde_json::from_str(r#"{"field":"by_weekday","value":[7]}"#);
        assert!(result.is_err());
    }
}
