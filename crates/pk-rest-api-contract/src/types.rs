// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Request and response bodies of the patternkeep REST service

use pk_domain_types::{Counter, PatternId};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Longest counter name the service accepts
pub const MAX_COUNTER_NAME_LEN: u64 = 100;

/// Body of `PUT /api/patterns/{id}/page`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePageRequest {
    #[validate(range(min = 1, message = "Pages are numbered from 1"))]
    pub current_page: u32,
}

/// Body of `PUT /api/patterns/{id}/timer` and of the unload beacon
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTimerRequest {
    pub timer_seconds: u64,
}

/// Body of `PUT /api/patterns/{id}/status`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStatusRequest {
    pub in_progress: bool,
}

/// Body of `POST /api/patterns/{id}/counters`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateCounterRequest {
    #[validate(length(min = 1, max = 100, message = "Counter name must be 1-100 characters"))]
    pub name: String,
}

/// Body of `PUT /api/counters/{id}`; absent fields are left unchanged
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCounterRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, max = 100, message = "Counter name must be 1-100 characters"))]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<i64>,
}

impl UpdateCounterRequest {
    pub fn value(value: i64) -> Self {
        Self {
            name: None,
            value: Some(value),
        }
    }

    pub fn name(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            value: None,
        }
    }
}

/// Response of `GET /api/patterns/{id}/counters`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CounterListResponse {
    pub items: Vec<Counter>,
}

/// Timer payload together with the pattern it belongs to, as sent by the beacon
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimerBeacon {
    pub pattern_id: PatternId,
    pub timer_seconds: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_counter_omits_absent_fields() {
        let body = serde_json::to_value(UpdateCounterRequest::value(-3)).expect("serialize");
        assert_eq!(body, serde_json::json!({ "value": -3 }));

        let body = serde_json::to_value(UpdateCounterRequest::name("Rep")).expect("serialize");
        assert_eq!(body, serde_json::json!({ "name": "Rep" }));
    }

    #[test]
    fn page_request_uses_camel_case() {
        let body = serde_json::to_string(&UpdatePageRequest { current_page: 4 }).expect("json");
        assert_eq!(body, r#"{"currentPage":4}"#);
    }
}
