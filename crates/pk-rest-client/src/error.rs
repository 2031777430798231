// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

use pk_client_api::ClientApiError;
use pk_rest_api_contract::{ApiContractError, ProblemDetails};
use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RestClientError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("base URL cannot carry a path: {0}")]
    InvalidBaseUrl(String),

    #[error("malformed response body: {0}")]
    Json(#[from] serde_json::Error),

    #[error("server returned {status}: {details}")]
    ServerError {
        status: StatusCode,
        details: ProblemDetails,
    },

    #[error("unexpected response ({status}): {body}")]
    UnexpectedResponse { status: StatusCode, body: String },

    #[error("request rejected before sending: {0}")]
    Contract(#[from] ApiContractError),
}

pub type RestClientResult<T> = Result<T, RestClientError>;

impl RestClientError {
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            RestClientError::ServerError { status, .. }
            | RestClientError::UnexpectedResponse { status, .. } => Some(*status),
            RestClientError::Http(err) => err.status(),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(StatusCode::NOT_FOUND)
    }
}

impl From<RestClientError> for ClientApiError {
    fn from(err: RestClientError) -> Self {
        match &err {
            RestClientError::ServerError { details, .. } => details.clone().into(),
            _ if err.is_not_found() => ClientApiError::NotFound(err.to_string()),
            RestClientError::Http(http) if http.is_connect() || http.is_timeout() => {
                ClientApiError::Network(err.to_string())
            }
            RestClientError::Contract(_) => ClientApiError::InvalidRequest(err.to_string()),
            _ => ClientApiError::Server(err.to_string()),
        }
    }
}
