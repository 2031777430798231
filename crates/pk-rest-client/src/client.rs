// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! REST client for the pattern library

use pk_domain_types::{Counter, CounterId, Pattern, PatternId, Project, ProjectId};
use pk_rest_api_contract::validation::{
    normalize_counter_name, validate_update_counter_request, validate_update_page_request,
};
use pk_rest_api_contract::*;
use reqwest::{Client as HttpClient, Method, Response};
use serde::de::DeserializeOwned;
use url::Url;

use crate::error::{RestClientError, RestClientResult};

const USER_AGENT: &str = concat!("patternkeep/", env!("CARGO_PKG_VERSION"));

/// Server-side counter mutations that take no body
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CounterAction {
    Increment,
    Decrement,
    Reset,
}

impl CounterAction {
    fn segment(self) -> &'static str {
        match self {
            CounterAction::Increment => "increment",
            CounterAction::Decrement => "decrement",
            CounterAction::Reset => "reset",
        }
    }
}

#[derive(Debug, Clone)]
pub struct RestClient {
    http_client: HttpClient,
    base_url: Url,
}

impl RestClient {
    pub fn new(base_url: Url) -> RestClientResult<Self> {
        if base_url.cannot_be_a_base() {
            return Err(RestClientError::InvalidBaseUrl(base_url.to_string()));
        }
        let http_client = HttpClient::builder().user_agent(USER_AGENT).build()?;
        Ok(Self {
            http_client,
            base_url,
        })
    }

    pub fn from_url(base_url: &str) -> RestClientResult<Self> {
        Self::new(Url::parse(base_url)?)
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub async fn get_pattern(&self, id: PatternId) -> RestClientResult<Pattern> {
        let id = id.to_string();
        self.get(self.endpoint(&["api", "patterns", &id])?).await
    }

    pub async fn get_pattern_by_slug(&self, slug: &str) -> RestClientResult<Pattern> {
        self.get(self.endpoint(&["api", "patterns", "slug", slug])?).await
    }

    pub async fn get_project(&self, id: ProjectId) -> RestClientResult<Project> {
        let id = id.to_string();
        self.get(self.endpoint(&["api", "projects", &id])?).await
    }

    pub async fn update_current_page(&self, pattern_id: PatternId, page: u32) -> RestClientResult<()> {
        let body = UpdatePageRequest { current_page: page };
        validate_update_page_request(&body)?;
        let id = pattern_id.to_string();
        self.put(self.endpoint(&["api", "patterns", &id, "page"])?, &body).await
    }

    pub async fn update_timer(&self, pattern_id: PatternId, seconds: u64) -> RestClientResult<()> {
        let body = UpdateTimerRequest {
            timer_seconds: seconds,
        };
        let id = pattern_id.to_string();
        self.put(self.endpoint(&["api", "patterns", &id, "timer"])?, &body).await
    }

    pub async fn mark_in_progress(&self, pattern_id: PatternId) -> RestClientResult<()> {
        let body = UpdateStatusRequest { in_progress: true };
        let id = pattern_id.to_string();
        self.put(self.endpoint(&["api", "patterns", &id, "status"])?, &body).await
    }

    pub async fn list_counters(&self, pattern_id: PatternId) -> RestClientResult<Vec<Counter>> {
        let id = pattern_id.to_string();
        let response: CounterListResponse =
            self.get(self.endpoint(&["api", "patterns", &id, "counters"])?).await?;
        Ok(response.items)
    }

    pub async fn create_counter(&self, pattern_id: PatternId, name: &str) -> RestClientResult<Counter> {
        let body = CreateCounterRequest {
            name: normalize_counter_name(name)?,
        };
        let id = pattern_id.to_string();
        self.post(self.endpoint(&["api", "patterns", &id, "counters"])?, &body).await
    }

    pub async fn update_counter(
        &self,
        counter_id: CounterId,
        update: &UpdateCounterRequest,
    ) -> RestClientResult<Counter> {
        validate_update_counter_request(update)?;
        let id = counter_id.to_string();
        self.put(self.endpoint(&["api", "counters", &id])?, update).await
    }

    pub async fn counter_action(
        &self,
        counter_id: CounterId,
        action: CounterAction,
    ) -> RestClientResult<Counter> {
        let id = counter_id.to_string();
        let url = self.endpoint(&["api", "counters", &id, action.segment()])?;
        self.request(Method::POST, url, None::<&()>).await
    }

    pub async fn delete_counter(&self, counter_id: CounterId) -> RestClientResult<()> {
        let id = counter_id.to_string();
        self.request(Method::DELETE, self.endpoint(&["api", "counters", &id])?, None::<&()>)
            .await
    }

    /// Base URL with `segments` appended, each percent-encoded
    pub fn endpoint(&self, segments: &[&str]) -> RestClientResult<Url> {
        let mut url = self.base_url.clone();
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|_| RestClientError::InvalidBaseUrl(self.base_url.to_string()))?;
            path.pop_if_empty();
            path.extend(segments);
        }
        Ok(url)
    }

    async fn get<T: DeserializeOwned>(&self, url: Url) -> RestClientResult<T> {
        self.request(Method::GET, url, None::<&()>).await
    }

    async fn post<T: DeserializeOwned, B: serde::Serialize>(
        &self,
        url: Url,
        body: &B,
    ) -> RestClientResult<T> {
        self.request(Method::POST, url, Some(body)).await
    }

    async fn put<T: DeserializeOwned, B: serde::Serialize>(
        &self,
        url: Url,
        body: &B,
    ) -> RestClientResult<T> {
        self.request(Method::PUT, url, Some(body)).await
    }

    async fn request<T: DeserializeOwned, B: serde::Serialize>(
        &self,
        method: Method,
        url: Url,
        body: Option<&B>,
    ) -> RestClientResult<T> {
        tracing::debug!(%method, %url, "library request");
        let mut request = self.http_client.request(method, url);
        if let Some(body) = body {
            request = request.json(body);
        }
        let response = request.send().await?;
        handle_response(response).await
    }
}

async fn handle_response<T: DeserializeOwned>(response: Response) -> RestClientResult<T> {
    let status = response.status();
    let text = response.text().await?;

    if status.is_success() {
        // 204 and empty 200 bodies decode as `null`, which `()` accepts
        let body = if text.trim().is_empty() { "null" } else { text.as_str() };
        return serde_json::from_str(body).map_err(RestClientError::from);
    }

    match serde_json::from_str::<ProblemDetails>(&text) {
        Ok(mut details) => {
            details.status.get_or_insert(status.as_u16());
            Err(RestClientError::ServerError { status, details })
        }
        Err(_) => Err(RestClientError::UnexpectedResponse { status, body: text }),
    }
}
