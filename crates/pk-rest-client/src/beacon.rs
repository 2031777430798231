// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Blocking best-effort delivery for the unload path

use std::time::Duration;

use pk_client_api::Beacon;
use pk_rest_api_contract::TimerBeacon;
use url::Url;

pub const BEACON_TIMEOUT: Duration = Duration::from_secs(2);

/// Posts the timer payload to `/api/patterns/{id}/timer/beacon`
///
/// The request runs on a short-lived OS thread with its own blocking client,
/// so it may be called from inside the session's async runtime. The caller
/// waits at most [`BEACON_TIMEOUT`] plus connection setup.
#[derive(Debug, Clone)]
pub struct HttpBeacon {
    base_url: Url,
    timeout: Duration,
}

impl HttpBeacon {
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            timeout: BEACON_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn timer_url(&self, payload: &TimerBeacon) -> Option<Url> {
        let id = payload.pattern_id.to_string();
        let mut url = self.base_url.clone();
        {
            let mut path = url.path_segments_mut().ok()?;
            path.pop_if_empty();
            path.extend(["api", "patterns", id.as_str(), "timer", "beacon"]);
        }
        Some(url)
    }
}

impl Beacon for HttpBeacon {
    fn send_timer(&self, payload: &TimerBeacon) -> bool {
        let Some(url) = self.timer_url(payload) else {
            return false;
        };
        let timeout = self.timeout;
        let body = payload.clone();

        let handle = std::thread::spawn(move || -> Result<bool, reqwest::Error> {
            let client = reqwest::blocking::Client::builder().timeout(timeout).build()?;
            let response = client.post(url).json(&body).send()?;
            Ok(response.status().is_success())
        });

        match handle.join() {
            Ok(Ok(delivered)) => delivered,
            Ok(Err(err)) => {
                tracing::warn!(pattern_id = payload.pattern_id, error = %err, "timer beacon failed");
                false
            }
            Err(_) => {
                tracing::warn!(pattern_id = payload.pattern_id, "timer beacon thread panicked");
                false
            }
        }
    }
}
