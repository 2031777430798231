// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Validation helpers for API contract types

use crate::error::ApiContractError;
use crate::types::*;
use validator::Validate;

/// Trim a counter name and reject it when nothing is left
pub fn normalize_counter_name(name: &str) -> Result<String, ApiContractError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(ApiContractError::InvalidCounterName(
            "name is empty".to_string(),
        ));
    }
    if trimmed.chars().count() as u64 > MAX_COUNTER_NAME_LEN {
        return Err(ApiContractError::InvalidCounterName(format!(
            "name is longer than {} characters",
            MAX_COUNTER_NAME_LEN
        )));
    }
    Ok(trimmed.to_string())
}

/// Validate a create counter request
pub fn validate_create_counter_request(
    request: &CreateCounterRequest,
) -> Result<(), ApiContractError> {
    request.validate()?;
    Ok(())
}

/// Validate an update counter request
pub fn validate_update_counter_request(
    request: &UpdateCounterRequest,
) -> Result<(), ApiContractError> {
    request.validate()?;
    Ok(())
}

/// Validate a page update request
pub fn validate_update_page_request(request: &UpdatePageRequest) -> Result<(), ApiContractError> {
    request.validate()?;
    Ok(())
}

/// Validate the server base URL
pub fn validate_url(url_str: &str) -> Result<(), ApiContractError> {
    url::Url::parse(url_str)?;
    Ok(())
}
