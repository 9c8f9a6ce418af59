// SPDX-License-Identifier: MIT
//
// Copyright (c) 2025 Passport Protocol Foundation

use thiserror::Error;

/// Transport-level failures talking to an external collaborator.
///
/// This is the only error class eligible for caller-driven retry; every
/// policy outcome is terminal and carried by its own type.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("HTTP request failed: {0}")]
    Http(String),

    #[error("Backend returned status {status} for {url}")]
    Status { status: u16, url: String },

    #[error("Invalid backend response: {0}")]
    InvalidResponse(String),

    #[error("Provider unavailable: {0}")]
    Unavailable(String),
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        TransportError::Http(err.to_string())
    }
}

impl TransportError {
    /// Reject non-2xx responses before attempting to parse a body
    pub(crate) fn check_status(response: reqwest::Response) -> Result<reqwest::Response, Self> {
        let status = response.status();
        if status.is_success() {
            Ok(response)
        } else {
            Err(TransportError::Status {
                status: status.as_u16(),
                url: response.url().to_string(),
            })
        }
    }
}
