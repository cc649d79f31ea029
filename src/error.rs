// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum ApiError {
    #[error("Network error: {0}")]
    Network(String),
    #[error("Server error ({status}): {message}")]
    Server { status: u16, message: String },
    #[error("Unexpected response body: {0}")]
    Decode(String),
    #[error("Validation error: {0}")]
    Validation(String),
}

impl ApiError {
    pub fn validation(msg: impl Into<String>) -> Self {
        ApiError::Validation(msg.into())
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::Server { status: 404, .. })
    }

    /// Short, static text shown in place of a view when its fetch fails.
    pub fn display_message(&self) -> &'static str {
        match self {
            ApiError::Network(_) => "Could not reach the server. Check your connection.",
            ApiError::Server { status: 401 | 403, .. } => "Not authorized. Check your API token.",
            ApiError::Server { status: 404, .. } => "Not found.",
            ApiError::Server { .. } => "The server returned an error.",
            ApiError::Decode(_) => "The server sent data this client does not understand.",
            ApiError::Validation(_) => "Some input is invalid.",
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(value: serde_json::Error) -> Self {
        ApiError::Decode(value.to_string())
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid config value for {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
    #[error("Could not read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Could not parse config file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}
