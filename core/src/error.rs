//! Error types for the quiz API client.
//!
//! # Design
//! Wire status codes are classified into a closed `ErrorKind` by the client;
//! human-readable copy is produced only by `ApiError::user_message`, so
//! callers can branch on the kind and render text separately.
//!
//! Server-supplied detail is extracted once, when the failure is built, in
//! this order: JSON `message`, JSON `error`, then the raw body as plain text.
//! Plain text is only trusted below 500; a 5xx body that is not JSON is
//! usually an HTML error page or a stack trace.

use std::fmt;

use serde_json::Value;
use thiserror::Error;
use validator::ValidationErrors;

use crate::http::{HttpMethod, HttpResponse};

/// Closed set of failure categories a caller can branch on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Rejected input: client-side validation, 400 or 422.
    Validation,
    NotFound,
    Unauthorized,
    Forbidden,
    /// Any 5xx.
    Server,
    /// No response was received at all.
    Network,
    Unknown,
}

impl ErrorKind {
    pub fn from_status(status: u16) -> Self {
        match status {
            400 | 422 => ErrorKind::Validation,
            401 => ErrorKind::Unauthorized,
            403 => ErrorKind::Forbidden,
            404 => ErrorKind::NotFound,
            500..=599 => ErrorKind::Server,
            _ => ErrorKind::Unknown,
        }
    }
}

/// A non-2xx response, reduced to what error reporting needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpFailure {
    pub method: HttpMethod,
    pub url: String,
    pub status: u16,
    /// Message supplied by the server, if one could be extracted.
    pub detail: Option<String>,
}

impl HttpFailure {
    pub fn from_response(method: HttpMethod, url: &str, response: &HttpResponse) -> Self {
        Self {
            method,
            url: url.to_string(),
            status: response.status,
            detail: extract_detail(response.status, &response.body),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        ErrorKind::from_status(self.status)
    }
}

impl fmt::Display for HttpFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} failed with status {}", self.method, self.url, self.status)?;
        if let Some(detail) = &self.detail {
            write!(f, ": {detail}")?;
        }
        Ok(())
    }
}

/// Errors returned by `ApiClient` and the service layer.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Client-side validation rejected the payload; nothing was sent.
    #[error("validation failed: {0}")]
    Invalid(#[from] ValidationErrors),

    /// The server answered with a non-2xx status.
    #[error("{0}")]
    Http(HttpFailure),

    /// The request never produced a response.
    #[error("no response from server for {method} {url}: {reason}")]
    Network {
        method: HttpMethod,
        url: String,
        reason: String,
    },

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),

    /// The response body could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    Deserialization(String),

    /// A service-layer description wrapped around another error.
    #[error("{context}: {source}")]
    Context {
        context: String,
        #[source]
        source: Box<ApiError>,
    },
}

impl ApiError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ApiError::Invalid(_) => ErrorKind::Validation,
            ApiError::Http(failure) => failure.kind(),
            ApiError::Network { .. } => ErrorKind::Network,
            ApiError::Serialization(_) | ApiError::Deserialization(_) => ErrorKind::Unknown,
            ApiError::Context { source, .. } => source.kind(),
        }
    }

    /// HTTP status of the underlying failure, if the server answered.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Http(failure) => Some(failure.status),
            ApiError::Context { source, .. } => source.status(),
            _ => None,
        }
    }

    /// Text suitable for showing to a user.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Context { context, source } => source
                .specific_message()
                .unwrap_or_else(|| context.clone()),
            other => other.specific_message().unwrap_or_else(|| other.generic_message()),
        }
    }

    fn specific_message(&self) -> Option<String> {
        match self {
            ApiError::Invalid(errors) => first_validation_message(errors),
            ApiError::Http(failure) => failure
                .detail
                .clone()
                .or_else(|| canned_message(failure.status).map(str::to_string)),
            ApiError::Network { .. } => {
                Some("No response from server. Please check your connection".to_string())
            }
            ApiError::Serialization(_) | ApiError::Deserialization(_) => None,
            ApiError::Context { source, .. } => source.specific_message(),
        }
    }

    fn generic_message(&self) -> String {
        match self {
            ApiError::Http(failure) => format!(
                "{} {} failed with status {}",
                failure.method, failure.url, failure.status
            ),
            ApiError::Invalid(_) => "Invalid input data".to_string(),
            ApiError::Serialization(_) => "The request could not be encoded".to_string(),
            _ => "An error occurred".to_string(),
        }
    }
}

/// Attach a service-level description to an error while keeping its kind.
pub trait ResultExt<T> {
    fn context<C, F>(self, context: F) -> Result<T, ApiError>
    where
        C: Into<String>,
        F: FnOnce() -> C;
}

impl<T> ResultExt<T> for Result<T, ApiError> {
    fn context<C, F>(self, context: F) -> Result<T, ApiError>
    where
        C: Into<String>,
        F: FnOnce() -> C,
    {
        self.map_err(|source| ApiError::Context {
            context: context().into(),
            source: Box::new(source),
        })
    }
}

fn canned_message(status: u16) -> Option<&'static str> {
    match status {
        400 => Some("Invalid input data"),
        401 => Some("Authentication required"),
        403 => Some("You do not have permission to perform this action"),
        404 => Some("The requested resource was not found"),
        500..=599 => Some("Server error, please try again later"),
        _ => None,
    }
}

fn extract_detail(status: u16, body: &str) -> Option<String> {
    let body = body.trim();
    if body.is_empty() {
        return None;
    }
    match serde_json::from_str::<Value>(body) {
        Ok(value) => ["message", "error"].iter().find_map(|key| {
            value
                .get(key)
                .and_then(Value::as_str)
                .map(str::trim)
                .filter(|text| !text.is_empty())
                .map(str::to_string)
        }),
        Err(_) if status < 500 && !body.starts_with('<') => Some(body.to_string()),
        Err(_) => None,
    }
}

fn first_validation_message(errors: &ValidationErrors) -> Option<String> {
    let mut fields: Vec<(String, String)> = errors
        .field_errors()
        .into_iter()
        .filter_map(|(field, list)| {
            list.first().map(|error| {
                let text = match &error.message {
                    Some(message) => message.to_string(),
                    None => format!("{field} is invalid ({})", error.code),
                };
                (field.to_string(), text)
            })
        })
        .collect();
    fields.sort();
    fields.into_iter().next().map(|(_, text)| text)
}
