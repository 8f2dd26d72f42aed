//! Executing `HttpRequest` values against the network.
//!
//! # Design
//! The transport only moves bytes. It reports a `TransportError` when no
//! response was received; any status code, including 4xx and 5xx, comes back
//! as an ordinary `HttpResponse` so that `ApiClient` owns classification.

use thiserror::Error;
use ureq::typestate::WithBody;
use ureq::{Agent, RequestBuilder};
use uuid::Uuid;

use crate::http::{HttpMethod, HttpRequest, HttpResponse, RequestBody};

/// The request produced no response (refused connection, DNS, broken read).
#[derive(Debug, Clone, Error)]
#[error("{0}")]
pub struct TransportError(pub String);

#[cfg_attr(test, mockall::automock)]
pub trait Transport {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError>;
}

/// Blocking transport backed by a `ureq` agent.
#[derive(Debug, Clone)]
pub struct UreqTransport {
    agent: Agent,
}

impl UreqTransport {
    pub fn new() -> Self {
        let agent = Agent::config_builder()
            .http_status_as_error(false)
            .build()
            .new_agent();
        Self { agent }
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for UreqTransport {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        let url = request.url.as_str();
        let result = match (request.method, &request.body) {
            (HttpMethod::Get, _) => prepare(self.agent.get(url), request).call(),
            (HttpMethod::Head, _) => prepare(self.agent.head(url), request).call(),
            (HttpMethod::Delete, None) => prepare(self.agent.delete(url), request).call(),
            (HttpMethod::Delete, Some(body)) => {
                send(prepare(self.agent.delete(url), request).force_send_body(), body)
            }
            (HttpMethod::Post, Some(body)) => send(prepare(self.agent.post(url), request), body),
            (HttpMethod::Post, None) => prepare(self.agent.post(url), request).send_empty(),
            (HttpMethod::Put, Some(body)) => send(prepare(self.agent.put(url), request), body),
            (HttpMethod::Put, None) => prepare(self.agent.put(url), request).send_empty(),
        };
        let mut response = result.map_err(|e| TransportError(e.to_string()))?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|value| (name.as_str().to_string(), value.to_string()))
            })
            .collect();
        let body = if request.method == HttpMethod::Head {
            String::new()
        } else {
            response
                .body_mut()
                .read_to_string()
                .map_err(|e| TransportError(e.to_string()))?
        };

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

fn prepare<B>(mut builder: RequestBuilder<B>, request: &HttpRequest) -> RequestBuilder<B> {
    for (key, value) in &request.query {
        builder = builder.query(key, value);
    }
    for (name, value) in &request.headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    builder
}

fn send(
    builder: RequestBuilder<WithBody>,
    body: &RequestBody,
) -> Result<ureq::http::Response<ureq::Body>, ureq::Error> {
    match body {
        RequestBody::Json(json) => builder.send(json.as_bytes()),
        RequestBody::Multipart(form) => {
            let boundary = format!("quiz-form-{}", Uuid::new_v4().simple());
            let encoded = form.encode(&boundary);
            builder
                .content_type(format!("multipart/form-data; boundary={boundary}"))
                .send(&encoded[..])
        }
    }
}
