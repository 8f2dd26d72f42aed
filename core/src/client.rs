//! HTTP client core for the quiz API.
//!
//! # Design
//! `ApiClient` holds the base URL, the default headers and a `Transport`.
//! Every call is split into `build_request` (pure), `Transport::execute`
//! (I/O) and `parse_response` (pure), and `send` simply chains the three.
//! The pure halves stay public so request shapes and error classification
//! can be checked without a server.
//!
//! Successful responses are unwrapped: callers get the decoded body, or
//! `None` when the server answered 204 or sent an empty body. Failures come
//! back as `ApiError`. There is no retry, caching, or request de-duplication.

use std::fmt::Display;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::config::ClientConfig;
use crate::error::{ApiError, HttpFailure};
use crate::http::{HttpMethod, HttpRequest, HttpResponse, MultipartForm, RequestBody};
use crate::transport::{Transport, UreqTransport};
use crate::url::{join_url, normalize_resource};

/// Body argument for a request.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// Sent as JSON with `content-type: application/json`.
    Json(Value),
    /// Sent as `multipart/form-data`; the transport sets the content type.
    Form(MultipartForm),
}

impl Payload {
    pub fn json<S: Serialize>(value: &S) -> Result<Self, ApiError> {
        serde_json::to_value(value)
            .map(Payload::Json)
            .map_err(|e| ApiError::Serialization(e.to_string()))
    }
}

/// Per-call options: extra headers and query parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestOptions {
    pub headers: Vec<(String, String)>,
    pub query: Vec<(String, String)>,
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }
}

/// Client for the quiz REST API.
#[derive(Debug, Clone)]
pub struct ApiClient<T = UreqTransport> {
    base_url: String,
    default_headers: Vec<(String, String)>,
    transport: T,
}

impl ApiClient<UreqTransport> {
    pub fn new(base_url: &str) -> Self {
        Self::with_transport(base_url, UreqTransport::new())
    }

    pub fn from_config(config: &ClientConfig) -> Self {
        Self::new(&config.base_url)
    }
}

impl<T: Transport> ApiClient<T> {
    pub fn with_transport(base_url: &str, transport: T) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            default_headers: vec![("accept".to_string(), "application/json".to_string())],
            transport,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Build the request for `method` on `path` relative to the base URL.
    ///
    /// A body passed with GET or HEAD is dropped.
    pub fn build_request(
        &self,
        method: HttpMethod,
        path: &str,
        body: Option<Payload>,
        options: &RequestOptions,
    ) -> Result<HttpRequest, ApiError> {
        let mut headers = self.default_headers.clone();
        let body = match body.filter(|_| method.allows_body()) {
            Some(Payload::Json(value)) => {
                let json = serde_json::to_string(&value)
                    .map_err(|e| ApiError::Serialization(e.to_string()))?;
                headers.push(("content-type".to_string(), "application/json".to_string()));
                Some(RequestBody::Json(json))
            }
            Some(Payload::Form(form)) => Some(RequestBody::Multipart(form)),
            None => None,
        };
        for (name, value) in &options.headers {
            set_header(&mut headers, name, value);
        }

        Ok(HttpRequest {
            method,
            url: join_url(&self.base_url, path),
            query: options.query.clone(),
            headers,
            body,
        })
    }

    /// Decode a response to `request`.
    ///
    /// Returns `Ok(None)` for 204 and for any 2xx with an empty body.
    pub fn parse_response<U: DeserializeOwned>(
        &self,
        request: &HttpRequest,
        response: HttpResponse,
    ) -> Result<Option<U>, ApiError> {
        if !response.is_success() {
            log::error!(
                "API error: {} {} returned {}: {}",
                request.method,
                request.url,
                response.status,
                response.body
            );
            return Err(ApiError::Http(HttpFailure::from_response(
                request.method,
                &request.url,
                &response,
            )));
        }

        log::debug!("Response: {} from {}", response.status, request.url);
        if response.status == 204 || response.body.trim().is_empty() {
            return Ok(None);
        }
        serde_json::from_str(&response.body)
            .map(Some)
            .map_err(|e| ApiError::Deserialization(e.to_string()))
    }

    pub fn send<U: DeserializeOwned>(
        &self,
        method: HttpMethod,
        path: &str,
        body: Option<Payload>,
        options: &RequestOptions,
    ) -> Result<Option<U>, ApiError> {
        let request = self.build_request(method, path, body, options)?;
        log::debug!("Request: {} {}", request.method, request.url);
        let response = self.transport.execute(&request).map_err(|e| {
            log::warn!("No response received for {} {}: {e}", request.method, request.url);
            ApiError::Network {
                method: request.method,
                url: request.url.clone(),
                reason: e.to_string(),
            }
        })?;
        self.parse_response(&request, response)
    }

    pub fn get<U: DeserializeOwned>(
        &self,
        path: &str,
        options: &RequestOptions,
    ) -> Result<Option<U>, ApiError> {
        self.send(HttpMethod::Get, path, None, options)
    }

    pub fn post<U: DeserializeOwned>(
        &self,
        path: &str,
        body: Option<Payload>,
        options: &RequestOptions,
    ) -> Result<Option<U>, ApiError> {
        self.send(HttpMethod::Post, path, body, options)
    }

    /// POST a `multipart/form-data` body.
    pub fn post_form<U: DeserializeOwned>(
        &self,
        path: &str,
        form: MultipartForm,
        options: &RequestOptions,
    ) -> Result<Option<U>, ApiError> {
        self.send(HttpMethod::Post, path, Some(Payload::Form(form)), options)
    }

    pub fn put<U: DeserializeOwned>(
        &self,
        path: &str,
        body: Option<Payload>,
        options: &RequestOptions,
    ) -> Result<Option<U>, ApiError> {
        self.send(HttpMethod::Put, path, body, options)
    }

    pub fn del<U: DeserializeOwned>(
        &self,
        path: &str,
        body: Option<Payload>,
        options: &RequestOptions,
    ) -> Result<Option<U>, ApiError> {
        self.send(HttpMethod::Delete, path, body, options)
    }

    /// CRUD helpers rooted at `path`.
    pub fn resource(&self, path: &str) -> ResourceApi<'_, T> {
        ResourceApi {
            client: self,
            path: normalize_resource(path),
            options: RequestOptions::default(),
        }
    }
}

/// Replace any header with the same (case-insensitive) name, then append.
fn set_header(headers: &mut Vec<(String, String)>, name: &str, value: &str) {
    headers.retain(|(existing, _)| !existing.eq_ignore_ascii_case(name));
    headers.push((name.to_ascii_lowercase(), value.to_string()));
}

/// Conventional REST verbs derived from one collection path.
///
/// | method | request |
/// |---|---|
/// | `get_all` | `GET {path}` |
/// | `get_by_id` | `GET {path}/{id}` |
/// | `create` | `POST {path}` |
/// | `update` | `PUT {path}/{id}` |
/// | `delete` | `DELETE {path}/{id}` |
/// | `custom_action` | `POST {path}/{id}/{action}` |
/// | `find_by` | `GET {path}?{params}` |
#[derive(Debug, Clone)]
pub struct ResourceApi<'a, T> {
    client: &'a ApiClient<T>,
    path: String,
    options: RequestOptions,
}

impl<'a, T: Transport> ResourceApi<'a, T> {
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Send `options` (headers, query) with every request from this resource.
    pub fn with_options(mut self, options: RequestOptions) -> Self {
        self.options = options;
        self
    }

    pub fn get_all<U: DeserializeOwned>(&self) -> Result<Option<U>, ApiError> {
        self.client.get(&self.path, &self.options)
    }

    pub fn get_by_id<U: DeserializeOwned>(&self, id: impl Display) -> Result<Option<U>, ApiError> {
        self.client.get(&self.member(id), &self.options)
    }

    pub fn create<U: DeserializeOwned>(&self, data: Payload) -> Result<Option<U>, ApiError> {
        self.client.post(&self.path, Some(data), &self.options)
    }

    pub fn update<U: DeserializeOwned>(
        &self,
        id: impl Display,
        data: Payload,
    ) -> Result<Option<U>, ApiError> {
        self.client.put(&self.member(id), Some(data), &self.options)
    }

    pub fn delete(&self, id: impl Display) -> Result<(), ApiError> {
        self.client
            .del::<Value>(&self.member(id), None, &self.options)
            .map(|_| ())
    }

    pub fn custom_action<U: DeserializeOwned>(
        &self,
        id: impl Display,
        action: &str,
        data: Option<Payload>,
    ) -> Result<Option<U>, ApiError> {
        let path = format!("{}/{}", self.member(id), normalize_resource(action));
        self.client.post(&path, data, &self.options)
    }

    pub fn find_by<U: DeserializeOwned>(&self, params: &[(&str, &str)]) -> Result<Option<U>, ApiError> {
        let mut options = self.options.clone();
        for (key, value) in params {
            options = options.query(*key, *value);
        }
        self.client.get(&self.path, &options)
    }

    fn member(&self, id: impl Display) -> String {
        format!("{}/{id}", self.path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::transport::{MockTransport, TransportError};
    use serde_json::json;

    const BASE: &str = "http://localhost:8080/api";

    fn client_expecting(
        check: impl Fn(&HttpRequest) + Send + 'static,
        response: HttpResponse,
    ) -> ApiClient<MockTransport> {
        let mut transport = MockTransport::new();
        transport.expect_execute().times(1).returning(move |req| {
            check(req);
            Ok(response.clone())
        });
        ApiClient::with_transport(BASE, transport)
    }

    fn offline() -> ApiClient<MockTransport> {
        ApiClient::with_transport(BASE, MockTransport::new())
    }

    #[test]
    fn get_all_requests_exact_collection_url() {
        for resource in ["quizzes", "/quizzes", "quizzes/", "/quizzes/"] {
            let client = client_expecting(
                |req| {
                    assert_eq!(req.method, HttpMethod::Get);
                    assert_eq!(req.url, "http://localhost:8080/api/quizzes");
                    assert!(req.body.is_none());
                },
                HttpResponse::new(200, "[]"),
            );
            let quizzes: Option<Vec<Value>> = client.resource(resource).get_all().unwrap();
            assert_eq!(quizzes, Some(Vec::new()));
        }
    }

    #[test]
    fn get_by_id_uses_single_slashes() {
        let client = client_expecting(
            |req| assert_eq!(req.url, "http://localhost:8080/api/categories/3"),
            HttpResponse::new(200, r#"{"id":3,"title":"Rust"}"#),
        );
        let category: Value = client
            .resource("/categories/")
            .get_by_id(3)
            .unwrap()
            .unwrap();
        assert_eq!(category["title"], "Rust");
    }

    #[test]
    fn del_without_data_sends_no_body() {
        let client = client_expecting(
            |req| {
                assert_eq!(req.method, HttpMethod::Delete);
                assert_eq!(req.url, "http://localhost:8080/api/quizzes/answers/5");
                assert!(req.body.is_none());
                assert!(req.header("content-type").is_none());
            },
            HttpResponse::new(204, ""),
        );
        let result: Option<Value> = client
            .del("quizzes/answers/5", None, &RequestOptions::new())
            .unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn no_content_resolves_to_none() {
        let client = client_expecting(|_| {}, HttpResponse::new(204, ""));
        client.resource("quizzes").delete(1).unwrap();

        let client = client_expecting(|_| {}, HttpResponse::new(200, "  "));
        let body: Option<Value> = client.get("quizzes/1", &RequestOptions::new()).unwrap();
        assert!(body.is_none());
    }

    #[test]
    fn not_found_carries_server_message() {
        let client = client_expecting(
            |_| {},
            HttpResponse::new(404, r#"{"status":404,"message":"Quiz not found"}"#),
        );
        let err = client.resource("quizzes").get_by_id::<Value>(42).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert!(err.to_string().contains("Quiz not found"));
        assert!(err.user_message().contains("Quiz not found"));
    }

    #[test]
    fn server_error_with_garbage_body_uses_status_fallback() {
        let client = client_expecting(|_| {}, HttpResponse::new(500, "\u{0}\u{1}<<garbage"));
        let err = client.resource("quizzes").get_all::<Value>().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Server);
        assert_eq!(err.user_message(), "Server error, please try again later");
        assert!(!err.to_string().contains("garbage"));
    }

    #[test]
    fn transport_failure_is_network_error() {
        let mut transport = MockTransport::new();
        transport
            .expect_execute()
            .returning(|_| Err(TransportError("connection refused".to_string())));
        let client = ApiClient::with_transport(BASE, transport);
        let err = client.resource("quizzes").get_all::<Value>().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Network);
        assert!(err.to_string().contains("connection refused"));
    }

    #[test]
    fn json_body_sets_content_type() {
        let req = offline()
            .build_request(
                HttpMethod::Post,
                "quizzes",
                Some(Payload::Json(json!({"title": "Ownership"}))),
                &RequestOptions::new(),
            )
            .unwrap();
        assert_eq!(req.header("content-type"), Some("application/json"));
        match req.body {
            Some(RequestBody::Json(body)) => {
                let body: Value = serde_json::from_str(&body).unwrap();
                assert_eq!(body, json!({"title": "Ownership"}));
            }
            other => panic!("expected JSON body, got {other:?}"),
        }
    }

    #[test]
    fn form_body_leaves_content_type_to_transport() {
        let form = MultipartForm::new().text("title", "Borrowing");
        let req = offline()
            .build_request(
                HttpMethod::Post,
                "quizzes",
                Some(Payload::Form(form.clone())),
                &RequestOptions::new(),
            )
            .unwrap();
        assert!(req.header("content-type").is_none());
        assert_eq!(req.body, Some(RequestBody::Multipart(form)));
    }

    #[test]
    fn post_form_sends_multipart_body() {
        let client = client_expecting(
            |req| {
                assert_eq!(req.method, HttpMethod::Post);
                match &req.body {
                    Some(RequestBody::Multipart(form)) => {
                        assert_eq!(form.fields, vec![("title".to_string(), "Traits".to_string())]);
                    }
                    other => panic!("expected multipart body, got {other:?}"),
                }
            },
            HttpResponse::new(201, r#"{"id":1}"#),
        );
        let created: Option<Value> = client
            .post_form("quizzes", MultipartForm::new().text("title", "Traits"), &RequestOptions::new())
            .unwrap();
        assert_eq!(created, Some(json!({"id": 1})));
    }

    #[test]
    fn get_and_head_drop_bodies() {
        for method in [HttpMethod::Get, HttpMethod::Head] {
            let req = offline()
                .build_request(
                    method,
                    "quizzes",
                    Some(Payload::Json(json!({"ignored": true}))),
                    &RequestOptions::new(),
                )
                .unwrap();
            assert!(req.body.is_none());
            assert!(req.header("content-type").is_none());
        }
    }

    #[test]
    fn per_call_headers_override_defaults() {
        let options = RequestOptions::new()
            .header("Accept", "text/plain")
            .header("X-Student-Nickname", "ada");
        let req = offline()
            .build_request(HttpMethod::Delete, "reviews/1", None, &options)
            .unwrap();
        assert_eq!(req.header("accept"), Some("text/plain"));
        assert_eq!(req.header("x-student-nickname"), Some("ada"));
        assert_eq!(
            req.headers.iter().filter(|(k, _)| k == "accept").count(),
            1
        );
    }

    #[test]
    fn custom_action_posts_to_member_action() {
        let client = client_expecting(
            |req| {
                assert_eq!(req.method, HttpMethod::Post);
                assert_eq!(req.url, "http://localhost:8080/api/quizzes/7/publish");
                assert!(req.body.is_none());
            },
            HttpResponse::new(200, r#"{"id":7,"published":true}"#),
        );
        let quiz: Value = client
            .resource("quizzes")
            .custom_action(7, "publish", None)
            .unwrap()
            .unwrap();
        assert_eq!(quiz["published"], true);
    }

    #[test]
    fn find_by_appends_query_parameters() {
        let client = client_expecting(
            |req| {
                assert_eq!(req.url, "http://localhost:8080/api/quizzes");
                assert_eq!(req.query, vec![("published".to_string(), "true".to_string())]);
            },
            HttpResponse::new(200, "[]"),
        );
        let found: Option<Vec<Value>> = client
            .resource("quizzes")
            .find_by(&[("published", "true")])
            .unwrap();
        assert_eq!(found, Some(Vec::new()));
    }

    #[test]
    fn update_puts_to_member() {
        let client = client_expecting(
            |req| {
                assert_eq!(req.method, HttpMethod::Put);
                assert_eq!(req.url, "http://localhost:8080/api/categories/2");
                assert!(matches!(req.body, Some(RequestBody::Json(_))));
            },
            HttpResponse::new(200, r#"{"id":2}"#),
        );
        let updated: Option<Value> = client
            .resource("categories")
            .update(2, Payload::Json(json!({"title": "Systems"})))
            .unwrap();
        assert_eq!(updated, Some(json!({"id": 2})));
    }

    #[test]
    fn malformed_success_body_is_deserialization_error() {
        let client = client_expecting(|_| {}, HttpResponse::new(200, "not json"));
        let err = client.resource("quizzes").get_all::<Vec<Value>>().unwrap_err();
        assert!(matches!(err, ApiError::Deserialization(_)));
    }
}
