//! Synchronous client core for the quiz REST API.
//!
//! # Overview
//! `ApiClient` turns a method, a resource path and an optional payload into
//! an `HttpRequest`, runs it through a `Transport`, and turns the
//! `HttpResponse` into either decoded JSON or a classified `ApiError`. The
//! services in `services` sit on top and speak in typed models.
//!
//! # Design
//! - Request building and response parsing are pure; only `Transport` does
//!   I/O. `UreqTransport` is the real one, tests use a mock.
//! - Field names differ between the client models and the backend DTOs
//!   (`content` vs `questionText`, `name` vs `title`); `mapping` is the one
//!   place that knows the difference.
//! - Review ownership is a nickname match, held in an explicit
//!   `StudentSession` rather than global state.
//! - DTOs are defined independently from the mock-server crate; integration
//!   tests catch schema drift.

pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod mapping;
pub mod services;
pub mod session;
pub mod transport;
pub mod types;
pub mod url;
pub mod validation;

pub use client::{ApiClient, Payload, RequestOptions, ResourceApi};
pub use config::ClientConfig;
pub use error::{ApiError, ErrorKind, HttpFailure};
pub use http::{HttpMethod, HttpRequest, HttpResponse, MultipartForm};
pub use mapping::{map_to_backend, map_to_frontend, EntityKind};
pub use services::{AttemptService, CategoryService, QuizService, ReviewService};
pub use session::{FileNicknameStore, MemoryNicknameStore, NicknameStore, StudentSession};
pub use transport::{Transport, TransportError, UreqTransport};
