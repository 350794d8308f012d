//! Error types and axum `IntoResponse` implementation.

use axum::{
  extract::multipart::MultipartError,
  http::StatusCode,
  response::{IntoResponse, Redirect, Response},
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// No valid session on a route a browser navigates to.
  #[error("login required")]
  LoginRequired,
  /// No valid session on a route fetched by a script or an `<img>`.
  #[error("unauthorized")]
  Unauthorized,
  #[error("not found")]
  NotFound,
  #[error("bad request: {0}")]
  BadRequest(String),
  #[error("invalid person: {0}")]
  Invalid(#[from] lineage_core::Error),
  #[error("malformed upload: {0}")]
  Multipart(#[from] MultipartError),
  #[error("chart rendering failed: {0}")]
  Chart(#[from] lineage_chart::Error),
  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
  #[error("background task failed: {0}")]
  Task(#[from] tokio::task::JoinError),
}

impl IntoResponse for Error {
  fn into_response(self) -> Response {
    match self {
      Error::LoginRequired => Redirect::to("/login").into_response(),
      Error::Unauthorized => (StatusCode::UNAUTHORIZED, "Unauthorized").into_response(),
      Error::NotFound => (StatusCode::NOT_FOUND, "Not Found").into_response(),
      Error::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg).into_response(),
      Error::Invalid(e) => (StatusCode::BAD_REQUEST, e.to_string()).into_response(),
      Error::Multipart(e) => (e.status(), e.body_text()).into_response(),
      Error::Chart(e) => {
        tracing::error!(error = %e, "chart rendering failed");
        (StatusCode::BAD_GATEWAY, e.to_string()).into_response()
      }
      Error::Store(e) => {
        tracing::error!(error = %e, "store failure");
        (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
      }
      Error::Task(e) => {
        (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
      }
    }
  }
}
