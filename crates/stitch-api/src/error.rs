//! API error type and [`axum::response::IntoResponse`] implementation.
//!
//! Every error renders as `{"detail": "<message>"}`.

use axum::{
  Json,
  extract::rejection::{JsonRejection, PathRejection, QueryRejection},
  http::{HeaderValue, StatusCode, header},
  response::{IntoResponse, Response},
};
use serde_json::json;
use stitch_core::{Constraint, Error as CoreError};
use thiserror::Error;

pub const NOT_AUTHENTICATED: &str = "Authentication credentials were not provided.";
pub const BAD_CREDENTIALS: &str = "Invalid email/password.";

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  /// Missing or rejected credentials; carries the client-facing message.
  #[error("unauthorized: {0}")]
  Unauthorized(&'static str),

  /// A page number beyond the last page of a listing.
  #[error("invalid page")]
  InvalidPage,

  /// A path segment that cannot name any resource, such as a malformed id.
  #[error("not found: {0}")]
  NotFound(String),

  #[error("bad request: {0}")]
  BadRequest(String),

  #[error(transparent)]
  Core(#[from] CoreError),
}

impl ApiError {
  fn status_and_detail(&self) -> (StatusCode, String) {
    match self {
      Self::Unauthorized(m) => (StatusCode::UNAUTHORIZED, (*m).to_owned()),
      Self::InvalidPage => (StatusCode::NOT_FOUND, "Invalid page.".to_owned()),
      Self::NotFound(_) => (StatusCode::NOT_FOUND, "Not found.".to_owned()),
      Self::BadRequest(m) => (StatusCode::BAD_REQUEST, m.clone()),
      Self::Core(e) => core_status_and_detail(e),
    }
  }
}

impl From<JsonRejection> for ApiError {
  fn from(rejection: JsonRejection) -> Self { Self::BadRequest(rejection.body_text()) }
}

impl From<QueryRejection> for ApiError {
  fn from(rejection: QueryRejection) -> Self { Self::BadRequest(rejection.body_text()) }
}

impl From<PathRejection> for ApiError {
  fn from(rejection: PathRejection) -> Self { Self::NotFound(rejection.body_text()) }
}

fn core_status_and_detail(e: &CoreError) -> (StatusCode, String) {
  let bad = |m: &str| (StatusCode::BAD_REQUEST, m.to_owned());
  match e {
    CoreError::SelfRating => bad("You cannot rate your own piece."),
    CoreError::DuplicateRating(_) | CoreError::Conflict(Constraint::Rating) => {
      bad("You have already rated this piece.")
    }
    CoreError::ScoreOutOfRange(_) => bad("Score must be between 0 and 5."),
    CoreError::SelfFollow => bad("You cannot follow yourself."),
    CoreError::AlreadyFollowing(_) | CoreError::Conflict(Constraint::Follow) => {
      bad("You are already following this profile.")
    }
    CoreError::Conflict(Constraint::AccountEmail) => {
      bad("An account with this email already exists.")
    }
    CoreError::InvalidTitle(m) => bad(&capitalise(m)),
    CoreError::EmptyComment => bad("Comment content must not be empty."),
    CoreError::InvalidOrdering(s) => (StatusCode::BAD_REQUEST, format!("Invalid ordering: {s:?}.")),

    CoreError::PermissionDenied(_) => (
      StatusCode::FORBIDDEN,
      "You do not have permission to perform this action.".to_owned(),
    ),

    CoreError::NotFollowing(_) => {
      (StatusCode::NOT_FOUND, "You are not following this profile.".to_owned())
    }
    CoreError::ProfileNotFound(_)
    | CoreError::PieceNotFound(_)
    | CoreError::RatingNotFound(_) => (StatusCode::NOT_FOUND, "Not found.".to_owned()),

    CoreError::Store(_) => (
      StatusCode::INTERNAL_SERVER_ERROR,
      "A server error occurred.".to_owned(),
    ),
  }
}

fn capitalise(s: &str) -> String {
  let mut chars = s.chars();
  match chars.next() {
    Some(first) => format!("{}{}.", first.to_uppercase(), chars.as_str()),
    None => String::new(),
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, detail) = self.status_and_detail();
    if status.is_server_error() {
      tracing::error!(error = %self, "request failed");
    }

    let mut res = (status, Json(json!({ "detail": detail }))).into_response();
    if status == StatusCode::UNAUTHORIZED {
      res.headers_mut().insert(
        header::WWW_AUTHENTICATE,
        HeaderValue::from_static("Basic realm=\"stitch\""),
      );
    }
    res
  }
}
