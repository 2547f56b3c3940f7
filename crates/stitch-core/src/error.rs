//! Error types for `stitch-core`.

use thiserror::Error;
use uuid::Uuid;

/// The uniqueness constraint a store write collided with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum Constraint {
  /// One rating per (profile, piece).
  Rating,
  /// One edge per (follower, followed).
  Follow,
  /// Account e-mail addresses are unique.
  AccountEmail,
}

#[derive(Debug, Error)]
pub enum Error {
  #[error("profile not found: {0}")]
  ProfileNotFound(Uuid),

  #[error("piece not found: {0}")]
  PieceNotFound(Uuid),

  #[error("rating not found: {0}")]
  RatingNotFound(Uuid),

  #[error("not following profile {0}")]
  NotFollowing(Uuid),

  #[error("cannot follow yourself")]
  SelfFollow,

  #[error("already following profile {0}")]
  AlreadyFollowing(Uuid),

  #[error("cannot rate your own piece")]
  SelfRating,

  #[error("piece {0} is already rated by this profile")]
  DuplicateRating(Uuid),

  #[error("score {0} is outside 0..=5")]
  ScoreOutOfRange(i64),

  #[error("permission denied: {0}")]
  PermissionDenied(&'static str),

  #[error("invalid title: {0}")]
  InvalidTitle(&'static str),

  #[error("comment content must not be empty")]
  EmptyComment,

  #[error("invalid ordering: {0:?}")]
  InvalidOrdering(String),

  /// A store-level uniqueness constraint rejected the write.
  #[error("unique constraint violated: {0}")]
  Conflict(Constraint),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  /// Wrap an arbitrary backend error.
  pub fn store(e: impl std::error::Error + Send + Sync + 'static) -> Self {
    Self::Store(Box::new(e))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Lift a backend error into a core [`Error`].
pub(crate) fn backend<E: Into<Error>>(e: E) -> Error { e.into() }
