//! Ownership and uniqueness checks on writes.
//!
//! Every function here is pure: callers fetch the records involved and the
//! guard decides. Uniqueness pre-checks are advisory; the store's
//! constraints are the final authority.

use uuid::Uuid;

use crate::{
  Error, Result,
  piece::{MAX_SCORE, MAX_TITLE_LEN, MIN_SCORE, NewRating, Piece, Rating},
  profile::Profile,
};

/// What the caller intends to do with an existing record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
  Read,
  Update,
  Delete,
}

impl Operation {
  fn mutates(self) -> bool { !matches!(self, Self::Read) }
}

/// Check a new rating by `caller` against `piece`.
///
/// `existing` is the caller's current rating of the piece, if the caller
/// looked one up. Self-rating is rejected before anything else, so it fails
/// whatever the score.
pub fn validate_rating(
  caller: Uuid,
  piece: &Piece,
  existing: Option<&Rating>,
  score: i64,
) -> Result<NewRating> {
  if piece.profile_id == caller {
    return Err(Error::SelfRating);
  }
  if existing.is_some() {
    return Err(Error::DuplicateRating(piece.piece_id));
  }
  Ok(NewRating {
    profile_id: caller,
    piece_id:   piece.piece_id,
    score:      validate_score(score)?,
  })
}

/// Narrow a requested score to the stored type.
pub fn validate_score(score: i64) -> Result<u8> {
  if !(MIN_SCORE..=MAX_SCORE).contains(&score) {
    return Err(Error::ScoreOutOfRange(score));
  }
  u8::try_from(score).map_err(|_| Error::ScoreOutOfRange(score))
}

pub fn validate_piece_mutation(
  caller: Uuid,
  piece: &Piece,
  op: Operation,
) -> Result<()> {
  if op.mutates() && piece.profile_id != caller {
    return Err(Error::PermissionDenied("only the owner may modify this piece"));
  }
  Ok(())
}

pub fn validate_rating_mutation(
  caller: Uuid,
  rating: &Rating,
  op: Operation,
) -> Result<()> {
  if op.mutates() && rating.profile_id != caller {
    return Err(Error::PermissionDenied("only the rater may modify this rating"));
  }
  Ok(())
}

pub fn validate_profile_mutation(
  caller: Uuid,
  profile: &Profile,
  op: Operation,
) -> Result<()> {
  if op.mutates() && profile.profile_id != caller {
    return Err(Error::PermissionDenied("you may only modify your own profile"));
  }
  Ok(())
}

/// Trim and bound a piece title.
pub fn validate_title(title: &str) -> Result<String> {
  let title = title.trim();
  if title.is_empty() {
    return Err(Error::InvalidTitle("title must not be empty"));
  }
  if title.chars().count() > MAX_TITLE_LEN {
    return Err(Error::InvalidTitle("title is longer than 75 characters"));
  }
  Ok(title.to_owned())
}

pub fn validate_comment(content: &str) -> Result<String> {
  let content = content.trim();
  if content.is_empty() {
    return Err(Error::EmptyComment);
  }
  Ok(content.to_owned())
}
