//! Writes on pieces, comments, ratings and profiles.
//!
//! Each function loads the records the guard needs, asks the guard, performs
//! the write, and (for comments and ratings) dispatches a notification to the
//! piece owner once the write has succeeded.

use uuid::Uuid;

use crate::{
  Constraint, Error, Result,
  error::backend,
  guard::{self, Operation},
  notify::{self, Outcome},
  piece::{Comment, NewComment, NewPiece, Piece, PieceUpdate, Rating},
  profile::{Profile, ProfileUpdate},
  social::InteractionType,
  store::SocialStore,
};

async fn load_piece<S: SocialStore>(store: &S, id: Uuid) -> Result<Piece> {
  store
    .get_piece(id)
    .await
    .map_err(backend)?
    .ok_or(Error::PieceNotFound(id))
}

async fn load_rating<S: SocialStore>(store: &S, id: Uuid) -> Result<Rating> {
  store
    .get_rating(id)
    .await
    .map_err(backend)?
    .ok_or(Error::RatingNotFound(id))
}

async fn load_profile<S: SocialStore>(store: &S, id: Uuid) -> Result<Profile> {
  store
    .get_profile(id)
    .await
    .map_err(backend)?
    .ok_or(Error::ProfileNotFound(id))
}

// ─── Pieces ──────────────────────────────────────────────────────────────────

/// Create a piece owned by `caller`.
pub async fn create_piece<S: SocialStore>(
  store: &S,
  caller: Uuid,
  mut piece: NewPiece,
) -> Result<Piece> {
  piece.title = guard::validate_title(&piece.title)?;
  let piece = store.insert_piece(caller, piece).await.map_err(backend)?;
  tracing::debug!(piece = %piece.piece_id, owner = %caller, "piece created");
  Ok(piece)
}

pub async fn update_piece<S: SocialStore>(
  store: &S,
  caller: Uuid,
  piece_id: Uuid,
  mut update: PieceUpdate,
) -> Result<Piece> {
  let piece = load_piece(store, piece_id).await?;
  guard::validate_piece_mutation(caller, &piece, Operation::Update)?;

  update.title = update.title.as_deref().map(guard::validate_title).transpose()?;
  store.update_piece(piece_id, update).await.map_err(backend)
}

pub async fn delete_piece<S: SocialStore>(
  store: &S,
  caller: Uuid,
  piece_id: Uuid,
) -> Result<()> {
  let piece = load_piece(store, piece_id).await?;
  guard::validate_piece_mutation(caller, &piece, Operation::Delete)?;

  if !store.delete_piece(piece_id).await.map_err(backend)? {
    return Err(Error::PieceNotFound(piece_id));
  }
  Ok(())
}

// ─── Comments ────────────────────────────────────────────────────────────────

/// `caller` comments on a piece; the owner is notified unless it is the
/// caller's own piece.
pub async fn comment<S: SocialStore>(
  store: &S,
  caller: Uuid,
  piece_id: Uuid,
  content: &str,
) -> Result<Outcome<Comment>> {
  let content = guard::validate_comment(content)?;
  let piece = load_piece(store, piece_id).await?;

  let comment = store
    .insert_comment(NewComment { piece_id, profile_id: caller, content })
    .await
    .map_err(backend)?;
  tracing::debug!(piece = %piece_id, author = %caller, "comment created");

  let notification = notify::dispatch(
    store,
    caller,
    piece.profile_id,
    InteractionType::Comment,
    Some(piece_id),
  )
  .await;

  Ok(Outcome { record: comment, notification })
}

// ─── Ratings ─────────────────────────────────────────────────────────────────

/// `caller` rates a piece once. The owner is notified on success.
pub async fn rate<S: SocialStore>(
  store: &S,
  caller: Uuid,
  piece_id: Uuid,
  score: i64,
) -> Result<Outcome<Rating>> {
  let piece = load_piece(store, piece_id).await?;
  let existing = store
    .find_rating(caller, piece_id)
    .await
    .map_err(backend)?;
  let new = guard::validate_rating(caller, &piece, existing.as_ref(), score)?;

  let rating = store.insert_rating(new).await.map_err(|e| match backend(e) {
    Error::Conflict(Constraint::Rating) => Error::DuplicateRating(piece_id),
    other => other,
  })?;
  tracing::debug!(piece = %piece_id, rater = %caller, score = rating.score, "rating created");

  let notification = notify::dispatch(
    store,
    caller,
    piece.profile_id,
    InteractionType::Rating,
    Some(piece_id),
  )
  .await;

  Ok(Outcome { record: rating, notification })
}

pub async fn update_rating<S: SocialStore>(
  store: &S,
  caller: Uuid,
  rating_id: Uuid,
  score: i64,
) -> Result<Rating> {
  let rating = load_rating(store, rating_id).await?;
  guard::validate_rating_mutation(caller, &rating, Operation::Update)?;
  let score = guard::validate_score(score)?;
  store.update_rating(rating_id, score).await.map_err(backend)
}

pub async fn delete_rating<S: SocialStore>(
  store: &S,
  caller: Uuid,
  rating_id: Uuid,
) -> Result<()> {
  let rating = load_rating(store, rating_id).await?;
  guard::validate_rating_mutation(caller, &rating, Operation::Delete)?;

  if !store.delete_rating(rating_id).await.map_err(backend)? {
    return Err(Error::RatingNotFound(rating_id));
  }
  Ok(())
}

// ─── Profiles ────────────────────────────────────────────────────────────────

pub async fn update_profile<S: SocialStore>(
  store: &S,
  caller: Uuid,
  profile_id: Uuid,
  update: ProfileUpdate,
) -> Result<Profile> {
  let profile = load_profile(store, profile_id).await?;
  guard::validate_profile_mutation(caller, &profile, Operation::Update)?;
  store.update_profile(profile_id, update).await.map_err(backend)
}

/// Delete the caller's profile together with its account.
pub async fn delete_profile<S: SocialStore>(
  store: &S,
  caller: Uuid,
  profile_id: Uuid,
) -> Result<()> {
  let profile = load_profile(store, profile_id).await?;
  guard::validate_profile_mutation(caller, &profile, Operation::Delete)?;

  if !store.delete_account(profile.account_id).await.map_err(backend)? {
    return Err(Error::ProfileNotFound(profile_id));
  }
  Ok(())
}
