//! Composed read views: the piece feed, the piece list and detail, the
//! notification feed, and the plain listings the API exposes alongside them.

use uuid::Uuid;

use crate::{
  Error, Result,
  error::backend,
  piece::{CommentView, PieceView, Rating},
  profile::ProfileView,
  query::{CommentQuery, NotificationQuery, Page, PieceQuery, ProfileQuery, RatingQuery},
  social::NotificationEntry,
  store::SocialStore,
};

/// Pieces owned by the profiles `caller` follows, newest first unless the
/// query says otherwise. Each piece carries the caller's own rating.
pub async fn piece_feed<S: SocialStore>(
  store: &S,
  caller: Uuid,
  mut query: PieceQuery,
) -> Result<Page<PieceView>> {
  query.followed_by = Some(caller);
  query.viewer = Some(caller);
  store.list_pieces(query).await.map_err(backend)
}

/// The full piece listing with whatever filters, search and ordering the
/// query carries.
pub async fn piece_list<S: SocialStore>(
  store: &S,
  caller: Option<Uuid>,
  mut query: PieceQuery,
) -> Result<Page<PieceView>> {
  query.viewer = caller;
  store.list_pieces(query).await.map_err(backend)
}

/// One piece with its aggregates; `user_rating` is filled in only for an
/// authenticated caller who has rated it.
pub async fn piece_detail<S: SocialStore>(
  store: &S,
  caller: Option<Uuid>,
  piece_id: Uuid,
) -> Result<PieceView> {
  store
    .piece_view(piece_id, caller)
    .await
    .map_err(backend)?
    .ok_or(Error::PieceNotFound(piece_id))
}

/// Notifications addressed to `profile`. Only the recipient may read them.
pub async fn notification_feed<S: SocialStore>(
  store: &S,
  caller: Uuid,
  profile: Uuid,
  query: NotificationQuery,
) -> Result<Page<NotificationEntry>> {
  let recipient = store
    .get_profile(profile)
    .await
    .map_err(backend)?
    .ok_or(Error::ProfileNotFound(profile))?;

  if recipient.profile_id != caller {
    return Err(Error::PermissionDenied("notifications are only visible to their recipient"));
  }

  let last_visit = recipient.last_visited_notifications;
  let page = store
    .list_notifications(profile, query)
    .await
    .map_err(backend)?;

  Ok(page.map(|view| NotificationEntry {
    message: view.message(),
    unread:  last_visit.is_none_or(|at| view.notification.created_at > at),
    view,
  }))
}

// ─── Plain listings ──────────────────────────────────────────────────────────

pub async fn profile_list<S: SocialStore>(
  store: &S,
  query: ProfileQuery,
) -> Result<Page<ProfileView>> {
  store.list_profiles(query).await.map_err(backend)
}

pub async fn profile_detail<S: SocialStore>(store: &S, profile: Uuid) -> Result<ProfileView> {
  store
    .profile_view(profile)
    .await
    .map_err(backend)?
    .ok_or(Error::ProfileNotFound(profile))
}

/// Comments on an existing piece.
pub async fn piece_comments<S: SocialStore>(
  store: &S,
  piece_id: Uuid,
  query: CommentQuery,
) -> Result<Page<CommentView>> {
  require_piece(store, piece_id).await?;
  store.list_comments(piece_id, query).await.map_err(backend)
}

/// Ratings of an existing piece; any `piece` filter on the query is replaced.
pub async fn piece_ratings<S: SocialStore>(
  store: &S,
  piece_id: Uuid,
  mut query: RatingQuery,
) -> Result<Page<Rating>> {
  require_piece(store, piece_id).await?;
  query.piece = Some(piece_id);
  store.list_ratings(query).await.map_err(backend)
}

pub async fn rating_list<S: SocialStore>(store: &S, query: RatingQuery) -> Result<Page<Rating>> {
  store.list_ratings(query).await.map_err(backend)
}

pub async fn rating_detail<S: SocialStore>(store: &S, rating_id: Uuid) -> Result<Rating> {
  store
    .get_rating(rating_id)
    .await
    .map_err(backend)?
    .ok_or(Error::RatingNotFound(rating_id))
}

async fn require_piece<S: SocialStore>(store: &S, piece_id: Uuid) -> Result<()> {
  store
    .get_piece(piece_id)
    .await
    .map_err(backend)?
    .ok_or(Error::PieceNotFound(piece_id))?;
  Ok(())
}
