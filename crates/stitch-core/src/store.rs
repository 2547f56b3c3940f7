//! The `SocialStore` trait.
//!
//! The trait is implemented by storage backends (e.g. `stitch-store-sqlite`).
//! The rules in this crate and the HTTP layer depend on this abstraction, not
//! on any concrete backend.
//!
//! Backends own every durable record and every uniqueness constraint. Read
//! methods returning `*View` types compute their aggregates from current rows
//! on every call; nothing derived is ever stored.

use std::future::Future;

use uuid::Uuid;

use crate::{
  piece::{
    Comment, CommentView, NewComment, NewPiece, NewRating, Piece, PieceUpdate,
    PieceView, Rating,
  },
  profile::{Credentials, NewAccount, Profile, ProfileUpdate, ProfileView},
  query::{
    CommentQuery, FollowQuery, NotificationQuery, Page, PieceQuery, ProfileQuery,
    RatingQuery,
  },
  social::{
    FollowEdge, FollowerEntry, FollowingEntry, NewNotification, Notification,
    NotificationView,
  },
};

/// Abstraction over a Stitch Space store backend.
///
/// Backend errors convert into [`crate::Error`]; uniqueness violations must
/// surface as [`crate::Error::Conflict`] so callers can translate races into
/// the same errors their pre-checks produce.
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes (e.g. tokio with `axum`).
pub trait SocialStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + Into<crate::Error> + 'static;

  // ── Identity ──────────────────────────────────────────────────────────

  /// Create an account and its profile in one transaction.
  fn register(
    &self,
    account: NewAccount,
  ) -> impl Future<Output = Result<Profile, Self::Error>> + Send + '_;

  /// Look up credentials by (case-insensitive) e-mail.
  fn credentials(
    &self,
    email: String,
  ) -> impl Future<Output = Result<Option<Credentials>, Self::Error>> + Send + '_;

  /// Delete an account; its profile and everything the profile owns
  /// cascade. Returns `false` if the account did not exist.
  fn delete_account(
    &self,
    account_id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  // ── Profiles ──────────────────────────────────────────────────────────

  fn get_profile(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Profile>, Self::Error>> + Send + '_;

  /// A profile with names and follower/following/piece counts.
  fn profile_view(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<ProfileView>, Self::Error>> + Send + '_;

  fn list_profiles(
    &self,
    query: ProfileQuery,
  ) -> impl Future<Output = Result<Page<ProfileView>, Self::Error>> + Send + '_;

  /// Apply a partial update. Fails with `ProfileNotFound` if missing.
  fn update_profile(
    &self,
    id: Uuid,
    update: ProfileUpdate,
  ) -> impl Future<Output = Result<Profile, Self::Error>> + Send + '_;

  // ── Follow edges ──────────────────────────────────────────────────────

  fn find_follow(
    &self,
    follower: Uuid,
    followed: Uuid,
  ) -> impl Future<Output = Result<Option<FollowEdge>, Self::Error>> + Send + '_;

  /// Insert an edge. A duplicate pair is a `Conflict(Constraint::Follow)`.
  fn insert_follow(
    &self,
    follower: Uuid,
    followed: Uuid,
  ) -> impl Future<Output = Result<FollowEdge, Self::Error>> + Send + '_;

  /// Returns `false` if the edge did not exist.
  fn delete_follow(
    &self,
    follow_id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// Edges where `profile` is followed, resolved to the follower.
  fn list_followers(
    &self,
    profile: Uuid,
    query: FollowQuery,
  ) -> impl Future<Output = Result<Page<FollowerEntry>, Self::Error>> + Send + '_;

  /// Edges where `profile` is the follower, resolved to the followed side.
  fn list_following(
    &self,
    profile: Uuid,
    query: FollowQuery,
  ) -> impl Future<Output = Result<Page<FollowingEntry>, Self::Error>> + Send + '_;

  /// Ids of every profile `profile` follows.
  fn followed_ids(
    &self,
    profile: Uuid,
  ) -> impl Future<Output = Result<Vec<Uuid>, Self::Error>> + Send + '_;

  // ── Pieces ────────────────────────────────────────────────────────────

  fn insert_piece(
    &self,
    owner: Uuid,
    piece: NewPiece,
  ) -> impl Future<Output = Result<Piece, Self::Error>> + Send + '_;

  fn get_piece(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Piece>, Self::Error>> + Send + '_;

  /// A piece with its aggregates and, if `viewer` is given, the viewer's
  /// own rating.
  fn piece_view(
    &self,
    id: Uuid,
    viewer: Option<Uuid>,
  ) -> impl Future<Output = Result<Option<PieceView>, Self::Error>> + Send + '_;

  fn list_pieces(
    &self,
    query: PieceQuery,
  ) -> impl Future<Output = Result<Page<PieceView>, Self::Error>> + Send + '_;

  /// Apply a partial update. Fails with `PieceNotFound` if missing.
  fn update_piece(
    &self,
    id: Uuid,
    update: PieceUpdate,
  ) -> impl Future<Output = Result<Piece, Self::Error>> + Send + '_;

  /// Operator curation of the featured flag.
  fn set_featured(
    &self,
    id: Uuid,
    featured: bool,
  ) -> impl Future<Output = Result<Piece, Self::Error>> + Send + '_;

  /// Returns `false` if the piece did not exist. Comments, ratings and
  /// notifications referencing the piece cascade.
  fn delete_piece(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  // ── Comments ──────────────────────────────────────────────────────────

  fn insert_comment(
    &self,
    comment: NewComment,
  ) -> impl Future<Output = Result<Comment, Self::Error>> + Send + '_;

  fn list_comments(
    &self,
    piece: Uuid,
    query: CommentQuery,
  ) -> impl Future<Output = Result<Page<CommentView>, Self::Error>> + Send + '_;

  // ── Ratings ───────────────────────────────────────────────────────────

  /// Insert a validated rating. A second rating for the same (profile,
  /// piece) is a `Conflict(Constraint::Rating)`.
  fn insert_rating(
    &self,
    rating: NewRating,
  ) -> impl Future<Output = Result<Rating, Self::Error>> + Send + '_;

  fn get_rating(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Rating>, Self::Error>> + Send + '_;

  /// The rating `profile` gave `piece`, if any.
  fn find_rating(
    &self,
    profile: Uuid,
    piece: Uuid,
  ) -> impl Future<Output = Result<Option<Rating>, Self::Error>> + Send + '_;

  /// Fails with `RatingNotFound` if missing.
  fn update_rating(
    &self,
    id: Uuid,
    score: u8,
  ) -> impl Future<Output = Result<Rating, Self::Error>> + Send + '_;

  fn delete_rating(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  fn list_ratings(
    &self,
    query: RatingQuery,
  ) -> impl Future<Output = Result<Page<Rating>, Self::Error>> + Send + '_;

  // ── Notifications ─────────────────────────────────────────────────────

  fn insert_notification(
    &self,
    notification: NewNotification,
  ) -> impl Future<Output = Result<Notification, Self::Error>> + Send + '_;

  /// Notifications addressed to `recipient`.
  fn list_notifications(
    &self,
    recipient: Uuid,
    query: NotificationQuery,
  ) -> impl Future<Output = Result<Page<NotificationView>, Self::Error>> + Send + '_;
}
