//! Read-path aggregates.
//!
//! Average rating, comment count, and follower/following/piece counts are
//! correlated sub-selects evaluated on every read. Nothing here is cached or
//! stored, so a view always reflects the rows committed before the query.

use rusqlite::Row;
use stitch_core::{
  piece::PieceView,
  profile::ProfileView,
  query::{Ordering, PieceField, ProfileField},
};

use crate::{
  Result,
  encode::{PIECE_COLUMNS, PROFILE_COLUMNS, RawCard, RawPiece, RawProfile, RawRating},
  listing::order_clause,
};

// ─── Profiles ────────────────────────────────────────────────────────────────

/// A profile `pr` with its account `a`.
pub const PROFILE_VIEW_FROM: &str =
  "profiles pr JOIN accounts a ON a.account_id = pr.account_id";

/// Column order matches [`RawProfileView::read`].
pub const PROFILE_VIEW_COLUMNS: &str = "
  pr.profile_id, pr.account_id, pr.biography, pr.image,
  pr.last_visited_notifications, pr.created_at, pr.updated_at,
  a.first_name, a.last_name, a.email,
  (SELECT COUNT(*) FROM follows fx WHERE fx.followed_id = pr.profile_id) AS follower_count,
  (SELECT COUNT(*) FROM follows fy WHERE fy.follower_id = pr.profile_id) AS following_count,
  (SELECT COUNT(*) FROM pieces  px WHERE px.profile_id  = pr.profile_id) AS piece_count";

pub struct RawProfileView {
  pub profile:         RawProfile,
  pub first_name:      String,
  pub last_name:       String,
  pub email:           String,
  pub follower_count:  i64,
  pub following_count: i64,
  pub piece_count:     i64,
}

impl RawProfileView {
  pub fn read(row: &Row<'_>, at: usize) -> rusqlite::Result<Self> {
    let names = at + PROFILE_COLUMNS;
    Ok(Self {
      profile:         RawProfile::read(row, at)?,
      first_name:      row.get(names)?,
      last_name:       row.get(names + 1)?,
      email:           row.get(names + 2)?,
      follower_count:  row.get(names + 3)?,
      following_count: row.get(names + 4)?,
      piece_count:     row.get(names + 5)?,
    })
  }

  pub fn into_view(self) -> Result<ProfileView> {
    Ok(ProfileView {
      profile:         self.profile.into_profile()?,
      first_name:      self.first_name,
      last_name:       self.last_name,
      email:           self.email,
      follower_count:  count(self.follower_count),
      following_count: count(self.following_count),
      piece_count:     count(self.piece_count),
    })
  }
}

pub fn profile_order(ordering: Ordering<ProfileField>) -> String {
  let expr = match ordering.field {
    ProfileField::CreatedAt => "pr.created_at",
    ProfileField::UpdatedAt => "pr.updated_at",
    ProfileField::Followers => "follower_count",
    ProfileField::Following => "following_count",
    ProfileField::Pieces => "piece_count",
  };
  order_clause(expr, ordering.direction, "pr.rowid")
}

// ─── Pieces ──────────────────────────────────────────────────────────────────

/// A piece `p` with its owner profile `op` and owner account `oa`.
pub const PIECE_VIEW_FROM: &str = "pieces p
  JOIN profiles op ON op.profile_id = p.profile_id
  JOIN accounts oa ON oa.account_id = op.account_id";

/// The viewer's own rating `ur`. Binds one parameter: the viewer id, or
/// NULL for no viewer.
pub const VIEWER_RATING_JOIN: &str =
  "LEFT JOIN ratings ur ON ur.piece_id = p.piece_id AND ur.profile_id = ?";

/// Column order matches [`RawPieceView::read`].
pub const PIECE_VIEW_COLUMNS: &str = "
  p.piece_id, p.profile_id, p.title, p.image, p.art_type, p.featured,
  p.created_at, p.updated_at,
  op.profile_id, oa.first_name, oa.last_name, op.image,
  COALESCE((SELECT AVG(rx.score) FROM ratings rx WHERE rx.piece_id = p.piece_id), 0.0)
    AS avg_rating,
  (SELECT COUNT(*) FROM comments cx WHERE cx.piece_id = p.piece_id) AS comment_count,
  ur.rating_id, ur.profile_id, ur.piece_id, ur.score, ur.created_at, ur.updated_at";

pub struct RawPieceView {
  pub piece:         RawPiece,
  pub owner:         RawCard,
  pub avg_rating:    f64,
  pub comment_count: i64,
  pub user_rating:   Option<RawRating>,
}

impl RawPieceView {
  pub fn read(row: &Row<'_>) -> rusqlite::Result<Self> {
    let owner = PIECE_COLUMNS;
    let aggregates = owner + 4;
    Ok(Self {
      piece:         RawPiece::read(row, 0)?,
      owner:         RawCard::read(row, owner)?,
      avg_rating:    row.get(aggregates)?,
      comment_count: row.get(aggregates + 1)?,
      user_rating:   RawRating::read_optional(row, aggregates + 2)?,
    })
  }

  pub fn into_view(self) -> Result<PieceView> {
    Ok(PieceView {
      piece:         self.piece.into_piece()?,
      owner:         self.owner.into_card()?,
      avg_rating:    self.avg_rating,
      comment_count: count(self.comment_count),
      user_rating:   self.user_rating.map(RawRating::into_rating).transpose()?,
    })
  }
}

pub fn piece_order(ordering: Ordering<PieceField>) -> String {
  let expr = match ordering.field {
    PieceField::CreatedAt => "p.created_at",
    PieceField::UpdatedAt => "p.updated_at",
    PieceField::Title => "p.title COLLATE NOCASE",
    PieceField::ArtType => "p.art_type",
    PieceField::Featured => "p.featured",
    PieceField::Rating => "avg_rating",
    PieceField::CommentCount => "comment_count",
  };
  order_clause(expr, ordering.direction, "p.rowid")
}

fn count(n: i64) -> u64 { u64::try_from(n).unwrap_or_default() }
