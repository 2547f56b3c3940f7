//! Pieces and the interactions attached to them (comments and ratings).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::profile::ProfileCard;

/// Image used when a piece is created without one.
pub const DEFAULT_PIECE_IMAGE: &str = "https://picsum.photos/id/1/800/600";

/// Maximum title length, in characters.
pub const MAX_TITLE_LEN: usize = 75;

/// Inclusive score bounds for a rating.
pub const MIN_SCORE: i64 = 0;
pub const MAX_SCORE: i64 = 5;

// ─── Art type ────────────────────────────────────────────────────────────────

#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Serialize,
  Deserialize,
  strum::Display,
  strum::EnumString,
  strum::AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ArtType {
  Knitting,
  Crochet,
  Embroidery,
  Weaving,
  Dyeing,
  Other,
}

// ─── Piece ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Piece {
  pub piece_id:   Uuid,
  /// The owning profile; only it may mutate or delete the piece.
  pub profile_id: Uuid,
  pub title:      String,
  pub image:      String,
  pub art_type:   ArtType,
  /// Curated by an operator, never by the owner.
  pub featured:   bool,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

/// Input to [`crate::store::SocialStore::insert_piece`].
#[derive(Debug, Clone)]
pub struct NewPiece {
  pub title:    String,
  pub image:    Option<String>,
  pub art_type: ArtType,
}

/// Partial update of a piece. `None` leaves a field untouched.
#[derive(Debug, Clone, Default)]
pub struct PieceUpdate {
  pub title:    Option<String>,
  pub image:    Option<String>,
  pub art_type: Option<ArtType>,
}

/// A piece annotated with aggregates computed at read time.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PieceView {
  #[serde(flatten)]
  pub piece:         Piece,
  pub owner:         ProfileCard,
  /// Mean of current scores; `0.0` when the piece has no ratings.
  pub avg_rating:    f64,
  pub comment_count: u64,
  /// The viewing profile's own rating, when there is a viewer and they
  /// have rated this piece.
  pub user_rating:   Option<Rating>,
}

/// The minimal piece rendering embedded in notifications.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PieceCard {
  pub piece_id: Uuid,
  pub title:    String,
  pub image:    String,
}

// ─── Comment ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
  pub comment_id: Uuid,
  pub piece_id:   Uuid,
  pub profile_id: Uuid,
  pub content:    String,
  pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewComment {
  pub piece_id:   Uuid,
  pub profile_id: Uuid,
  pub content:    String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentView {
  #[serde(flatten)]
  pub comment: Comment,
  pub author:  ProfileCard,
}

// ─── Rating ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rating {
  pub rating_id:  Uuid,
  pub profile_id: Uuid,
  pub piece_id:   Uuid,
  pub score:      u8,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

/// A rating that has passed [`crate::guard::validate_rating`] and is ready
/// to be persisted. Only the guard constructs one outside of tests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRating {
  pub profile_id: Uuid,
  pub piece_id:   Uuid,
  pub score:      u8,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn piece_view_serialises_flat_camel_case() {
    let now = Utc::now();
    let owner = Uuid::new_v4();
    let view = PieceView {
      piece:         Piece {
        piece_id:   Uuid::new_v4(),
        profile_id: owner,
        title:      "Indigo Scarf".into(),
        image:      DEFAULT_PIECE_IMAGE.into(),
        art_type:   ArtType::Dyeing,
        featured:   false,
        created_at: now,
        updated_at: now,
      },
      owner:         ProfileCard {
        profile_id: owner,
        first_name: "Grace".into(),
        last_name:  "Hopper".into(),
        image:      String::new(),
      },
      avg_rating:    0.0,
      comment_count: 0,
      user_rating:   None,
    };

    let json = serde_json::to_value(&view).unwrap();
    assert_eq!(json["title"], "Indigo Scarf");
    assert_eq!(json["artType"], "dyeing");
    assert_eq!(json["avgRating"], 0.0);
    assert_eq!(json["owner"]["firstName"], "Grace");
    assert!(json["userRating"].is_null());
  }

  #[test]
  fn art_type_parses_lowercase() {
    assert_eq!("crochet".parse::<ArtType>().unwrap(), ArtType::Crochet);
    assert_eq!(ArtType::Embroidery.as_ref(), "embroidery");
    assert!("painting".parse::<ArtType>().is_err());
  }
}
