//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as fixed-width RFC 3339 strings (microsecond
//! precision, `Z` suffix) so that lexical order matches chronological order.
//! UUIDs are stored as hyphenated lowercase strings. Enums are stored as their
//! lowercase names.

use chrono::{DateTime, SecondsFormat, SubsecRound as _, Utc};
use rusqlite::Row;
use stitch_core::{
  piece::{ArtType, Comment, CommentView, Piece, PieceCard, Rating},
  profile::{Credentials, Profile, ProfileCard},
  social::{FollowEdge, InteractionType, Notification, NotificationView},
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ────────────────────────────────────────────────────────────

/// The current time at the precision the store keeps.
pub fn now() -> DateTime<Utc> { Utc::now().trunc_subsecs(6) }

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

fn decode_opt_dt(s: Option<&str>) -> Result<Option<DateTime<Utc>>> {
  s.map(decode_dt).transpose()
}

// ─── Enums ────────────────────────────────────────────────────────────────────

pub fn decode_art_type(s: &str) -> Result<ArtType> {
  s.parse().map_err(|_| Error::UnknownVariant {
    kind:  "art type",
    value: s.to_owned(),
  })
}

pub fn decode_interaction_type(s: &str) -> Result<InteractionType> {
  s.parse().map_err(|_| Error::UnknownVariant {
    kind:  "interaction type",
    value: s.to_owned(),
  })
}

// ─── Row types ───────────────────────────────────────────────────────────────
//
// Each `Raw*` type holds the strings read directly from a row; `read` pulls
// them out starting at a column offset so the same reader serves joins.

pub struct RawCredentials {
  pub profile_id:    String,
  pub password_hash: String,
}

impl RawCredentials {
  pub fn into_credentials(self) -> Result<Credentials> {
    Ok(Credentials {
      profile_id:    decode_uuid(&self.profile_id)?,
      password_hash: self.password_hash,
    })
  }
}

/// `profiles` columns, in table order.
pub const PROFILE_COLUMNS: usize = 7;

pub struct RawProfile {
  pub profile_id:                 String,
  pub account_id:                 String,
  pub biography:                  String,
  pub image:                      String,
  pub last_visited_notifications: Option<String>,
  pub created_at:                 String,
  pub updated_at:                 String,
}

impl RawProfile {
  pub fn read(row: &Row<'_>, at: usize) -> rusqlite::Result<Self> {
    Ok(Self {
      profile_id:                 row.get(at)?,
      account_id:                 row.get(at + 1)?,
      biography:                  row.get(at + 2)?,
      image:                      row.get(at + 3)?,
      last_visited_notifications: row.get(at + 4)?,
      created_at:                 row.get(at + 5)?,
      updated_at:                 row.get(at + 6)?,
    })
  }

  pub fn into_profile(self) -> Result<Profile> {
    Ok(Profile {
      profile_id:                 decode_uuid(&self.profile_id)?,
      account_id:                 decode_uuid(&self.account_id)?,
      biography:                  self.biography,
      image:                      self.image,
      last_visited_notifications: decode_opt_dt(self.last_visited_notifications.as_deref())?,
      created_at:                 decode_dt(&self.created_at)?,
      updated_at:                 decode_dt(&self.updated_at)?,
    })
  }
}

/// A profile card read as `profile_id, first_name, last_name, image`.
pub struct RawCard {
  pub profile_id: String,
  pub first_name: String,
  pub last_name:  String,
  pub image:      String,
}

impl RawCard {
  pub fn read(row: &Row<'_>, at: usize) -> rusqlite::Result<Self> {
    Ok(Self {
      profile_id: row.get(at)?,
      first_name: row.get(at + 1)?,
      last_name:  row.get(at + 2)?,
      image:      row.get(at + 3)?,
    })
  }

  pub fn into_card(self) -> Result<ProfileCard> {
    Ok(ProfileCard {
      profile_id: decode_uuid(&self.profile_id)?,
      first_name: self.first_name,
      last_name:  self.last_name,
      image:      self.image,
    })
  }
}

/// `pieces` columns, in table order.
pub const PIECE_COLUMNS: usize = 8;

pub struct RawPiece {
  pub piece_id:   String,
  pub profile_id: String,
  pub title:      String,
  pub image:      String,
  pub art_type:   String,
  pub featured:   bool,
  pub created_at: String,
  pub updated_at: String,
}

impl RawPiece {
  pub fn read(row: &Row<'_>, at: usize) -> rusqlite::Result<Self> {
    Ok(Self {
      piece_id:   row.get(at)?,
      profile_id: row.get(at + 1)?,
      title:      row.get(at + 2)?,
      image:      row.get(at + 3)?,
      art_type:   row.get(at + 4)?,
      featured:   row.get(at + 5)?,
      created_at: row.get(at + 6)?,
      updated_at: row.get(at + 7)?,
    })
  }

  pub fn into_piece(self) -> Result<Piece> {
    Ok(Piece {
      piece_id:   decode_uuid(&self.piece_id)?,
      profile_id: decode_uuid(&self.profile_id)?,
      title:      self.title,
      image:      self.image,
      art_type:   decode_art_type(&self.art_type)?,
      featured:   self.featured,
      created_at: decode_dt(&self.created_at)?,
      updated_at: decode_dt(&self.updated_at)?,
    })
  }
}

pub struct RawRating {
  pub rating_id:  String,
  pub profile_id: String,
  pub piece_id:   String,
  pub score:      u8,
  pub created_at: String,
  pub updated_at: String,
}

impl RawRating {
  pub fn read(row: &Row<'_>, at: usize) -> rusqlite::Result<Self> {
    Ok(Self {
      rating_id:  row.get(at)?,
      profile_id: row.get(at + 1)?,
      piece_id:   row.get(at + 2)?,
      score:      row.get(at + 3)?,
      created_at: row.get(at + 4)?,
      updated_at: row.get(at + 5)?,
    })
  }

  /// Read a rating from a LEFT JOIN; a NULL id means no row matched.
  pub fn read_optional(row: &Row<'_>, at: usize) -> rusqlite::Result<Option<Self>> {
    let id: Option<String> = row.get(at)?;
    match id {
      Some(_) => Self::read(row, at).map(Some),
      None => Ok(None),
    }
  }

  pub fn into_rating(self) -> Result<Rating> {
    Ok(Rating {
      rating_id:  decode_uuid(&self.rating_id)?,
      profile_id: decode_uuid(&self.profile_id)?,
      piece_id:   decode_uuid(&self.piece_id)?,
      score:      self.score,
      created_at: decode_dt(&self.created_at)?,
      updated_at: decode_dt(&self.updated_at)?,
    })
  }
}

/// `comments` columns, in table order.
pub const COMMENT_COLUMNS: usize = 5;

pub struct RawComment {
  pub comment_id: String,
  pub piece_id:   String,
  pub profile_id: String,
  pub content:    String,
  pub created_at: String,
}

impl RawComment {
  pub fn read(row: &Row<'_>, at: usize) -> rusqlite::Result<Self> {
    Ok(Self {
      comment_id: row.get(at)?,
      piece_id:   row.get(at + 1)?,
      profile_id: row.get(at + 2)?,
      content:    row.get(at + 3)?,
      created_at: row.get(at + 4)?,
    })
  }

  pub fn into_comment(self) -> Result<Comment> {
    Ok(Comment {
      comment_id: decode_uuid(&self.comment_id)?,
      piece_id:   decode_uuid(&self.piece_id)?,
      profile_id: decode_uuid(&self.profile_id)?,
      content:    self.content,
      created_at: decode_dt(&self.created_at)?,
    })
  }
}

pub struct RawCommentView {
  pub comment: RawComment,
  pub author:  RawCard,
}

impl RawCommentView {
  pub fn into_view(self) -> Result<CommentView> {
    Ok(CommentView {
      comment: self.comment.into_comment()?,
      author:  self.author.into_card()?,
    })
  }
}

pub struct RawFollow {
  pub follow_id:   String,
  pub follower_id: String,
  pub followed_id: String,
  pub created_at:  String,
}

impl RawFollow {
  pub fn read(row: &Row<'_>, at: usize) -> rusqlite::Result<Self> {
    Ok(Self {
      follow_id:   row.get(at)?,
      follower_id: row.get(at + 1)?,
      followed_id: row.get(at + 2)?,
      created_at:  row.get(at + 3)?,
    })
  }

  pub fn into_edge(self) -> Result<FollowEdge> {
    Ok(FollowEdge {
      follow_id:   decode_uuid(&self.follow_id)?,
      follower_id: decode_uuid(&self.follower_id)?,
      followed_id: decode_uuid(&self.followed_id)?,
      created_at:  decode_dt(&self.created_at)?,
    })
  }
}

/// `notifications` columns, in table order.
pub const NOTIFICATION_COLUMNS: usize = 6;

pub struct RawNotification {
  pub notification_id:  String,
  pub actor_id:         String,
  pub recipient_id:     String,
  pub interaction_type: String,
  pub piece_id:         Option<String>,
  pub created_at:       String,
}

impl RawNotification {
  pub fn read(row: &Row<'_>, at: usize) -> rusqlite::Result<Self> {
    Ok(Self {
      notification_id:  row.get(at)?,
      actor_id:         row.get(at + 1)?,
      recipient_id:     row.get(at + 2)?,
      interaction_type: row.get(at + 3)?,
      piece_id:         row.get(at + 4)?,
      created_at:       row.get(at + 5)?,
    })
  }

  pub fn into_notification(self) -> Result<Notification> {
    Ok(Notification {
      notification_id:  decode_uuid(&self.notification_id)?,
      actor_id:         decode_uuid(&self.actor_id)?,
      recipient_id:     decode_uuid(&self.recipient_id)?,
      interaction_type: decode_interaction_type(&self.interaction_type)?,
      piece_id:         self.piece_id.as_deref().map(decode_uuid).transpose()?,
      created_at:       decode_dt(&self.created_at)?,
    })
  }
}

pub struct RawNotificationView {
  pub notification: RawNotification,
  pub actor:        RawCard,
  /// `(piece_id, title, image)`; absent for follows.
  pub piece:        Option<(String, String, String)>,
}

impl RawNotificationView {
  pub fn into_view(self) -> Result<NotificationView> {
    let piece = match self.piece {
      Some((id, title, image)) => Some(PieceCard { piece_id: decode_uuid(&id)?, title, image }),
      None => None,
    };
    Ok(NotificationView {
      notification: self.notification.into_notification()?,
      actor:        self.actor.into_card()?,
      piece,
    })
  }
}
