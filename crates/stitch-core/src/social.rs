//! Follow edges and notifications.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  piece::PieceCard,
  profile::{ProfileCard, ProfileView},
};

// ─── Follow edges ────────────────────────────────────────────────────────────

/// "`follower_id` follows `followed_id`". Directed; there is no implicit
/// reverse edge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FollowEdge {
  pub follow_id:   Uuid,
  pub follower_id: Uuid,
  pub followed_id: Uuid,
  pub created_at:  DateTime<Utc>,
}

/// One row of a followers listing: only the follower side is rendered.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FollowerEntry {
  pub follow_id:  Uuid,
  pub follower:   ProfileView,
  pub created_at: DateTime<Utc>,
}

/// One row of a following listing: only the followed side is rendered.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FollowingEntry {
  pub follow_id:  Uuid,
  pub followed:   ProfileView,
  pub created_at: DateTime<Utc>,
}

// ─── Notifications ───────────────────────────────────────────────────────────

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
pub enum InteractionType {
  Comment,
  Rating,
  Follow,
}

impl InteractionType {
  fn verb(self) -> &'static str {
    match self {
      Self::Comment => "commented on",
      Self::Rating => "rated",
      Self::Follow => "followed",
    }
  }
}

/// A durable record of an interaction directed at `recipient_id`.
/// Immutable once written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
  pub notification_id:  Uuid,
  pub actor_id:         Uuid,
  pub recipient_id:     Uuid,
  pub interaction_type: InteractionType,
  /// `None` only for [`InteractionType::Follow`].
  pub piece_id:         Option<Uuid>,
  pub created_at:       DateTime<Utc>,
}

/// Input to [`crate::store::SocialStore::insert_notification`]. Built only by
/// [`crate::notify::dispatch`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewNotification {
  pub actor_id:         Uuid,
  pub recipient_id:     Uuid,
  pub interaction_type: InteractionType,
  pub piece_id:         Option<Uuid>,
}

/// A notification joined with the actor and piece it refers to.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationView {
  #[serde(flatten)]
  pub notification: Notification,
  pub actor:        ProfileCard,
  pub piece:        Option<PieceCard>,
}

impl NotificationView {
  /// Human-readable summary, e.g. `Ada commented on 'Blue Socks'`.
  pub fn message(&self) -> String {
    let name = self.actor.display_name();
    let verb = self.notification.interaction_type.verb();
    match &self.piece {
      Some(piece) => format!("{name} {verb} '{}'", piece.title),
      None => format!("{name} {verb} you"),
    }
  }
}

/// One row of a notification feed.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationEntry {
  #[serde(flatten)]
  pub view:    NotificationView,
  pub message: String,
  /// Newer than the recipient's last visit to the feed.
  pub unread:  bool,
}
