//! Profiles and the identity records they hang off.
//!
//! An account is owned by the identity collaborator (credentials, names,
//! e-mail). A [`Profile`] is the in-domain representation of that account and
//! exists exactly once per account; both rows are written in the same
//! transaction by [`crate::store::SocialStore::register`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Image used when a profile is created without one.
pub const DEFAULT_PROFILE_IMAGE: &str = "https://picsum.photos/id/400/200";

// ─── Identity ────────────────────────────────────────────────────────────────

/// Input to [`crate::store::SocialStore::register`].
#[derive(Debug, Clone)]
pub struct NewAccount {
  pub email:         String,
  pub first_name:    String,
  pub last_name:     String,
  pub password_hash: String,
}

/// What the API needs to verify a caller and bind them to a profile.
#[derive(Debug, Clone)]
pub struct Credentials {
  pub profile_id:    Uuid,
  pub password_hash: String,
}

// ─── Profile ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
  pub profile_id:                 Uuid,
  pub account_id:                 Uuid,
  pub biography:                  String,
  pub image:                      String,
  /// Set by the client when the owner last opened their notification feed.
  pub last_visited_notifications: Option<DateTime<Utc>>,
  pub created_at:                 DateTime<Utc>,
  pub updated_at:                 DateTime<Utc>,
}

/// Partial update of a profile and the names/e-mail on its account.
/// `None` leaves a field untouched.
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
  pub first_name:                 Option<String>,
  pub last_name:                  Option<String>,
  pub email:                      Option<String>,
  pub biography:                  Option<String>,
  pub image:                      Option<String>,
  pub last_visited_notifications: Option<DateTime<Utc>>,
}

/// A profile annotated with identity names and social counts, computed at
/// read time.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileView {
  #[serde(flatten)]
  pub profile:         Profile,
  pub first_name:      String,
  pub last_name:       String,
  pub email:           String,
  /// Edges where this profile is followed.
  pub follower_count:  u64,
  /// Edges where this profile is the follower.
  pub following_count: u64,
  pub piece_count:     u64,
}

/// The minimal owner/author/actor rendering embedded in other views.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileCard {
  pub profile_id: Uuid,
  pub first_name: String,
  pub last_name:  String,
  pub image:      String,
}

impl ProfileCard {
  /// Name used in notification messages.
  pub fn display_name(&self) -> &str {
    if self.first_name.is_empty() {
      "Someone"
    } else {
      &self.first_name
    }
  }
}
