//! Notification dispatch.
//!
//! Notifications are a best-effort secondary record of an interaction. They
//! are written only after the interaction itself has been stored, and a
//! failed write is logged and reported but never undoes the interaction.

use uuid::Uuid;

use crate::{
  social::{InteractionType, NewNotification, Notification},
  store::SocialStore,
};

/// What happened to the notification for one interaction.
#[derive(Debug, Clone, PartialEq)]
pub enum Dispatch {
  Recorded(Notification),
  /// The actor is the recipient.
  Skipped,
  /// The write failed; the message is the store error.
  Failed(String),
}

impl Dispatch {
  pub fn notification(&self) -> Option<&Notification> {
    match self {
      Self::Recorded(n) => Some(n),
      _ => None,
    }
  }
}

/// The result of an interaction together with its notification outcome.
#[derive(Debug, Clone)]
pub struct Outcome<T> {
  pub record:       T,
  pub notification: Dispatch,
}

/// Record that `actor` interacted with `recipient` (about `piece`, for
/// comments and ratings). A no-op when `actor == recipient`.
pub async fn dispatch<S: SocialStore>(
  store: &S,
  actor: Uuid,
  recipient: Uuid,
  interaction_type: InteractionType,
  piece: Option<Uuid>,
) -> Dispatch {
  if actor == recipient {
    return Dispatch::Skipped;
  }

  let input = NewNotification {
    actor_id: actor,
    recipient_id: recipient,
    interaction_type,
    piece_id: piece,
  };

  match store.insert_notification(input).await {
    Ok(notification) => {
      tracing::debug!(
        %actor,
        %recipient,
        kind = %interaction_type,
        "notification recorded"
      );
      Dispatch::Recorded(notification)
    }
    Err(e) => {
      let e: crate::Error = e.into();
      tracing::warn!(
        %actor,
        %recipient,
        kind = %interaction_type,
        error = %e,
        "failed to record notification"
      );
      Dispatch::Failed(e.to_string())
    }
  }
}
