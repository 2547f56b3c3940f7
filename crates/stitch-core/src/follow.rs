//! Follow relationships between profiles.

use std::collections::HashSet;

use uuid::Uuid;

use crate::{
  Constraint, Error, Result,
  error::backend,
  notify::{self, Outcome},
  query::{FollowQuery, Page},
  social::{FollowEdge, FollowerEntry, FollowingEntry, InteractionType},
  store::SocialStore,
};

async fn require_profile<S: SocialStore>(store: &S, id: Uuid) -> Result<()> {
  store
    .get_profile(id)
    .await
    .map_err(backend)?
    .ok_or(Error::ProfileNotFound(id))?;
  Ok(())
}

/// `caller` starts following `target`.
///
/// A second follow of the same profile is an error, not a no-op. A racing
/// duplicate that slips past the pre-check is reported the same way.
pub async fn follow<S: SocialStore>(
  store: &S,
  caller: Uuid,
  target: Uuid,
) -> Result<Outcome<FollowEdge>> {
  require_profile(store, target).await?;

  if caller == target {
    return Err(Error::SelfFollow);
  }

  let existing = store.find_follow(caller, target).await.map_err(backend)?;
  if existing.is_some() {
    return Err(Error::AlreadyFollowing(target));
  }

  let edge = store
    .insert_follow(caller, target)
    .await
    .map_err(|e| match backend(e) {
      Error::Conflict(Constraint::Follow) => Error::AlreadyFollowing(target),
      other => other,
    })?;
  tracing::debug!(follower = %caller, followed = %target, "follow created");

  let notification =
    notify::dispatch(store, caller, target, InteractionType::Follow, None).await;

  Ok(Outcome { record: edge, notification })
}

/// `caller` stops following `target`. Fails with `NotFollowing` when there
/// is no edge, including on a repeated unfollow.
pub async fn unfollow<S: SocialStore>(
  store: &S,
  caller: Uuid,
  target: Uuid,
) -> Result<()> {
  require_profile(store, target).await?;

  let edge = store
    .find_follow(caller, target)
    .await
    .map_err(backend)?
    .ok_or(Error::NotFollowing(target))?;

  // Lost a race with a concurrent unfollow.
  if !store.delete_follow(edge.follow_id).await.map_err(backend)? {
    return Err(Error::NotFollowing(target));
  }
  tracing::debug!(follower = %caller, followed = %target, "follow removed");
  Ok(())
}

pub async fn followers<S: SocialStore>(
  store: &S,
  profile: Uuid,
  query: FollowQuery,
) -> Result<Page<FollowerEntry>> {
  require_profile(store, profile).await?;
  store.list_followers(profile, query).await.map_err(backend)
}

pub async fn following<S: SocialStore>(
  store: &S,
  profile: Uuid,
  query: FollowQuery,
) -> Result<Page<FollowingEntry>> {
  require_profile(store, profile).await?;
  store.list_following(profile, query).await.map_err(backend)
}

/// The ids of every profile `profile` follows.
pub async fn followed_set<S: SocialStore>(
  store: &S,
  profile: Uuid,
) -> Result<HashSet<Uuid>> {
  let ids = store.followed_ids(profile).await.map_err(backend)?;
  Ok(ids.into_iter().collect())
}
