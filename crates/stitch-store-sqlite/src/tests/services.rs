//! The rules in `stitch_core` exercised end to end against SQLite.

use std::time::Duration;

use chrono::Utc;
use stitch_core::{
  Error,
  feed, follow, interact,
  notify::Dispatch,
  piece::{ArtType, NewPiece, PieceUpdate},
  profile::ProfileUpdate,
  query::{CommentQuery, FollowQuery, NotificationQuery, PieceQuery, RatingQuery},
  social::InteractionType,
  store::SocialStore,
};
use uuid::Uuid;

use super::{piece, register, store};
use crate::SqliteStore;

async fn notifications_for(s: &SqliteStore, recipient: Uuid) -> u64 {
  s.list_notifications(recipient, NotificationQuery::default())
    .await
    .unwrap()
    .count
}

// ─── Follows ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn follow_records_edge_and_notifies() {
  let s = store().await;
  let ada = register(&s, "Ada").await;
  let bob = register(&s, "Bob").await;

  let outcome = follow::follow(&s, ada.profile_id, bob.profile_id).await.unwrap();
  assert_eq!(outcome.record.follower_id, ada.profile_id);
  assert_eq!(outcome.record.followed_id, bob.profile_id);

  let note = outcome.notification.notification().unwrap();
  assert_eq!(note.interaction_type, InteractionType::Follow);
  assert_eq!(note.recipient_id, bob.profile_id);
  assert!(note.piece_id.is_none());

  let bob_view = s.profile_view(bob.profile_id).await.unwrap().unwrap();
  assert_eq!(bob_view.follower_count, 1);
  let ada_view = s.profile_view(ada.profile_id).await.unwrap().unwrap();
  assert_eq!(ada_view.following_count, 1);
}

#[tokio::test]
async fn following_twice_fails() {
  let s = store().await;
  let ada = register(&s, "Ada").await;
  let bob = register(&s, "Bob").await;

  follow::follow(&s, ada.profile_id, bob.profile_id).await.unwrap();
  let err = follow::follow(&s, ada.profile_id, bob.profile_id)
    .await
    .unwrap_err();
  assert!(matches!(err, Error::AlreadyFollowing(id) if id == bob.profile_id));
  assert_eq!(notifications_for(&s, bob.profile_id).await, 1);
}

#[tokio::test]
async fn concurrent_follows_admit_exactly_one() {
  let s = store().await;
  let ada = register(&s, "Ada").await;
  let bob = register(&s, "Bob").await;

  let (a, b) = tokio::join!(
    follow::follow(&s, ada.profile_id, bob.profile_id),
    follow::follow(&s, ada.profile_id, bob.profile_id),
  );

  let results = [a, b];
  assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
  assert!(
    results
      .iter()
      .any(|r| matches!(r, Err(Error::AlreadyFollowing(id)) if *id == bob.profile_id))
  );
  assert_eq!(notifications_for(&s, bob.profile_id).await, 1);
}

#[tokio::test]
async fn self_follow_and_missing_target() {
  let s = store().await;
  let ada = register(&s, "Ada").await;

  let err = follow::follow(&s, ada.profile_id, ada.profile_id)
    .await
    .unwrap_err();
  assert!(matches!(err, Error::SelfFollow));

  let ghost = Uuid::new_v4();
  let err = follow::follow(&s, ada.profile_id, ghost).await.unwrap_err();
  assert!(matches!(err, Error::ProfileNotFound(id) if id == ghost));
}

#[tokio::test]
async fn unfollow_without_edge_fails() {
  let s = store().await;
  let ada = register(&s, "Ada").await;
  let bob = register(&s, "Bob").await;

  let err = follow::unfollow(&s, ada.profile_id, bob.profile_id)
    .await
    .unwrap_err();
  assert!(matches!(err, Error::NotFollowing(_)));

  follow::follow(&s, ada.profile_id, bob.profile_id).await.unwrap();
  follow::unfollow(&s, ada.profile_id, bob.profile_id).await.unwrap();

  let err = follow::unfollow(&s, ada.profile_id, bob.profile_id)
    .await
    .unwrap_err();
  assert!(matches!(err, Error::NotFollowing(_)));

  let bob_view = s.profile_view(bob.profile_id).await.unwrap().unwrap();
  assert_eq!(bob_view.follower_count, 0);
}

#[tokio::test]
async fn follower_listing_of_missing_profile_fails() {
  let s = store().await;
  let err = follow::followers(&s, Uuid::new_v4(), FollowQuery::default())
    .await
    .unwrap_err();
  assert!(matches!(err, Error::ProfileNotFound(_)));
}

// ─── Ratings ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn rating_own_piece_fails_for_every_score() {
  let s = store().await;
  let ada = register(&s, "Ada").await;
  let socks = piece(&s, &ada, "Blue Socks").await;

  for score in [-1, 0, 3, 5, 6, 100] {
    let err = interact::rate(&s, ada.profile_id, socks.piece_id, score)
      .await
      .unwrap_err();
    assert!(matches!(err, Error::SelfRating), "score {score}: {err}");
  }
}

#[tokio::test]
async fn rating_twice_fails() {
  let s = store().await;
  let ada = register(&s, "Ada").await;
  let bob = register(&s, "Bob").await;
  let socks = piece(&s, &ada, "Blue Socks").await;

  let first = interact::rate(&s, bob.profile_id, socks.piece_id, 4).await.unwrap();
  assert_eq!(first.record.score, 4);
  assert!(matches!(first.notification, Dispatch::Recorded(_)));

  let err = interact::rate(&s, bob.profile_id, socks.piece_id, 2)
    .await
    .unwrap_err();
  assert!(matches!(err, Error::DuplicateRating(id) if id == socks.piece_id));
}

#[tokio::test]
async fn score_out_of_range_is_rejected() {
  let s = store().await;
  let ada = register(&s, "Ada").await;
  let bob = register(&s, "Bob").await;
  let socks = piece(&s, &ada, "Blue Socks").await;

  let err = interact::rate(&s, bob.profile_id, socks.piece_id, 6)
    .await
    .unwrap_err();
  assert!(matches!(err, Error::ScoreOutOfRange(6)));

  let rating = interact::rate(&s, bob.profile_id, socks.piece_id, 0).await.unwrap();
  let err = interact::update_rating(&s, bob.profile_id, rating.record.rating_id, -1)
    .await
    .unwrap_err();
  assert!(matches!(err, Error::ScoreOutOfRange(-1)));
}

#[tokio::test]
async fn concurrent_identical_ratings_admit_exactly_one() {
  let s = store().await;
  let ada = register(&s, "Ada").await;
  let bob = register(&s, "Bob").await;
  let socks = piece(&s, &ada, "Blue Socks").await;

  let (a, b) = tokio::join!(
    interact::rate(&s, bob.profile_id, socks.piece_id, 3),
    interact::rate(&s, bob.profile_id, socks.piece_id, 5),
  );

  let results = [a, b];
  let ok = results.iter().filter(|r| r.is_ok()).count();
  assert_eq!(ok, 1);
  assert!(
    results
      .iter()
      .any(|r| matches!(r, Err(Error::DuplicateRating(_))))
  );

  let ratings = s
    .list_ratings(RatingQuery { piece: Some(socks.piece_id), ..RatingQuery::default() })
    .await
    .unwrap();
  assert_eq!(ratings.count, 1);
}

#[tokio::test]
async fn only_the_rater_may_change_a_rating() {
  let s = store().await;
  let ada = register(&s, "Ada").await;
  let bob = register(&s, "Bob").await;
  let cy = register(&s, "Cy").await;
  let socks = piece(&s, &ada, "Blue Socks").await;
  let rating = interact::rate(&s, bob.profile_id, socks.piece_id, 2)
    .await
    .unwrap()
    .record;

  let err = interact::update_rating(&s, cy.profile_id, rating.rating_id, 5)
    .await
    .unwrap_err();
  assert!(matches!(err, Error::PermissionDenied(_)));
  let err = interact::delete_rating(&s, ada.profile_id, rating.rating_id)
    .await
    .unwrap_err();
  assert!(matches!(err, Error::PermissionDenied(_)));

  let updated = interact::update_rating(&s, bob.profile_id, rating.rating_id, 5)
    .await
    .unwrap();
  assert_eq!(updated.score, 5);

  interact::delete_rating(&s, bob.profile_id, rating.rating_id).await.unwrap();
  let err = feed::rating_detail(&s, rating.rating_id).await.unwrap_err();
  assert!(matches!(err, Error::RatingNotFound(_)));

  // Deleting returns the rater to the "absent" state, so rating again works.
  interact::rate(&s, bob.profile_id, socks.piece_id, 1).await.unwrap();
}

// ─── Comments & notifications ────────────────────────────────────────────────

#[tokio::test]
async fn commenting_notifies_the_owner_once() {
  let s = store().await;
  let ada = register(&s, "Ada").await;
  let bob = register(&s, "Bob").await;
  let socks = piece(&s, &ada, "Blue Socks").await;

  let outcome = interact::comment(&s, bob.profile_id, socks.piece_id, "  lovely  ")
    .await
    .unwrap();
  assert_eq!(outcome.record.content, "lovely");

  let page = s
    .list_notifications(ada.profile_id, NotificationQuery::default())
    .await
    .unwrap();
  assert_eq!(page.count, 1);
  let note = &page.items[0].notification;
  assert_eq!(note.actor_id, bob.profile_id);
  assert_eq!(note.recipient_id, ada.profile_id);
  assert_eq!(note.interaction_type, InteractionType::Comment);
  assert_eq!(note.piece_id, Some(socks.piece_id));
}

#[tokio::test]
async fn commenting_on_own_piece_is_silent() {
  let s = store().await;
  let ada = register(&s, "Ada").await;
  let socks = piece(&s, &ada, "Blue Socks").await;

  let outcome = interact::comment(&s, ada.profile_id, socks.piece_id, "finished!")
    .await
    .unwrap();
  assert_eq!(outcome.notification, Dispatch::Skipped);
  assert_eq!(notifications_for(&s, ada.profile_id).await, 0);
}

#[tokio::test]
async fn blank_comment_and_missing_piece() {
  let s = store().await;
  let ada = register(&s, "Ada").await;
  let socks = piece(&s, &ada, "Blue Socks").await;

  let err = interact::comment(&s, ada.profile_id, socks.piece_id, " \n ")
    .await
    .unwrap_err();
  assert!(matches!(err, Error::EmptyComment));

  let err = interact::comment(&s, ada.profile_id, Uuid::new_v4(), "hi")
    .await
    .unwrap_err();
  assert!(matches!(err, Error::PieceNotFound(_)));

  let err = feed::piece_comments(&s, Uuid::new_v4(), CommentQuery::default())
    .await
    .unwrap_err();
  assert!(matches!(err, Error::PieceNotFound(_)));
}

#[tokio::test]
async fn failed_notification_keeps_the_interaction() {
  let s = store().await;
  let ada = register(&s, "Ada").await;
  let bob = register(&s, "Bob").await;
  let socks = piece(&s, &ada, "Blue Socks").await;

  s.conn
    .call(|conn| {
      conn.execute_batch("DROP TABLE notifications")?;
      Ok(())
    })
    .await
    .unwrap();

  let outcome = interact::comment(&s, bob.profile_id, socks.piece_id, "nice")
    .await
    .unwrap();
  assert!(matches!(outcome.notification, Dispatch::Failed(_)));

  let rated = interact::rate(&s, bob.profile_id, socks.piece_id, 5).await.unwrap();
  assert!(matches!(rated.notification, Dispatch::Failed(_)));

  let view = feed::piece_detail(&s, Some(bob.profile_id), socks.piece_id)
    .await
    .unwrap();
  assert_eq!(view.comment_count, 1);
  assert_eq!(view.user_rating.map(|r| r.score), Some(5));
}

#[tokio::test]
async fn notification_feed_is_private_and_tracks_unread() {
  let s = store().await;
  let ada = register(&s, "Ada").await;
  let bob = register(&s, "Bob").await;
  let socks = piece(&s, &ada, "Blue Socks").await;

  follow::follow(&s, bob.profile_id, ada.profile_id).await.unwrap();

  let err = feed::notification_feed(&s, bob.profile_id, ada.profile_id, NotificationQuery::default())
    .await
    .unwrap_err();
  assert!(matches!(err, Error::PermissionDenied(_)));

  // Never visited: everything is unread.
  let page = feed::notification_feed(&s, ada.profile_id, ada.profile_id, NotificationQuery::default())
    .await
    .unwrap();
  assert_eq!(page.count, 1);
  assert!(page.items[0].unread);
  assert_eq!(page.items[0].message, "Bob followed you");

  std::thread::sleep(Duration::from_millis(5));
  interact::update_profile(&s, ada.profile_id, ada.profile_id, ProfileUpdate {
    last_visited_notifications: Some(Utc::now()),
    ..ProfileUpdate::default()
  })
  .await
  .unwrap();
  std::thread::sleep(Duration::from_millis(5));

  interact::comment(&s, bob.profile_id, socks.piece_id, "so soft").await.unwrap();

  let page = feed::notification_feed(&s, ada.profile_id, ada.profile_id, NotificationQuery::default())
    .await
    .unwrap();
  assert_eq!(page.count, 2);
  assert_eq!(page.items[0].message, "Bob commented on 'Blue Socks'");
  assert!(page.items[0].unread);
  assert!(!page.items[1].unread);
}

// ─── Feed ────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn feed_follows_the_follow_graph() {
  let s = store().await;
  let ada = register(&s, "Ada").await;
  let bob = register(&s, "Bob").await;
  let cy = register(&s, "Cy").await;

  let empty = feed::piece_feed(&s, ada.profile_id, PieceQuery::default())
    .await
    .unwrap();
  assert_eq!(empty.count, 0);

  follow::follow(&s, ada.profile_id, bob.profile_id).await.unwrap();
  let scarf = interact::create_piece(&s, bob.profile_id, NewPiece {
    title:    "Scarf".to_owned(),
    image:    None,
    art_type: ArtType::Weaving,
  })
  .await
  .unwrap();
  piece(&s, &cy, "Unfollowed").await;

  let page = feed::piece_feed(&s, ada.profile_id, PieceQuery::default())
    .await
    .unwrap();
  let ids: Vec<_> = page.items.iter().map(|p| p.piece.piece_id).collect();
  assert_eq!(ids, [scarf.piece_id]);

  follow::unfollow(&s, ada.profile_id, bob.profile_id).await.unwrap();
  let page = feed::piece_feed(&s, ada.profile_id, PieceQuery::default())
    .await
    .unwrap();
  assert!(page.items.is_empty());
}

#[tokio::test]
async fn feed_scales_past_the_bound_parameter_limit() {
  const FANS: &str = "
    WITH RECURSIVE n(i) AS (SELECT 1 UNION ALL SELECT i + 1 FROM n WHERE i < 33000)
    INSERT INTO accounts (account_id, email, password_hash, created_at)
    SELECT printf('00000000-0000-4000-9000-%012d', i), 'fan' || i || '@example.com',
           'x', '2024-01-01T00:00:00.000000Z'
    FROM n;

    INSERT INTO profiles (profile_id, account_id, image, created_at, updated_at)
    SELECT '00000000-0000-4000-8000-' || substr(account_id, 25), account_id, '',
           created_at, created_at
    FROM accounts WHERE email LIKE 'fan%';
  ";
  const FOLLOW_FANS: &str = "
    INSERT INTO follows (follow_id, follower_id, followed_id, created_at)
    SELECT '00000000-0000-4000-a000-' || substr(profile_id, 25), ?1, profile_id, created_at
    FROM profiles WHERE profile_id LIKE '00000000-0000-4000-8000-%'
  ";

  let s = store().await;
  let ada = register(&s, "Ada").await;
  let bob = register(&s, "Bob").await;

  let ada_id = ada.profile_id.hyphenated().to_string();
  let inserted = s
    .conn
    .call(move |conn| {
      let tx = conn.transaction()?;
      tx.execute_batch(FANS)?;
      let inserted = tx.execute(FOLLOW_FANS, [&ada_id])?;
      tx.commit()?;
      Ok(inserted)
    })
    .await
    .unwrap();
  assert_eq!(inserted, 33_000);

  follow::follow(&s, ada.profile_id, bob.profile_id).await.unwrap();
  let socks = piece(&s, &bob, "Blue Socks").await;
  assert_eq!(follow::followed_set(&s, ada.profile_id).await.unwrap().len(), 33_001);

  let page = feed::piece_feed(&s, ada.profile_id, PieceQuery::default())
    .await
    .unwrap();
  assert_eq!(page.count, 1);
  assert_eq!(page.items[0].piece.piece_id, socks.piece_id);
}

#[tokio::test]
async fn feed_is_newest_first_with_caller_rating() {
  let s = store().await;
  let ada = register(&s, "Ada").await;
  let bob = register(&s, "Bob").await;
  follow::follow(&s, ada.profile_id, bob.profile_id).await.unwrap();

  let older = piece(&s, &bob, "Older").await;
  let newer = piece(&s, &bob, "Newer").await;
  interact::rate(&s, ada.profile_id, older.piece_id, 4).await.unwrap();

  let page = feed::piece_feed(&s, ada.profile_id, PieceQuery::default())
    .await
    .unwrap();
  assert_eq!(page.items[0].piece.piece_id, newer.piece_id);
  assert!(page.items[0].user_rating.is_none());
  assert_eq!(page.items[1].user_rating.as_ref().map(|r| r.score), Some(4));
}

// ─── Ownership ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn only_the_owner_may_change_a_piece() {
  let s = store().await;
  let ada = register(&s, "Ada").await;
  let bob = register(&s, "Bob").await;
  let socks = piece(&s, &ada, "Blue Socks").await;

  let rename = || PieceUpdate { title: Some("Mine now".to_owned()), ..PieceUpdate::default() };

  let err = interact::update_piece(&s, bob.profile_id, socks.piece_id, rename())
    .await
    .unwrap_err();
  assert!(matches!(err, Error::PermissionDenied(_)));
  let err = interact::delete_piece(&s, bob.profile_id, socks.piece_id)
    .await
    .unwrap_err();
  assert!(matches!(err, Error::PermissionDenied(_)));

  let err = interact::update_piece(&s, ada.profile_id, socks.piece_id, PieceUpdate {
    title: Some("x".repeat(76)),
    ..PieceUpdate::default()
  })
  .await
  .unwrap_err();
  assert!(matches!(err, Error::InvalidTitle(_)));

  let renamed = interact::update_piece(&s, ada.profile_id, socks.piece_id, rename())
    .await
    .unwrap();
  assert_eq!(renamed.title, "Mine now");

  interact::delete_piece(&s, ada.profile_id, socks.piece_id).await.unwrap();
  let err = feed::piece_detail(&s, None, socks.piece_id).await.unwrap_err();
  assert!(matches!(err, Error::PieceNotFound(_)));
}

#[tokio::test]
async fn deleting_a_profile_removes_its_account() {
  let s = store().await;
  let ada = register(&s, "Ada").await;
  let bob = register(&s, "Bob").await;

  let err = interact::delete_profile(&s, bob.profile_id, ada.profile_id)
    .await
    .unwrap_err();
  assert!(matches!(err, Error::PermissionDenied(_)));

  interact::delete_profile(&s, ada.profile_id, ada.profile_id).await.unwrap();
  assert!(s.credentials("ada@example.com".to_owned()).await.unwrap().is_none());
  let err = feed::profile_detail(&s, ada.profile_id).await.unwrap_err();
  assert!(matches!(err, Error::ProfileNotFound(_)));
}
