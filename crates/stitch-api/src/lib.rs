//! JSON REST API for Stitch Space.
//!
//! Exposes an axum [`Router`] backed by any [`stitch_core::store::SocialStore`].
//! Callers authenticate with HTTP Basic credentials (`email:password`).
//! TLS and transport concerns are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", stitch_api::router(state))
//! ```

pub mod auth;
pub mod comments;
pub mod error;
pub mod extract;
pub mod follows;
pub mod notifications;
pub mod pagination;
pub mod pieces;
pub mod profiles;
pub mod ratings;

use std::{str::FromStr, sync::Arc};

use axum::{
  Router,
  routing::{delete, get, post},
};
use serde::Deserialize;
use stitch_core::{
  query::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE, Ordering},
  store::SocialStore,
};

pub use error::ApiError;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Listing limits applied to every paged endpoint.
#[derive(Debug, Clone)]
pub struct ApiConfig {
  pub default_page_size: u32,
  pub max_page_size:     u32,
}

impl Default for ApiConfig {
  fn default() -> Self {
    Self {
      default_page_size: DEFAULT_PAGE_SIZE,
      max_page_size:     MAX_PAGE_SIZE,
    }
  }
}

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
pub struct AppState<S> {
  pub store:  Arc<S>,
  pub config: Arc<ApiConfig>,
}

impl<S> Clone for AppState<S> {
  fn clone(&self) -> Self {
    Self {
      store:  Arc::clone(&self.store),
      config: Arc::clone(&self.config),
    }
  }
}

// ─── Shared query parameters ─────────────────────────────────────────────────

/// `?ordering=field` or `?ordering=-field`.
#[derive(Debug, Default, Deserialize)]
pub struct OrderingParams {
  pub ordering: Option<String>,
}

impl OrderingParams {
  /// The requested ordering, or `default` when none was given.
  pub fn parse<F: FromStr>(&self, default: Ordering<F>) -> Result<Ordering<F>, ApiError> {
    match self.ordering.as_deref().map(str::trim) {
      Some(raw) if !raw.is_empty() => Ok(raw.parse()?),
      _ => Ok(default),
    }
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the API router for `state`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn router<S: SocialStore + 'static>(state: AppState<S>) -> Router {
  Router::new()
    // Profiles
    .route("/profiles/", get(profiles::list::<S>))
    .route(
      "/profile/{id}/",
      get(profiles::detail::<S>)
        .put(profiles::update::<S>)
        .patch(profiles::update::<S>)
        .delete(profiles::delete::<S>),
    )
    // Follows
    .route("/profile/{id}/followers/", get(follows::followers::<S>))
    .route("/profile/{id}/following/", get(follows::following::<S>))
    .route("/profile/{id}/followers/add/", post(follows::add::<S>))
    .route("/profile/{id}/followers/remove/", delete(follows::remove::<S>))
    // Notifications
    .route("/profile/{id}/notifications/", get(notifications::list::<S>))
    // Pieces
    .route("/pieces/", get(pieces::list::<S>))
    .route("/pieces/feed/", get(pieces::following_feed::<S>))
    .route("/pieces/create/", post(pieces::create::<S>))
    .route(
      "/pieces/{id}/",
      get(pieces::detail::<S>)
        .put(pieces::update::<S>)
        .patch(pieces::update::<S>)
        .delete(pieces::delete::<S>),
    )
    .route(
      "/pieces/{id}/comments/",
      get(comments::list::<S>).post(comments::create::<S>),
    )
    .route(
      "/pieces/{id}/ratings/",
      get(ratings::list_for_piece::<S>).post(ratings::create::<S>),
    )
    // Ratings
    .route("/ratings/", get(ratings::list::<S>))
    .route(
      "/ratings/{id}/",
      get(ratings::detail::<S>)
        .put(ratings::update::<S>)
        .patch(ratings::update::<S>)
        .delete(ratings::delete::<S>),
    )
    .with_state(state)
}

// ─── Test support ────────────────────────────────────────────────────────────


// ─── Integration tests ────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use axum::{
    body::Body,
    http::{Request, StatusCode, header},
  };
  use serde_json::{Value, json};
  use stitch_core::profile::Profile;
  use stitch_store_sqlite::SqliteStore;
  use tower::ServiceExt as _;

  use super::*;
  use crate::test_support::{basic, register};

  struct Fixture {
    state: AppState<SqliteStore>,
    ada:   Profile,
    bob:   Profile,
  }

  const ADA: (&str, &str) = ("ada@example.com", "ada-pass");
  const BOB: (&str, &str) = ("bob@example.com", "bob-pass");

  async fn fixture() -> Fixture {
    let store = SqliteStore::open_in_memory().await.unwrap();
    let ada = register(&store, ADA.0, ADA.1).await;
    let bob = register(&store, BOB.0, BOB.1).await;
    Fixture {
      state: AppState {
        store:  Arc::new(store),
        config: Arc::new(ApiConfig::default()),
      },
      ada,
      bob,
    }
  }

  async fn send(
    state: &AppState<SqliteStore>,
    method: &str,
    uri: &str,
    who: Option<(&str, &str)>,
    body: Option<Value>,
  ) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some((user, pass)) = who {
      builder = builder.header(header::AUTHORIZATION, basic(user, pass));
    }
    let req = match body {
      Some(json) => builder
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(json.to_string()))
        .unwrap(),
      None => builder.body(Body::empty()).unwrap(),
    };

    let resp = router(state.clone()).oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let json = if bytes.is_empty() {
      Value::Null
    } else {
      serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
  }

  async fn create_piece(state: &AppState<SqliteStore>, who: (&str, &str), title: &str) -> String {
    let (status, body) = send(
      state,
      "POST",
      "/pieces/create/",
      Some(who),
      Some(json!({ "title": title, "artType": "knitting" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body["pieceId"].as_str().unwrap().to_owned()
  }

  // ── Authentication ──────────────────────────────────────────────────────────

  #[tokio::test]
  async fn anonymous_write_is_challenged() {
    let f = fixture().await;
    let req = Request::builder()
      .method("POST")
      .uri("/pieces/create/")
      .header(header::CONTENT_TYPE, "application/json")
      .body(Body::from(r#"{"title":"x","artType":"other"}"#))
      .unwrap();
    let resp = router(f.state.clone()).oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert!(resp.headers().contains_key(header::WWW_AUTHENTICATE));
  }

  #[tokio::test]
  async fn bad_credentials_fail_even_on_public_routes() {
    let f = fixture().await;
    let (status, body) = send(&f.state, "GET", "/pieces/", Some((ADA.0, "nope")), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["detail"], error::BAD_CREDENTIALS);

    let (status, _) = send(&f.state, "GET", "/pieces/", None, None).await;
    assert_eq!(status, StatusCode::OK);
  }

  // ── Pieces ──────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn created_piece_has_zero_aggregates() {
    let f = fixture().await;
    let id = create_piece(&f.state, ADA, "  Blue Socks ").await;

    let (status, body) = send(&f.state, "GET", &format!("/pieces/{id}/"), None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["title"], "Blue Socks");
    assert_eq!(body["artType"], "knitting");
    assert_eq!(body["featured"], false);
    assert_eq!(body["avgRating"], 0.0);
    assert_eq!(body["commentCount"], 0);
    assert_eq!(body["userRating"], Value::Null);
    assert_eq!(body["owner"]["profileId"], f.ada.profile_id.to_string());
  }

  #[tokio::test]
  async fn blank_title_is_rejected() {
    let f = fixture().await;
    let (status, body) = send(
      &f.state,
      "POST",
      "/pieces/create/",
      Some(ADA),
      Some(json!({ "title": "   ", "artType": "crochet" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["detail"], "Title must not be empty.");
  }

  #[tokio::test]
  async fn only_the_owner_may_delete_a_piece() {
    let f = fixture().await;
    let id = create_piece(&f.state, ADA, "Scarf").await;
    let uri = format!("/pieces/{id}/");

    let (status, _) = send(&f.state, "DELETE", &uri, Some(BOB), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send(
      &f.state,
      "PATCH",
      &uri,
      Some(ADA),
      Some(json!({ "artType": "weaving" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["artType"], "weaving");
    assert_eq!(body["title"], "Scarf");

    let (status, _) = send(&f.state, "DELETE", &uri, Some(ADA), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, body) = send(&f.state, "GET", &uri, None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["detail"], "Not found.");
  }

  #[tokio::test]
  async fn unknown_ordering_is_a_bad_request() {
    let f = fixture().await;
    let (status, body) = send(&f.state, "GET", "/pieces/?ordering=-password", None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["detail"].as_str().unwrap().contains("-password"));
  }

  #[tokio::test]
  async fn malformed_input_still_answers_with_detail() {
    let f = fixture().await;
    let id = create_piece(&f.state, ADA, "Blue Socks").await;

    let (status, body) = send(
      &f.state,
      "POST",
      &format!("/pieces/{id}/ratings/"),
      Some(BOB),
      Some(json!({ "score": 4.5 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["detail"].is_string(), "{body}");

    let (status, body) = send(&f.state, "GET", "/pieces/?art_type=painting", None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["detail"].as_str().unwrap().contains("painting"), "{body}");

    let (status, body) = send(&f.state, "GET", "/pieces/not-a-uuid/", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["detail"], "Not found.");

    let req = Request::builder()
      .method("POST")
      .uri("/pieces/create/")
      .header(header::AUTHORIZATION, basic(ADA.0, ADA.1))
      .header(header::CONTENT_TYPE, "application/json")
      .body(Body::from(r#"{"title":"#))
      .unwrap();
    let resp = router(f.state.clone()).oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert!(body["detail"].is_string());
  }

  #[tokio::test]
  async fn pagination_envelope() {
    let f = fixture().await;
    for title in ["one", "two", "three"] {
      create_piece(&f.state, ADA, title).await;
    }

    let (status, body) = send(&f.state, "GET", "/pieces/?page_size=2", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 3);
    assert_eq!(body["nextPage"], 2);
    assert_eq!(body["previousPage"], Value::Null);
    assert_eq!(body["results"].as_array().unwrap().len(), 2);
    assert_eq!(body["results"][0]["title"], "three");

    let (_, body) = send(&f.state, "GET", "/pieces/?page_size=2&page=2", None, None).await;
    assert_eq!(body["nextPage"], Value::Null);
    assert_eq!(body["previousPage"], 1);
    assert_eq!(body["results"][0]["title"], "one");

    let (status, body) = send(&f.state, "GET", "/pieces/?page_size=2&page=3", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["detail"], "Invalid page.");
  }

  // ── Ratings ─────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn rating_rules_surface_distinct_messages() {
    let f = fixture().await;
    let id = create_piece(&f.state, ADA, "Blue Socks").await;
    let uri = format!("/pieces/{id}/ratings/");

    let (status, body) = send(&f.state, "POST", &uri, Some(ADA), Some(json!({ "score": 5 }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["detail"], "You cannot rate your own piece.");

    let (status, _) = send(&f.state, "POST", &uri, Some(BOB), Some(json!({ "score": 9 }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, rating) =
      send(&f.state, "POST", &uri, Some(BOB), Some(json!({ "score": 4 }))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(rating["score"], 4);

    let (status, body) = send(&f.state, "POST", &uri, Some(BOB), Some(json!({ "score": 1 }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["detail"], "You have already rated this piece.");

    let (_, view) = send(&f.state, "GET", &format!("/pieces/{id}/"), Some(BOB), None).await;
    assert_eq!(view["avgRating"], 4.0);
    assert_eq!(view["userRating"]["ratingId"], rating["ratingId"]);

    let (_, view) = send(&f.state, "GET", &format!("/pieces/{id}/"), None, None).await;
    assert_eq!(view["userRating"], Value::Null);
  }

  #[tokio::test]
  async fn rating_lifecycle() {
    let f = fixture().await;
    let id = create_piece(&f.state, ADA, "Blue Socks").await;
    let (_, rating) = send(
      &f.state,
      "POST",
      &format!("/pieces/{id}/ratings/"),
      Some(BOB),
      Some(json!({ "score": 2 })),
    )
    .await;
    let uri = format!("/ratings/{}/", rating["ratingId"].as_str().unwrap());

    let (status, _) = send(&f.state, "PUT", &uri, Some(ADA), Some(json!({ "score": 5 }))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send(&f.state, "PUT", &uri, Some(BOB), Some(json!({ "score": 5 }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["score"], 5);

    let (_, list) = send(&f.state, "GET", &format!("/ratings/?piece={id}"), None, None).await;
    assert_eq!(list["count"], 1);

    let (status, _) = send(&f.state, "DELETE", &uri, Some(BOB), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = send(&f.state, "GET", &uri, None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
  }

  // ── Follows & feed ──────────────────────────────────────────────────────────

  #[tokio::test]
  async fn follow_unfollow_round() {
    let f = fixture().await;
    let ada = f.ada.profile_id;
    let add = format!("/profile/{ada}/followers/add/");
    let remove = format!("/profile/{ada}/followers/remove/");

    let (status, edge) = send(&f.state, "POST", &add, Some(BOB), None).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(edge["followerId"], f.bob.profile_id.to_string());

    let (status, body) = send(&f.state, "POST", &add, Some(BOB), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["detail"], "You are already following this profile.");

    let (status, _) = send(&f.state, "POST", &add, Some(ADA), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, profile) = send(&f.state, "GET", &format!("/profile/{ada}/"), None, None).await;
    assert_eq!(profile["followerCount"], 1);

    let followers = format!("/profile/{ada}/followers/?follower={}", f.bob.profile_id);
    let (status, body) = send(&f.state, "GET", &followers, Some(ADA), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 1);
    assert_eq!(body["results"][0]["follower"]["firstName"], "Bob");

    let (status, _) = send(&f.state, "DELETE", &remove, Some(BOB), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, body) = send(&f.state, "DELETE", &remove, Some(BOB), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["detail"], "You are not following this profile.");
  }

  #[tokio::test]
  async fn feed_shows_followed_pieces_only() {
    let f = fixture().await;
    let adas = create_piece(&f.state, ADA, "Blue Socks").await;
    create_piece(&f.state, BOB, "Own Scarf").await;

    let (_, body) = send(&f.state, "GET", "/pieces/feed/", Some(BOB), None).await;
    assert_eq!(body["count"], 0);

    send(
      &f.state,
      "POST",
      &format!("/profile/{}/followers/add/", f.ada.profile_id),
      Some(BOB),
      None,
    )
    .await;

    let (status, body) = send(&f.state, "GET", "/pieces/feed/", Some(BOB), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 1);
    assert_eq!(body["results"][0]["pieceId"], adas);

    let (status, _) = send(&f.state, "GET", "/pieces/feed/", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
  }

  // ── Comments & notifications ────────────────────────────────────────────────

  #[tokio::test]
  async fn comments_notify_the_owner_privately() {
    let f = fixture().await;
    let id = create_piece(&f.state, ADA, "Blue Socks").await;

    let (status, comment) = send(
      &f.state,
      "POST",
      &format!("/pieces/{id}/comments/"),
      Some(BOB),
      Some(json!({ "content": "so soft" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(comment["content"], "so soft");

    let (_, comments) = send(&f.state, "GET", &format!("/pieces/{id}/comments/"), None, None).await;
    assert_eq!(comments["count"], 1);
    assert_eq!(comments["results"][0]["author"]["firstName"], "Bob");

    let feed = format!("/profile/{}/notifications/", f.ada.profile_id);
    let (status, body) = send(&f.state, "GET", &feed, Some(ADA), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 1);
    assert_eq!(body["results"][0]["message"], "Bob commented on 'Blue Socks'");
    assert_eq!(body["results"][0]["interactionType"], "comment");
    assert_eq!(body["results"][0]["unread"], true);

    let (status, _) = send(&f.state, "GET", &feed, Some(BOB), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
  }

  // ── Profiles ────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn profile_updates_are_owner_only() {
    let f = fixture().await;
    let uri = format!("/profile/{}/", f.ada.profile_id);

    let (status, _) = send(
      &f.state,
      "PATCH",
      &uri,
      Some(BOB),
      Some(json!({ "biography": "hijacked" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send(
      &f.state,
      "PATCH",
      &uri,
      Some(ADA),
      Some(json!({ "biography": "Knits socks.", "firstName": "Augusta" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["biography"], "Knits socks.");
    assert_eq!(body["firstName"], "Augusta");

    let (status, body) = send(
      &f.state,
      "PATCH",
      &uri,
      Some(ADA),
      Some(json!({ "email": BOB.0 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["detail"], "An account with this email already exists.");
  }

  #[tokio::test]
  async fn deleting_a_profile_revokes_its_credentials() {
    let f = fixture().await;
    let uri = format!("/profile/{}/", f.ada.profile_id);

    let (status, _) = send(&f.state, "DELETE", &uri, Some(ADA), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(&f.state, "GET", &uri, None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = send(&f.state, "GET", "/pieces/", Some(ADA), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (_, profiles) = send(&f.state, "GET", "/profiles/", None, None).await;
    assert_eq!(profiles["count"], 1);
  }
}
