//! Handlers for the follow graph under `/profile/{id}/`.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/profile/{id}/followers/` | Optional `?follower=<uuid>`, `?ordering=` |
//! | `GET`  | `/profile/{id}/following/` | Optional `?ordering=` |
//! | `POST` | `/profile/{id}/followers/add/` | Caller follows `{id}`; 201 |
//! | `DELETE` | `/profile/{id}/followers/remove/` | Caller unfollows `{id}`; 204 |

use axum::{
  Json,
  extract::State,
  http::StatusCode,
};
use serde::Deserialize;
use stitch_core::{
  follow,
  query::FollowQuery,
  social::{FollowEdge, FollowerEntry, FollowingEntry},
  store::SocialStore,
};
use uuid::Uuid;

use crate::{
  AppState, OrderingParams,
  auth::Caller,
  error::ApiError,
  extract::{ApiPath, ApiQuery},
  pagination::{PageParams, Paginated},
};

#[derive(Debug, Default, Deserialize)]
pub struct FollowerParams {
  /// Only the edge from this profile, if any.
  pub follower: Option<Uuid>,
}

fn follow_query(
  state: &AppState<impl SocialStore>,
  paging: &PageParams,
  ordering: &OrderingParams,
  follower: Option<Uuid>,
) -> Result<FollowQuery, ApiError> {
  let defaults = FollowQuery::default();
  Ok(FollowQuery {
    follower,
    ordering: ordering.parse(defaults.ordering)?,
    page: paging.request(&state.config),
  })
}

/// `GET /profile/{id}/followers/`
pub async fn followers<S: SocialStore + 'static>(
  State(state): State<AppState<S>>,
  _caller: Caller,
  ApiPath(id): ApiPath<Uuid>,
  ApiQuery(paging): ApiQuery<PageParams>,
  ApiQuery(ordering): ApiQuery<OrderingParams>,
  ApiQuery(params): ApiQuery<FollowerParams>,
) -> Result<Json<Paginated<FollowerEntry>>, ApiError> {
  let query = follow_query(&state, &paging, &ordering, params.follower)?;
  let req = query.page;
  let page = follow::followers(state.store.as_ref(), id, query).await?;
  Ok(Json(Paginated::new(page, &req)?))
}

/// `GET /profile/{id}/following/`
pub async fn following<S: SocialStore + 'static>(
  State(state): State<AppState<S>>,
  _caller: Caller,
  ApiPath(id): ApiPath<Uuid>,
  ApiQuery(paging): ApiQuery<PageParams>,
  ApiQuery(ordering): ApiQuery<OrderingParams>,
) -> Result<Json<Paginated<FollowingEntry>>, ApiError> {
  let query = follow_query(&state, &paging, &ordering, None)?;
  let req = query.page;
  let page = follow::following(state.store.as_ref(), id, query).await?;
  Ok(Json(Paginated::new(page, &req)?))
}

/// `POST /profile/{id}/followers/add/`
pub async fn add<S: SocialStore + 'static>(
  State(state): State<AppState<S>>,
  caller: Caller,
  ApiPath(id): ApiPath<Uuid>,
) -> Result<(StatusCode, Json<FollowEdge>), ApiError> {
  let outcome = follow::follow(state.store.as_ref(), caller.profile_id, id).await?;
  Ok((StatusCode::CREATED, Json(outcome.record)))
}

/// `DELETE /profile/{id}/followers/remove/`
pub async fn remove<S: SocialStore + 'static>(
  State(state): State<AppState<S>>,
  caller: Caller,
  ApiPath(id): ApiPath<Uuid>,
) -> Result<StatusCode, ApiError> {
  follow::unfollow(state.store.as_ref(), caller.profile_id, id).await?;
  Ok(StatusCode::NO_CONTENT)
}
