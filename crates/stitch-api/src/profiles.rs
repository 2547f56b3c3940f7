//! Handlers for `/profiles/` and `/profile/{id}/`.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/profiles/` | Optional `?ordering=` |
//! | `GET`  | `/profile/{id}/` | 404 if not found |
//! | `PUT`/`PATCH` | `/profile/{id}/` | Owner only; body: [`ProfileBody`] |
//! | `DELETE` | `/profile/{id}/` | Owner only; removes the account too |

use axum::{
  Json,
  extract::State,
  http::StatusCode,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use stitch_core::{
  feed, interact,
  profile::{ProfileUpdate, ProfileView},
  query::ProfileQuery,
  store::SocialStore,
};
use uuid::Uuid;

use crate::{
  AppState, OrderingParams,
  auth::Caller,
  error::ApiError,
  extract::{ApiJson, ApiPath, ApiQuery},
  pagination::{PageParams, Paginated},
};

/// `GET /profiles/[?ordering=-followers]`
pub async fn list<S: SocialStore + 'static>(
  State(state): State<AppState<S>>,
  ApiQuery(paging): ApiQuery<PageParams>,
  ApiQuery(params): ApiQuery<OrderingParams>,
) -> Result<Json<Paginated<ProfileView>>, ApiError> {
  let defaults = ProfileQuery::default();
  let query = ProfileQuery {
    ordering: params.parse(defaults.ordering)?,
    page:     paging.request(&state.config),
  };
  let req = query.page;
  let page = feed::profile_list(state.store.as_ref(), query).await?;
  Ok(Json(Paginated::new(page, &req)?))
}

/// `GET /profile/{id}/`
pub async fn detail<S: SocialStore + 'static>(
  State(state): State<AppState<S>>,
  ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<ProfileView>, ApiError> {
  Ok(Json(feed::profile_detail(state.store.as_ref(), id).await?))
}

/// Writable profile and account fields. Absent fields are left unchanged.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ProfileBody {
  pub first_name:                 Option<String>,
  pub last_name:                  Option<String>,
  pub email:                      Option<String>,
  pub biography:                  Option<String>,
  pub image:                      Option<String>,
  pub last_visited_notifications: Option<DateTime<Utc>>,
}

impl From<ProfileBody> for ProfileUpdate {
  fn from(b: ProfileBody) -> Self {
    ProfileUpdate {
      first_name:                 b.first_name,
      last_name:                  b.last_name,
      email:                      b.email,
      biography:                  b.biography,
      image:                      b.image,
      last_visited_notifications: b.last_visited_notifications,
    }
  }
}

/// `PUT|PATCH /profile/{id}/`
pub async fn update<S: SocialStore + 'static>(
  State(state): State<AppState<S>>,
  caller: Caller,
  ApiPath(id): ApiPath<Uuid>,
  ApiJson(body): ApiJson<ProfileBody>,
) -> Result<Json<ProfileView>, ApiError> {
  if body.email.as_deref().is_some_and(|e| e.trim().is_empty()) {
    return Err(ApiError::BadRequest("Email must not be empty.".to_owned()));
  }

  let store = state.store.as_ref();
  interact::update_profile(store, caller.profile_id, id, body.into()).await?;
  Ok(Json(feed::profile_detail(store, id).await?))
}

/// `DELETE /profile/{id}/`
pub async fn delete<S: SocialStore + 'static>(
  State(state): State<AppState<S>>,
  caller: Caller,
  ApiPath(id): ApiPath<Uuid>,
) -> Result<StatusCode, ApiError> {
  interact::delete_profile(state.store.as_ref(), caller.profile_id, id).await?;
  tracing::info!(profile = %id, "profile deleted");
  Ok(StatusCode::NO_CONTENT)
}
