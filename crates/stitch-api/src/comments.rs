//! Handlers for `/pieces/{id}/comments/`.

use axum::{
  Json,
  extract::State,
  http::StatusCode,
};
use serde::Deserialize;
use stitch_core::{
  feed, interact,
  piece::{Comment, CommentView},
  query::CommentQuery,
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

/// `GET /pieces/{id}/comments/`, newest first unless `?ordering=created_at`.
pub async fn list<S: SocialStore + 'static>(
  State(state): State<AppState<S>>,
  ApiPath(piece): ApiPath<Uuid>,
  ApiQuery(paging): ApiQuery<PageParams>,
  ApiQuery(ordering): ApiQuery<OrderingParams>,
) -> Result<Json<Paginated<CommentView>>, ApiError> {
  let defaults = CommentQuery::default();
  let query = CommentQuery {
    ordering: ordering.parse(defaults.ordering)?,
    page:     paging.request(&state.config),
  };
  let req = query.page;
  let page = feed::piece_comments(state.store.as_ref(), piece, query).await?;
  Ok(Json(Paginated::new(page, &req)?))
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CommentBody {
  pub content: String,
}

/// `POST /pieces/{id}/comments/` with body `{"content":"..."}`
pub async fn create<S: SocialStore + 'static>(
  State(state): State<AppState<S>>,
  caller: Caller,
  ApiPath(piece): ApiPath<Uuid>,
  ApiJson(body): ApiJson<CommentBody>,
) -> Result<(StatusCode, Json<Comment>), ApiError> {
  let outcome =
    interact::comment(state.store.as_ref(), caller.profile_id, piece, &body.content).await?;
  Ok((StatusCode::CREATED, Json(outcome.record)))
}
