//! Handlers for ratings.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/ratings/` | Optional `?piece=`, `?profile=`, `?ordering=` |
//! | `GET`  | `/pieces/{id}/ratings/` | Optional `?profile=`, `?ordering=` |
//! | `POST` | `/pieces/{id}/ratings/` | Body: `{"score":0..=5}`; 201 |
//! | `GET`  | `/ratings/{id}/` | 404 if not found |
//! | `PUT`/`PATCH` | `/ratings/{id}/` | Rater only; body: `{"score":0..=5}` |
//! | `DELETE` | `/ratings/{id}/` | Rater only |

use axum::{
  Json,
  extract::State,
  http::StatusCode,
};
use serde::Deserialize;
use stitch_core::{
  feed, interact,
  piece::Rating,
  query::RatingQuery,
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

#[derive(Debug, Default, Deserialize)]
pub struct RatingParams {
  pub piece:   Option<Uuid>,
  pub profile: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScoreBody {
  pub score: i64,
}

fn rating_query(
  state: &AppState<impl SocialStore>,
  paging: &PageParams,
  ordering: &OrderingParams,
  params: RatingParams,
) -> Result<RatingQuery, ApiError> {
  let defaults = RatingQuery::default();
  Ok(RatingQuery {
    piece:    params.piece,
    profile:  params.profile,
    ordering: ordering.parse(defaults.ordering)?,
    page:     paging.request(&state.config),
  })
}

/// `GET /ratings/`
pub async fn list<S: SocialStore + 'static>(
  State(state): State<AppState<S>>,
  ApiQuery(paging): ApiQuery<PageParams>,
  ApiQuery(ordering): ApiQuery<OrderingParams>,
  ApiQuery(params): ApiQuery<RatingParams>,
) -> Result<Json<Paginated<Rating>>, ApiError> {
  let query = rating_query(&state, &paging, &ordering, params)?;
  let req = query.page;
  let page = feed::rating_list(state.store.as_ref(), query).await?;
  Ok(Json(Paginated::new(page, &req)?))
}

/// `GET /pieces/{id}/ratings/`
pub async fn list_for_piece<S: SocialStore + 'static>(
  State(state): State<AppState<S>>,
  ApiPath(piece): ApiPath<Uuid>,
  ApiQuery(paging): ApiQuery<PageParams>,
  ApiQuery(ordering): ApiQuery<OrderingParams>,
  ApiQuery(params): ApiQuery<RatingParams>,
) -> Result<Json<Paginated<Rating>>, ApiError> {
  let query = rating_query(&state, &paging, &ordering, params)?;
  let req = query.page;
  let page = feed::piece_ratings(state.store.as_ref(), piece, query).await?;
  Ok(Json(Paginated::new(page, &req)?))
}

/// `POST /pieces/{id}/ratings/`
pub async fn create<S: SocialStore + 'static>(
  State(state): State<AppState<S>>,
  caller: Caller,
  ApiPath(piece): ApiPath<Uuid>,
  ApiJson(body): ApiJson<ScoreBody>,
) -> Result<(StatusCode, Json<Rating>), ApiError> {
  let outcome = interact::rate(state.store.as_ref(), caller.profile_id, piece, body.score).await?;
  Ok((StatusCode::CREATED, Json(outcome.record)))
}

/// `GET /ratings/{id}/`
pub async fn detail<S: SocialStore + 'static>(
  State(state): State<AppState<S>>,
  ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<Rating>, ApiError> {
  Ok(Json(feed::rating_detail(state.store.as_ref(), id).await?))
}

/// `PUT|PATCH /ratings/{id}/`
pub async fn update<S: SocialStore + 'static>(
  State(state): State<AppState<S>>,
  caller: Caller,
  ApiPath(id): ApiPath<Uuid>,
  ApiJson(body): ApiJson<ScoreBody>,
) -> Result<Json<Rating>, ApiError> {
  let rating =
    interact::update_rating(state.store.as_ref(), caller.profile_id, id, body.score).await?;
  Ok(Json(rating))
}

/// `DELETE /ratings/{id}/`
pub async fn delete<S: SocialStore + 'static>(
  State(state): State<AppState<S>>,
  caller: Caller,
  ApiPath(id): ApiPath<Uuid>,
) -> Result<StatusCode, ApiError> {
  interact::delete_rating(state.store.as_ref(), caller.profile_id, id).await?;
  Ok(StatusCode::NO_CONTENT)
}
