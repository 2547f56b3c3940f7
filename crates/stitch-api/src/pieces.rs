//! Handlers for `/pieces/` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/pieces/` | Filters: `art_type`, `owner`, `featured`, `search`; `?ordering=` |
//! | `GET`  | `/pieces/feed/` | Pieces by profiles the caller follows |
//! | `POST` | `/pieces/create/` | Body: [`CreateBody`]; 201 |
//! | `GET`  | `/pieces/{id}/` | Carries the caller's rating when authenticated |
//! | `PUT`/`PATCH` | `/pieces/{id}/` | Owner only; body: [`UpdateBody`] |
//! | `DELETE` | `/pieces/{id}/` | Owner only |

use axum::{
  Json,
  extract::State,
  http::StatusCode,
};
use serde::Deserialize;
use stitch_core::{
  feed, interact,
  piece::{ArtType, NewPiece, PieceUpdate, PieceView},
  query::{Page, PageRequest, PieceQuery},
  store::SocialStore,
};
use uuid::Uuid;

use crate::{
  AppState, OrderingParams,
  auth::{Caller, MaybeCaller},
  error::ApiError,
  extract::{ApiJson, ApiPath, ApiQuery},
  pagination::{PageParams, Paginated},
};

// ─── Listing ─────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct PieceParams {
  pub art_type: Option<ArtType>,
  pub owner:    Option<Uuid>,
  pub featured: Option<bool>,
  /// Substring of the title or the owner's first or last name.
  pub search:   Option<String>,
}

fn piece_query(
  state: &AppState<impl SocialStore>,
  paging: &PageParams,
  ordering: &OrderingParams,
  params: PieceParams,
) -> Result<PieceQuery, ApiError> {
  let defaults = PieceQuery::default();
  Ok(PieceQuery {
    art_type: params.art_type,
    owner: params.owner,
    featured: params.featured,
    search: params.search,
    ordering: ordering.parse(defaults.ordering)?,
    page: paging.request(&state.config),
    ..defaults
  })
}

fn paginate(
  page: Page<PieceView>,
  req: &PageRequest,
) -> Result<Json<Paginated<PieceView>>, ApiError> {
  Ok(Json(Paginated::new(page, req)?))
}

/// `GET /pieces/`
pub async fn list<S: SocialStore + 'static>(
  State(state): State<AppState<S>>,
  caller: MaybeCaller,
  ApiQuery(paging): ApiQuery<PageParams>,
  ApiQuery(ordering): ApiQuery<OrderingParams>,
  ApiQuery(params): ApiQuery<PieceParams>,
) -> Result<Json<Paginated<PieceView>>, ApiError> {
  let query = piece_query(&state, &paging, &ordering, params)?;
  let req = query.page;
  let page = feed::piece_list(state.store.as_ref(), caller.profile_id(), query).await?;
  paginate(page, &req)
}

/// `GET /pieces/feed/`
pub async fn following_feed<S: SocialStore + 'static>(
  State(state): State<AppState<S>>,
  caller: Caller,
  ApiQuery(paging): ApiQuery<PageParams>,
  ApiQuery(ordering): ApiQuery<OrderingParams>,
  ApiQuery(params): ApiQuery<PieceParams>,
) -> Result<Json<Paginated<PieceView>>, ApiError> {
  let query = piece_query(&state, &paging, &ordering, params)?;
  let req = query.page;
  let page = feed::piece_feed(state.store.as_ref(), caller.profile_id, query).await?;
  paginate(page, &req)
}

// ─── Create ──────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CreateBody {
  pub title:    String,
  pub image:    Option<String>,
  pub art_type: ArtType,
}

/// `POST /pieces/create/`
pub async fn create<S: SocialStore + 'static>(
  State(state): State<AppState<S>>,
  caller: Caller,
  ApiJson(body): ApiJson<CreateBody>,
) -> Result<(StatusCode, Json<PieceView>), ApiError> {
  let store = state.store.as_ref();
  let piece = interact::create_piece(store, caller.profile_id, NewPiece {
    title:    body.title,
    image:    body.image.filter(|i| !i.trim().is_empty()),
    art_type: body.art_type,
  })
  .await?;

  let view = feed::piece_detail(store, Some(caller.profile_id), piece.piece_id).await?;
  Ok((StatusCode::CREATED, Json(view)))
}

// ─── Detail ──────────────────────────────────────────────────────────────────

/// `GET /pieces/{id}/`
pub async fn detail<S: SocialStore + 'static>(
  State(state): State<AppState<S>>,
  caller: MaybeCaller,
  ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<PieceView>, ApiError> {
  Ok(Json(feed::piece_detail(state.store.as_ref(), caller.profile_id(), id).await?))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpdateBody {
  pub title:    Option<String>,
  pub image:    Option<String>,
  pub art_type: Option<ArtType>,
}

/// `PUT|PATCH /pieces/{id}/`
pub async fn update<S: SocialStore + 'static>(
  State(state): State<AppState<S>>,
  caller: Caller,
  ApiPath(id): ApiPath<Uuid>,
  ApiJson(body): ApiJson<UpdateBody>,
) -> Result<Json<PieceView>, ApiError> {
  let store = state.store.as_ref();
  let update = PieceUpdate {
    title:    body.title,
    image:    body.image,
    art_type: body.art_type,
  };
  interact::update_piece(store, caller.profile_id, id, update).await?;
  Ok(Json(feed::piece_detail(store, Some(caller.profile_id), id).await?))
}

/// `DELETE /pieces/{id}/`
pub async fn delete<S: SocialStore + 'static>(
  State(state): State<AppState<S>>,
  caller: Caller,
  ApiPath(id): ApiPath<Uuid>,
) -> Result<StatusCode, ApiError> {
  interact::delete_piece(state.store.as_ref(), caller.profile_id, id).await?;
  Ok(StatusCode::NO_CONTENT)
}
