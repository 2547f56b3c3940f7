//! Handler for `GET /profile/{id}/notifications/`.
//!
//! Optional `?interaction_type=comment|rating|follow` and `?ordering=`.
//! Only the recipient may read their notifications.

use axum::{
  Json,
  extract::State,
};
use serde::Deserialize;
use stitch_core::{
  feed,
  query::NotificationQuery,
  social::{InteractionType, NotificationEntry},
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
pub struct NotificationParams {
  pub interaction_type: Option<InteractionType>,
}

pub async fn list<S: SocialStore + 'static>(
  State(state): State<AppState<S>>,
  caller: Caller,
  ApiPath(id): ApiPath<Uuid>,
  ApiQuery(paging): ApiQuery<PageParams>,
  ApiQuery(ordering): ApiQuery<OrderingParams>,
  ApiQuery(params): ApiQuery<NotificationParams>,
) -> Result<Json<Paginated<NotificationEntry>>, ApiError> {
  let defaults = NotificationQuery::default();
  let query = NotificationQuery {
    interaction_type: params.interaction_type,
    ordering:         ordering.parse(defaults.ordering)?,
    page:             paging.request(&state.config),
  };
  let req = query.page;
  let page = feed::notification_feed(state.store.as_ref(), caller.profile_id, id, query).await?;
  Ok(Json(Paginated::new(page, &req)?))
}
