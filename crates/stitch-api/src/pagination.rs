//! Page-number pagination shared by every list endpoint.

use serde::{Deserialize, Serialize};
use stitch_core::query::{Page, PageRequest};

use crate::{ApiConfig, error::ApiError};

/// `?page=<n>&page_size=<n>`, both optional.
#[derive(Debug, Default, Deserialize)]
pub struct PageParams {
  pub page:      Option<u32>,
  pub page_size: Option<u32>,
}

impl PageParams {
  pub fn request(&self, config: &ApiConfig) -> PageRequest {
    let size = self
      .page_size
      .unwrap_or(config.default_page_size)
      .min(config.max_page_size);
    PageRequest::new(self.page.unwrap_or(1), size)
  }
}

/// The list envelope: total count, neighbouring page numbers, and one page of
/// results.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Paginated<T> {
  pub count:         u64,
  pub next_page:     Option<u32>,
  pub previous_page: Option<u32>,
  pub results:       Vec<T>,
}

impl<T> Paginated<T> {
  /// Wrap `page`, rejecting a request for a page past the end.
  pub fn new(page: Page<T>, req: &PageRequest) -> Result<Self, ApiError> {
    if page.is_past_end(req) {
      return Err(ApiError::InvalidPage);
    }
    Ok(Self {
      count:         page.count,
      next_page:     page.next_page(req),
      previous_page: page.previous_page(req),
      results:       page.items,
    })
  }
}
