//! Listing parameters: orderings, pagination, and per-collection filters.

use std::str::FromStr;

use uuid::Uuid;

use crate::{Error, Result, piece::ArtType, social::InteractionType};

// ─── Ordering ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
  #[default]
  Asc,
  Desc,
}

/// A sort key plus direction. Parses from `field` (ascending) or `-field`
/// (descending).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ordering<F> {
  pub field:     F,
  pub direction: Direction,
}

impl<F> Ordering<F> {
  pub fn asc(field: F) -> Self { Self { field, direction: Direction::Asc } }

  pub fn desc(field: F) -> Self { Self { field, direction: Direction::Desc } }
}

impl<F: FromStr> FromStr for Ordering<F> {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> {
    let (direction, name) = match s.trim().strip_prefix('-') {
      Some(rest) => (Direction::Desc, rest),
      None => (Direction::Asc, s.trim()),
    };
    let field = name
      .parse()
      .map_err(|_| Error::InvalidOrdering(s.to_owned()))?;
    Ok(Self { field, direction })
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum PieceField {
  CreatedAt,
  UpdatedAt,
  Title,
  ArtType,
  Featured,
  #[strum(serialize = "rating", serialize = "avg_rating")]
  Rating,
  CommentCount,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum ProfileField {
  CreatedAt,
  UpdatedAt,
  #[strum(serialize = "followers", serialize = "follower_count")]
  Followers,
  #[strum(serialize = "following", serialize = "following_count")]
  Following,
  #[strum(serialize = "pieces", serialize = "piece_count")]
  Pieces,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum FollowField {
  CreatedAt,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum CommentField {
  CreatedAt,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum RatingField {
  CreatedAt,
  UpdatedAt,
  Score,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum NotificationField {
  CreatedAt,
  InteractionType,
}

// ─── Pagination ──────────────────────────────────────────────────────────────

pub const DEFAULT_PAGE_SIZE: u32 = 100;
pub const MAX_PAGE_SIZE: u32 = 1000;

/// A 1-based page number and page size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
  pub page:      u32,
  pub page_size: u32,
}

impl PageRequest {
  /// Clamp the page to at least 1 and the size to `1..=MAX_PAGE_SIZE`.
  pub fn new(page: u32, page_size: u32) -> Self {
    Self {
      page:      page.max(1),
      page_size: page_size.clamp(1, MAX_PAGE_SIZE),
    }
  }

  pub fn limit(&self) -> u64 { u64::from(self.page_size) }

  pub fn offset(&self) -> u64 {
    u64::from(self.page - 1) * u64::from(self.page_size)
  }
}

impl Default for PageRequest {
  fn default() -> Self { Self::new(1, DEFAULT_PAGE_SIZE) }
}

/// One page of a listing plus the total number of matching rows.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
  pub count: u64,
  pub items: Vec<T>,
}

impl<T> Page<T> {
  pub fn empty() -> Self { Self { count: 0, items: Vec::new() } }

  pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
    Page { count: self.count, items: self.items.into_iter().map(f).collect() }
  }

  /// The page after `req`, if any rows remain.
  pub fn next_page(&self, req: &PageRequest) -> Option<u32> {
    (req.offset() + req.limit() < self.count).then(|| req.page + 1)
  }

  /// The page before `req`, if `req` is not the first.
  pub fn previous_page(&self, req: &PageRequest) -> Option<u32> {
    (req.page > 1).then(|| req.page - 1)
  }

  /// A page other than the first that starts beyond the last row.
  pub fn is_past_end(&self, req: &PageRequest) -> bool {
    req.page > 1 && req.offset() >= self.count
  }
}

// ─── Per-collection queries ──────────────────────────────────────────────────

/// Parameters for [`crate::store::SocialStore::list_pieces`].
#[derive(Debug, Clone)]
pub struct PieceQuery {
  pub art_type:    Option<ArtType>,
  pub owner:       Option<Uuid>,
  /// Restrict to pieces owned by profiles this profile follows.
  pub followed_by: Option<Uuid>,
  pub featured:    Option<bool>,
  /// Case-insensitive substring of the title or the owner's names.
  pub search:      Option<String>,
  /// Profile whose own rating should be attached to each piece.
  pub viewer:      Option<Uuid>,
  pub ordering:    Ordering<PieceField>,
  pub page:        PageRequest,
}

impl Default for PieceQuery {
  fn default() -> Self {
    Self {
      art_type:    None,
      owner:       None,
      followed_by: None,
      featured:    None,
      search:      None,
      viewer:      None,
      ordering:    Ordering::desc(PieceField::CreatedAt),
      page:        PageRequest::default(),
    }
  }
}

#[derive(Debug, Clone)]
pub struct ProfileQuery {
  pub ordering: Ordering<ProfileField>,
  pub page:     PageRequest,
}

impl Default for ProfileQuery {
  fn default() -> Self {
    Self { ordering: Ordering::asc(ProfileField::CreatedAt), page: PageRequest::default() }
  }
}

#[derive(Debug, Clone)]
pub struct FollowQuery {
  /// Followers listing only: restrict to edges from this profile.
  pub follower: Option<Uuid>,
  pub ordering: Ordering<FollowField>,
  pub page:     PageRequest,
}

impl Default for FollowQuery {
  fn default() -> Self {
    Self {
      follower: None,
      ordering: Ordering::asc(FollowField::CreatedAt),
      page:     PageRequest::default(),
    }
  }
}

#[derive(Debug, Clone)]
pub struct CommentQuery {
  pub ordering: Ordering<CommentField>,
  pub page:     PageRequest,
}

impl Default for CommentQuery {
  fn default() -> Self {
    Self { ordering: Ordering::desc(CommentField::CreatedAt), page: PageRequest::default() }
  }
}

#[derive(Debug, Clone)]
pub struct RatingQuery {
  pub piece:    Option<Uuid>,
  pub profile:  Option<Uuid>,
  pub ordering: Ordering<RatingField>,
  pub page:     PageRequest,
}

impl Default for RatingQuery {
  fn default() -> Self {
    Self {
      piece:    None,
      profile:  None,
      ordering: Ordering::desc(RatingField::CreatedAt),
      page:     PageRequest::default(),
    }
  }
}

#[derive(Debug, Clone)]
pub struct NotificationQuery {
  pub interaction_type: Option<InteractionType>,
  pub ordering:         Ordering<NotificationField>,
  pub page:             PageRequest,
}

impl Default for NotificationQuery {
  fn default() -> Self {
    Self {
      interaction_type: None,
      ordering:         Ordering::desc(NotificationField::CreatedAt),
      page:             PageRequest::default(),
    }
  }
}
