//! [`SqliteStore`], the SQLite implementation of [`SocialStore`].

use std::path::Path;

use rusqlite::{OptionalExtension as _, types::Value};
use stitch_core::{
  Constraint,
  piece::{
    Comment, CommentView, DEFAULT_PIECE_IMAGE, NewComment, NewPiece, NewRating,
    Piece, PieceUpdate, PieceView, Rating,
  },
  profile::{
    Credentials, DEFAULT_PROFILE_IMAGE, NewAccount, Profile, ProfileUpdate,
    ProfileView,
  },
  query::{
    CommentField, CommentQuery, FollowField, FollowQuery, NotificationField,
    NotificationQuery, Page, PieceQuery, ProfileQuery, RatingField, RatingQuery,
  },
  social::{
    FollowEdge, FollowerEntry, FollowingEntry, NewNotification, Notification,
    NotificationView,
  },
  store::SocialStore,
};
use uuid::Uuid;

use crate::{
  Error, Result,
  aggregate::{
    PIECE_VIEW_COLUMNS, PIECE_VIEW_FROM, PROFILE_VIEW_COLUMNS, PROFILE_VIEW_FROM,
    RawPieceView, RawProfileView, VIEWER_RATING_JOIN, piece_order, profile_order,
  },
  encode::{
    COMMENT_COLUMNS, RawCard, RawComment, RawCommentView, RawCredentials,
    NOTIFICATION_COLUMNS, RawFollow, RawNotification, RawNotificationView,
    RawPiece, RawProfile, RawRating, decode_dt, decode_uuid, encode_dt, encode_uuid, now,
  },
  listing::{Listing, contains_pattern, order_clause},
  schema::SCHEMA,
};

const PROFILE_SELECT: &str = "profile_id, account_id, biography, image, \
   last_visited_notifications, created_at, updated_at";

const PIECE_SELECT: &str =
  "piece_id, profile_id, title, image, art_type, featured, created_at, updated_at";

const RATING_SELECT: &str =
  "rating_id, profile_id, piece_id, score, created_at, updated_at";

const FOLLOW_SELECT: &str = "follow_id, follower_id, followed_id, created_at";

fn uuid_value(id: Uuid) -> Value { Value::Text(encode_uuid(id)) }

fn into_page<R, T>(
  (count, raws): (i64, Vec<R>),
  convert: impl Fn(R) -> Result<T>,
) -> Result<Page<T>> {
  Ok(Page {
    count: u64::try_from(count).unwrap_or_default(),
    items: raws.into_iter().map(convert).collect::<Result<_>>()?,
  })
}

/// One row of a followers/following listing: the edge plus the counterpart.
struct RawFollowEntry {
  follow_id:  String,
  created_at: String,
  profile:    RawProfileView,
}

impl RawFollowEntry {
  fn read(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      follow_id:  row.get(0)?,
      created_at: row.get(1)?,
      profile:    RawProfileView::read(row, 2)?,
    })
  }

  fn into_parts(self) -> Result<(Uuid, chrono::DateTime<chrono::Utc>, ProfileView)> {
    Ok((
      decode_uuid(&self.follow_id)?,
      decode_dt(&self.created_at)?,
      self.profile.into_view()?,
    ))
  }
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Stitch Space store backed by a single SQLite file.
///
/// Clones share the inner connection.
#[derive(Clone)]
pub struct SqliteStore {
  pub(crate) conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Delete one row by primary key; `true` if a row went away.
  async fn delete_by_id(&self, table: &'static str, key: &'static str, id: Uuid) -> Result<bool> {
    let id_str = encode_uuid(id);
    let n = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          &format!("DELETE FROM {table} WHERE {key} = ?1"),
          rusqlite::params![id_str],
        )?)
      })
      .await?;
    Ok(n > 0)
  }

  async fn follow_listing(
    &self,
    profile: Uuid,
    query: FollowQuery,
    counterpart: &'static str,
    anchor: &'static str,
  ) -> Result<(i64, Vec<RawFollowEntry>)> {
    let FollowField::CreatedAt = query.ordering.field;
    let mut listing = Listing::new(
      format!("fe.follow_id, fe.created_at, {PROFILE_VIEW_COLUMNS}"),
      format!(
        "follows fe
         JOIN profiles pr ON pr.profile_id = fe.{counterpart}
         JOIN accounts a  ON a.account_id  = pr.account_id"
      ),
      order_clause("fe.created_at", query.ordering.direction, "fe.rowid"),
      query.page,
    );
    listing.filter(format!("fe.{anchor} = ?"), [uuid_value(profile)]);
    if let Some(follower) = query.follower {
      listing.filter("fe.follower_id = ?", [uuid_value(follower)]);
    }

    Ok(
      self
        .conn
        .call(move |conn| Ok(listing.run(conn, RawFollowEntry::read)?))
        .await?,
    )
  }
}

// ─── SocialStore impl ────────────────────────────────────────────────────────

impl SocialStore for SqliteStore {
  type Error = Error;

  // ── Identity ──────────────────────────────────────────────────────────────

  async fn register(&self, account: NewAccount) -> Result<Profile> {
    let at = now();
    let profile = Profile {
      profile_id:                 Uuid::new_v4(),
      account_id:                 Uuid::new_v4(),
      biography:                  String::new(),
      image:                      DEFAULT_PROFILE_IMAGE.to_owned(),
      last_visited_notifications: None,
      created_at:                 at,
      updated_at:                 at,
    };

    let account_id_str = encode_uuid(profile.account_id);
    let profile_id_str = encode_uuid(profile.profile_id);
    let at_str         = encode_dt(at);
    let image          = profile.image.clone();

    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        tx.execute(
          "INSERT INTO accounts (
             account_id, email, first_name, last_name, password_hash, created_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
          rusqlite::params![
            account_id_str,
            account.email.trim(),
            account.first_name,
            account.last_name,
            account.password_hash,
            at_str,
          ],
        )?;
        tx.execute(
          "INSERT INTO profiles (profile_id, account_id, image, created_at, updated_at)
           VALUES (?1, ?2, ?3, ?4, ?4)",
          rusqlite::params![profile_id_str, account_id_str, image, at_str],
        )?;
        tx.commit()?;
        Ok(())
      })
      .await
      .map_err(|e| Error::on_unique(e, Constraint::AccountEmail))?;

    Ok(profile)
  }

  async fn credentials(&self, email: String) -> Result<Option<Credentials>> {
    let raw: Option<RawCredentials> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT pr.profile_id, a.password_hash
               FROM accounts a
               JOIN profiles pr ON pr.account_id = a.account_id
               WHERE a.email = ?1",
              rusqlite::params![email.trim()],
              |row| {
                Ok(RawCredentials {
                  profile_id:    row.get(0)?,
                  password_hash: row.get(1)?,
                })
              },
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawCredentials::into_credentials).transpose()
  }

  async fn delete_account(&self, account_id: Uuid) -> Result<bool> {
    self.delete_by_id("accounts", "account_id", account_id).await
  }

  // ── Profiles ──────────────────────────────────────────────────────────────

  async fn get_profile(&self, id: Uuid) -> Result<Option<Profile>> {
    let id_str = encode_uuid(id);
    let raw: Option<RawProfile> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {PROFILE_SELECT} FROM profiles WHERE profile_id = ?1"),
              rusqlite::params![id_str],
              |row| RawProfile::read(row, 0),
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawProfile::into_profile).transpose()
  }

  async fn profile_view(&self, id: Uuid) -> Result<Option<ProfileView>> {
    let id_str = encode_uuid(id);
    let raw: Option<RawProfileView> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!(
                "SELECT {PROFILE_VIEW_COLUMNS} FROM {PROFILE_VIEW_FROM}
                 WHERE pr.profile_id = ?1"
              ),
              rusqlite::params![id_str],
              |row| RawProfileView::read(row, 0),
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawProfileView::into_view).transpose()
  }

  async fn list_profiles(&self, query: ProfileQuery) -> Result<Page<ProfileView>> {
    let listing = Listing::new(
      PROFILE_VIEW_COLUMNS,
      PROFILE_VIEW_FROM,
      profile_order(query.ordering),
      query.page,
    );

    let rows = self
      .conn
      .call(move |conn| Ok(listing.run(conn, |row| RawProfileView::read(row, 0))?))
      .await?;

    into_page(rows, RawProfileView::into_view)
  }

  async fn update_profile(&self, id: Uuid, update: ProfileUpdate) -> Result<Profile> {
    let id_str      = encode_uuid(id);
    let at_str      = encode_dt(now());
    let visited_str = update.last_visited_notifications.map(encode_dt);

    let raw: Option<RawProfile> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let account_id: Option<String> = tx
          .query_row(
            "SELECT account_id FROM profiles WHERE profile_id = ?1",
            rusqlite::params![id_str],
            |row| row.get(0),
          )
          .optional()?;
        let Some(account_id) = account_id else {
          return Ok(None);
        };

        tx.execute(
          "UPDATE accounts SET
             first_name = COALESCE(?1, first_name),
             last_name  = COALESCE(?2, last_name),
             email      = COALESCE(?3, email)
           WHERE account_id = ?4",
          rusqlite::params![
            update.first_name,
            update.last_name,
            update.email.as_deref().map(str::trim),
            account_id,
          ],
        )?;
        tx.execute(
          "UPDATE profiles SET
             biography                  = COALESCE(?1, biography),
             image                      = COALESCE(?2, image),
             last_visited_notifications = COALESCE(?3, last_visited_notifications),
             updated_at                 = ?4
           WHERE profile_id = ?5",
          rusqlite::params![update.biography, update.image, visited_str, at_str, id_str],
        )?;

        let raw = tx.query_row(
          &format!("SELECT {PROFILE_SELECT} FROM profiles WHERE profile_id = ?1"),
          rusqlite::params![id_str],
          |row| RawProfile::read(row, 0),
        )?;
        tx.commit()?;
        Ok(Some(raw))
      })
      .await
      .map_err(|e| Error::on_unique(e, Constraint::AccountEmail))?;

    raw
      .ok_or(Error::Core(stitch_core::Error::ProfileNotFound(id)))?
      .into_profile()
  }

  // ── Follow edges ──────────────────────────────────────────────────────────

  async fn find_follow(&self, follower: Uuid, followed: Uuid) -> Result<Option<FollowEdge>> {
    let follower_str = encode_uuid(follower);
    let followed_str = encode_uuid(followed);

    let raw: Option<RawFollow> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!(
                "SELECT {FOLLOW_SELECT} FROM follows
                 WHERE follower_id = ?1 AND followed_id = ?2"
              ),
              rusqlite::params![follower_str, followed_str],
              |row| RawFollow::read(row, 0),
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawFollow::into_edge).transpose()
  }

  async fn insert_follow(&self, follower: Uuid, followed: Uuid) -> Result<FollowEdge> {
    let edge = FollowEdge {
      follow_id:   Uuid::new_v4(),
      follower_id: follower,
      followed_id: followed,
      created_at:  now(),
    };

    let id_str       = encode_uuid(edge.follow_id);
    let follower_str = encode_uuid(follower);
    let followed_str = encode_uuid(followed);
    let at_str       = encode_dt(edge.created_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO follows (follow_id, follower_id, followed_id, created_at)
           VALUES (?1, ?2, ?3, ?4)",
          rusqlite::params![id_str, follower_str, followed_str, at_str],
        )?;
        Ok(())
      })
      .await
      .map_err(|e| Error::on_unique(e, Constraint::Follow))?;

    Ok(edge)
  }

  async fn delete_follow(&self, follow_id: Uuid) -> Result<bool> {
    self.delete_by_id("follows", "follow_id", follow_id).await
  }

  async fn list_followers(
    &self,
    profile: Uuid,
    query: FollowQuery,
  ) -> Result<Page<FollowerEntry>> {
    let rows = self
      .follow_listing(profile, query, "follower_id", "followed_id")
      .await?;
    into_page(rows, |raw| {
      let (follow_id, created_at, follower) = raw.into_parts()?;
      Ok(FollowerEntry { follow_id, follower, created_at })
    })
  }

  async fn list_following(
    &self,
    profile: Uuid,
    mut query: FollowQuery,
  ) -> Result<Page<FollowingEntry>> {
    // The follower filter only makes sense on a followers listing.
    query.follower = None;
    let rows = self
      .follow_listing(profile, query, "followed_id", "follower_id")
      .await?;
    into_page(rows, |raw| {
      let (follow_id, created_at, followed) = raw.into_parts()?;
      Ok(FollowingEntry { follow_id, followed, created_at })
    })
  }

  async fn followed_ids(&self, profile: Uuid) -> Result<Vec<Uuid>> {
    let id_str = encode_uuid(profile);
    let raws: Vec<String> = self
      .conn
      .call(move |conn| {
        let mut stmt =
          conn.prepare("SELECT followed_id FROM follows WHERE follower_id = ?1")?;
        let rows = stmt
          .query_map(rusqlite::params![id_str], |row| row.get(0))?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.iter().map(|s| decode_uuid(s)).collect()
  }

  // ── Pieces ────────────────────────────────────────────────────────────────

  async fn insert_piece(&self, owner: Uuid, input: NewPiece) -> Result<Piece> {
    let at = now();
    let piece = Piece {
      piece_id:   Uuid::new_v4(),
      profile_id: owner,
      title:      input.title,
      image:      input.image.unwrap_or_else(|| DEFAULT_PIECE_IMAGE.to_owned()),
      art_type:   input.art_type,
      featured:   false,
      created_at: at,
      updated_at: at,
    };

    let id_str    = encode_uuid(piece.piece_id);
    let owner_str = encode_uuid(owner);
    let title     = piece.title.clone();
    let image     = piece.image.clone();
    let art_type  = piece.art_type.as_ref().to_owned();
    let at_str    = encode_dt(at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO pieces (
             piece_id, profile_id, title, image, art_type, featured, created_at, updated_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, 0, ?6, ?6)",
          rusqlite::params![id_str, owner_str, title, image, art_type, at_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(piece)
  }

  async fn get_piece(&self, id: Uuid) -> Result<Option<Piece>> {
    let id_str = encode_uuid(id);
    let raw: Option<RawPiece> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {PIECE_SELECT} FROM pieces WHERE piece_id = ?1"),
              rusqlite::params![id_str],
              |row| RawPiece::read(row, 0),
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawPiece::into_piece).transpose()
  }

  async fn piece_view(&self, id: Uuid, viewer: Option<Uuid>) -> Result<Option<PieceView>> {
    let id_str     = encode_uuid(id);
    let viewer_str = viewer.map(encode_uuid);

    let raw: Option<RawPieceView> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!(
                "SELECT {PIECE_VIEW_COLUMNS} FROM {PIECE_VIEW_FROM} {VIEWER_RATING_JOIN}
                 WHERE p.piece_id = ?"
              ),
              rusqlite::params![viewer_str, id_str],
              RawPieceView::read,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawPieceView::into_view).transpose()
  }

  async fn list_pieces(&self, query: PieceQuery) -> Result<Page<PieceView>> {
    let viewer = query.viewer.map(uuid_value).unwrap_or(Value::Null);
    let mut listing = Listing::new(
      PIECE_VIEW_COLUMNS,
      PIECE_VIEW_FROM,
      piece_order(query.ordering),
      query.page,
    )
    .join(VIEWER_RATING_JOIN, vec![viewer]);

    if let Some(art_type) = query.art_type {
      listing.filter("p.art_type = ?", [Value::Text(art_type.as_ref().to_owned())]);
    }
    if let Some(owner) = query.owner {
      listing.filter("p.profile_id = ?", [uuid_value(owner)]);
    }
    if let Some(follower) = query.followed_by {
      listing.filter(
        "p.profile_id IN (SELECT followed_id FROM follows WHERE follower_id = ?)",
        [uuid_value(follower)],
      );
    }
    if let Some(featured) = query.featured {
      listing.filter("p.featured = ?", [Value::Integer(i64::from(featured))]);
    }
    if let Some(search) = query.search.as_deref().map(str::trim)
      && !search.is_empty()
    {
      let pattern = contains_pattern(search);
      listing.filter(
        "(p.title LIKE ? ESCAPE '\\'
          OR oa.first_name LIKE ? ESCAPE '\\'
          OR oa.last_name LIKE ? ESCAPE '\\')",
        [
          Value::Text(pattern.clone()),
          Value::Text(pattern.clone()),
          Value::Text(pattern),
        ],
      );
    }

    let rows = self
      .conn
      .call(move |conn| Ok(listing.run(conn, RawPieceView::read)?))
      .await?;

    into_page(rows, RawPieceView::into_view)
  }

  async fn update_piece(&self, id: Uuid, update: PieceUpdate) -> Result<Piece> {
    let id_str   = encode_uuid(id);
    let at_str   = encode_dt(now());
    let art_type = update.art_type.map(|t| t.as_ref().to_owned());

    let raw: Option<RawPiece> = self
      .conn
      .call(move |conn| {
        let n = conn.execute(
          "UPDATE pieces SET
             title      = COALESCE(?1, title),
             image      = COALESCE(?2, image),
             art_type   = COALESCE(?3, art_type),
             updated_at = ?4
           WHERE piece_id = ?5",
          rusqlite::params![update.title, update.image, art_type, at_str, id_str],
        )?;
        if n == 0 {
          return Ok(None);
        }
        Ok(Some(conn.query_row(
          &format!("SELECT {PIECE_SELECT} FROM pieces WHERE piece_id = ?1"),
          rusqlite::params![id_str],
          |row| RawPiece::read(row, 0),
        )?))
      })
      .await?;

    raw
      .ok_or(Error::Core(stitch_core::Error::PieceNotFound(id)))?
      .into_piece()
  }

  async fn set_featured(&self, id: Uuid, featured: bool) -> Result<Piece> {
    let id_str = encode_uuid(id);
    let at_str = encode_dt(now());

    let raw: Option<RawPiece> = self
      .conn
      .call(move |conn| {
        let n = conn.execute(
          "UPDATE pieces SET featured = ?1, updated_at = ?2 WHERE piece_id = ?3",
          rusqlite::params![featured, at_str, id_str],
        )?;
        if n == 0 {
          return Ok(None);
        }
        Ok(Some(conn.query_row(
          &format!("SELECT {PIECE_SELECT} FROM pieces WHERE piece_id = ?1"),
          rusqlite::params![id_str],
          |row| RawPiece::read(row, 0),
        )?))
      })
      .await?;

    raw
      .ok_or(Error::Core(stitch_core::Error::PieceNotFound(id)))?
      .into_piece()
  }

  async fn delete_piece(&self, id: Uuid) -> Result<bool> {
    self.delete_by_id("pieces", "piece_id", id).await
  }

  // ── Comments ──────────────────────────────────────────────────────────────

  async fn insert_comment(&self, input: NewComment) -> Result<Comment> {
    let comment = Comment {
      comment_id: Uuid::new_v4(),
      piece_id:   input.piece_id,
      profile_id: input.profile_id,
      content:    input.content,
      created_at: now(),
    };

    let id_str      = encode_uuid(comment.comment_id);
    let piece_str   = encode_uuid(comment.piece_id);
    let profile_str = encode_uuid(comment.profile_id);
    let content     = comment.content.clone();
    let at_str      = encode_dt(comment.created_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO comments (comment_id, piece_id, profile_id, content, created_at)
           VALUES (?1, ?2, ?3, ?4, ?5)",
          rusqlite::params![id_str, piece_str, profile_str, content, at_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(comment)
  }

  async fn list_comments(&self, piece: Uuid, query: CommentQuery) -> Result<Page<CommentView>> {
    let CommentField::CreatedAt = query.ordering.field;
    let mut listing = Listing::new(
      "c.comment_id, c.piece_id, c.profile_id, c.content, c.created_at,
       pr.profile_id, a.first_name, a.last_name, pr.image",
      "comments c
       JOIN profiles pr ON pr.profile_id = c.profile_id
       JOIN accounts a  ON a.account_id  = pr.account_id",
      order_clause("c.created_at", query.ordering.direction, "c.rowid"),
      query.page,
    );
    listing.filter("c.piece_id = ?", [uuid_value(piece)]);

    let rows = self
      .conn
      .call(move |conn| {
        Ok(listing.run(conn, |row| {
          Ok(RawCommentView {
            comment: RawComment::read(row, 0)?,
            author:  RawCard::read(row, COMMENT_COLUMNS)?,
          })
        })?)
      })
      .await?;

    into_page(rows, RawCommentView::into_view)
  }

  // ── Ratings ───────────────────────────────────────────────────────────────

  async fn insert_rating(&self, input: NewRating) -> Result<Rating> {
    let at = now();
    let rating = Rating {
      rating_id:  Uuid::new_v4(),
      profile_id: input.profile_id,
      piece_id:   input.piece_id,
      score:      input.score,
      created_at: at,
      updated_at: at,
    };

    let id_str      = encode_uuid(rating.rating_id);
    let profile_str = encode_uuid(rating.profile_id);
    let piece_str   = encode_uuid(rating.piece_id);
    let score       = rating.score;
    let at_str      = encode_dt(at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO ratings (
             rating_id, profile_id, piece_id, score, created_at, updated_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?5)",
          rusqlite::params![id_str, profile_str, piece_str, score, at_str],
        )?;
        Ok(())
      })
      .await
      .map_err(|e| Error::on_unique(e, Constraint::Rating))?;

    Ok(rating)
  }

  async fn get_rating(&self, id: Uuid) -> Result<Option<Rating>> {
    let id_str = encode_uuid(id);
    let raw: Option<RawRating> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {RATING_SELECT} FROM ratings WHERE rating_id = ?1"),
              rusqlite::params![id_str],
              |row| RawRating::read(row, 0),
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawRating::into_rating).transpose()
  }

  async fn find_rating(&self, profile: Uuid, piece: Uuid) -> Result<Option<Rating>> {
    let profile_str = encode_uuid(profile);
    let piece_str   = encode_uuid(piece);

    let raw: Option<RawRating> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!(
                "SELECT {RATING_SELECT} FROM ratings
                 WHERE profile_id = ?1 AND piece_id = ?2"
              ),
              rusqlite::params![profile_str, piece_str],
              |row| RawRating::read(row, 0),
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawRating::into_rating).transpose()
  }

  async fn update_rating(&self, id: Uuid, score: u8) -> Result<Rating> {
    let id_str = encode_uuid(id);
    let at_str = encode_dt(now());

    let raw: Option<RawRating> = self
      .conn
      .call(move |conn| {
        let n = conn.execute(
          "UPDATE ratings SET score = ?1, updated_at = ?2 WHERE rating_id = ?3",
          rusqlite::params![score, at_str, id_str],
        )?;
        if n == 0 {
          return Ok(None);
        }
        Ok(Some(conn.query_row(
          &format!("SELECT {RATING_SELECT} FROM ratings WHERE rating_id = ?1"),
          rusqlite::params![id_str],
          |row| RawRating::read(row, 0),
        )?))
      })
      .await?;

    raw
      .ok_or(Error::Core(stitch_core::Error::RatingNotFound(id)))?
      .into_rating()
  }

  async fn delete_rating(&self, id: Uuid) -> Result<bool> {
    self.delete_by_id("ratings", "rating_id", id).await
  }

  async fn list_ratings(&self, query: RatingQuery) -> Result<Page<Rating>> {
    let expr = match query.ordering.field {
      RatingField::CreatedAt => "created_at",
      RatingField::UpdatedAt => "updated_at",
      RatingField::Score => "score",
    };
    let mut listing = Listing::new(
      RATING_SELECT,
      "ratings",
      order_clause(expr, query.ordering.direction, "rowid"),
      query.page,
    );
    if let Some(piece) = query.piece {
      listing.filter("piece_id = ?", [uuid_value(piece)]);
    }
    if let Some(profile) = query.profile {
      listing.filter("profile_id = ?", [uuid_value(profile)]);
    }

    let rows = self
      .conn
      .call(move |conn| Ok(listing.run(conn, |row| RawRating::read(row, 0))?))
      .await?;

    into_page(rows, RawRating::into_rating)
  }

  // ── Notifications ─────────────────────────────────────────────────────────

  async fn insert_notification(&self, input: NewNotification) -> Result<Notification> {
    let notification = Notification {
      notification_id:  Uuid::new_v4(),
      actor_id:         input.actor_id,
      recipient_id:     input.recipient_id,
      interaction_type: input.interaction_type,
      piece_id:         input.piece_id,
      created_at:       now(),
    };

    let id_str        = encode_uuid(notification.notification_id);
    let actor_str     = encode_uuid(notification.actor_id);
    let recipient_str = encode_uuid(notification.recipient_id);
    let kind          = notification.interaction_type.as_ref().to_owned();
    let piece_str     = notification.piece_id.map(encode_uuid);
    let at_str        = encode_dt(notification.created_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO notifications (
             notification_id, actor_id, recipient_id, interaction_type, piece_id, created_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
          rusqlite::params![id_str, actor_str, recipient_str, kind, piece_str, at_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(notification)
  }

  async fn list_notifications(
    &self,
    recipient: Uuid,
    query: NotificationQuery,
  ) -> Result<Page<NotificationView>> {
    let expr = match query.ordering.field {
      NotificationField::CreatedAt => "n.created_at",
      NotificationField::InteractionType => "n.interaction_type",
    };
    let mut listing = Listing::new(
      "n.notification_id, n.actor_id, n.recipient_id, n.interaction_type,
       n.piece_id, n.created_at,
       ap.profile_id, aa.first_name, aa.last_name, ap.image,
       p.piece_id, p.title, p.image",
      "notifications n
       JOIN profiles ap ON ap.profile_id = n.actor_id
       JOIN accounts aa ON aa.account_id = ap.account_id
       LEFT JOIN pieces p ON p.piece_id = n.piece_id",
      order_clause(expr, query.ordering.direction, "n.rowid"),
      query.page,
    );
    listing.filter("n.recipient_id = ?", [uuid_value(recipient)]);
    if let Some(kind) = query.interaction_type {
      listing.filter("n.interaction_type = ?", [Value::Text(kind.as_ref().to_owned())]);
    }

    let rows = self
      .conn
      .call(move |conn| {
        Ok(listing.run(conn, |row| {
          let actor = NOTIFICATION_COLUMNS;
          let card = actor + 4;
          let piece_id: Option<String> = row.get(card)?;
          let piece = match piece_id {
            Some(id) => Some((id, row.get(card + 1)?, row.get(card + 2)?)),
            None => None,
          };
          Ok(RawNotificationView {
            notification: RawNotification::read(row, 0)?,
            actor:        RawCard::read(row, actor)?,
            piece,
          })
        })?)
      })
      .await?;

    into_page(rows, RawNotificationView::into_view)
  }
}
