//! SQL schema for the Stitch Space SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

-- Identity records, owned by the authentication collaborator.
CREATE TABLE IF NOT EXISTS accounts (
    account_id    TEXT PRIMARY KEY,
    email         TEXT NOT NULL COLLATE NOCASE UNIQUE,
    first_name    TEXT NOT NULL DEFAULT '',
    last_name     TEXT NOT NULL DEFAULT '',
    password_hash TEXT NOT NULL,   -- argon2 PHC string
    created_at    TEXT NOT NULL
);

-- Exactly one profile per account.
CREATE TABLE IF NOT EXISTS profiles (
    profile_id                 TEXT PRIMARY KEY,
    account_id                 TEXT NOT NULL UNIQUE
                               REFERENCES accounts(account_id) ON DELETE CASCADE,
    biography                  TEXT NOT NULL DEFAULT '',
    image                      TEXT NOT NULL,
    last_visited_notifications TEXT,
    created_at                 TEXT NOT NULL,
    updated_at                 TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS pieces (
    piece_id   TEXT PRIMARY KEY,
    profile_id TEXT NOT NULL REFERENCES profiles(profile_id) ON DELETE CASCADE,
    title      TEXT NOT NULL CHECK (length(title) BETWEEN 1 AND 75),
    image      TEXT NOT NULL,
    art_type   TEXT NOT NULL CHECK (art_type IN
                 ('knitting', 'crochet', 'embroidery', 'weaving', 'dyeing', 'other')),
    featured   INTEGER NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

-- Comments are immutable once written.
CREATE TABLE IF NOT EXISTS comments (
    comment_id TEXT PRIMARY KEY,
    piece_id   TEXT NOT NULL REFERENCES pieces(piece_id) ON DELETE CASCADE,
    profile_id TEXT NOT NULL REFERENCES profiles(profile_id) ON DELETE CASCADE,
    content    TEXT NOT NULL,
    created_at TEXT NOT NULL
);

-- The UNIQUE pair is the authoritative one-rating-per-piece guard.
CREATE TABLE IF NOT EXISTS ratings (
    rating_id  TEXT PRIMARY KEY,
    profile_id TEXT NOT NULL REFERENCES profiles(profile_id) ON DELETE CASCADE,
    piece_id   TEXT NOT NULL REFERENCES pieces(piece_id) ON DELETE CASCADE,
    score      INTEGER NOT NULL CHECK (score BETWEEN 0 AND 5),
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    UNIQUE (profile_id, piece_id)
);

CREATE TABLE IF NOT EXISTS follows (
    follow_id   TEXT PRIMARY KEY,
    follower_id TEXT NOT NULL REFERENCES profiles(profile_id) ON DELETE CASCADE,
    followed_id TEXT NOT NULL REFERENCES profiles(profile_id) ON DELETE CASCADE,
    created_at  TEXT NOT NULL,
    UNIQUE (follower_id, followed_id),
    CHECK  (follower_id != followed_id)
);

-- Append-only; written only as a side effect of comments, ratings and follows.
CREATE TABLE IF NOT EXISTS notifications (
    notification_id  TEXT PRIMARY KEY,
    actor_id         TEXT NOT NULL REFERENCES profiles(profile_id) ON DELETE CASCADE,
    recipient_id     TEXT NOT NULL REFERENCES profiles(profile_id) ON DELETE CASCADE,
    interaction_type TEXT NOT NULL CHECK (interaction_type IN ('comment', 'rating', 'follow')),
    piece_id         TEXT REFERENCES pieces(piece_id) ON DELETE CASCADE,
    created_at       TEXT NOT NULL,
    CHECK ((interaction_type = 'follow') = (piece_id IS NULL))
);

CREATE INDEX IF NOT EXISTS pieces_owner_idx          ON pieces(profile_id);
CREATE INDEX IF NOT EXISTS pieces_created_idx        ON pieces(created_at);
CREATE INDEX IF NOT EXISTS comments_piece_idx        ON comments(piece_id);
CREATE INDEX IF NOT EXISTS ratings_piece_idx         ON ratings(piece_id);
CREATE INDEX IF NOT EXISTS follows_followed_idx      ON follows(followed_id);
CREATE INDEX IF NOT EXISTS notifications_recipient_idx ON notifications(recipient_id);

PRAGMA user_version = 1;
";
