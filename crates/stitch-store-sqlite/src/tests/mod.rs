//! Integration tests for `SqliteStore` against an in-memory database.

mod services;

use stitch_core::{
  piece::{ArtType, NewPiece, Piece},
  profile::{NewAccount, Profile},
  store::SocialStore,
};

use crate::SqliteStore;

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

/// Register an account named `first Tester` with a placeholder hash.
async fn register(s: &SqliteStore, first: &str) -> Profile {
  s.register(NewAccount {
    email:         format!("{}@example.com", first.to_lowercase()),
    first_name:    first.to_owned(),
    last_name:     "Tester".to_owned(),
    password_hash: "$argon2id$v=19$m=19456,t=2,p=1$c2FsdA$aGFzaA".to_owned(),
  })
  .await
  .unwrap()
}

async fn piece(s: &SqliteStore, owner: &Profile, title: &str) -> Piece {
  piece_of(s, owner, title, ArtType::Knitting).await
}

async fn piece_of(s: &SqliteStore, owner: &Profile, title: &str, art_type: ArtType) -> Piece {
  s.insert_piece(owner.profile_id, NewPiece {
    title: title.to_owned(),
    image: None,
    art_type,
  })
  .await
  .unwrap()
}
