//! Core types and trait definitions for Stitch Space.
//!
//! This crate is deliberately free of HTTP and database dependencies. It owns
//! the domain records, the [`store::SocialStore`] abstraction, and the social
//! rules that sit on top of it: follow management, interaction guards,
//! notification dispatch, and feed composition.

pub mod error;
pub mod feed;
pub mod follow;
pub mod guard;
pub mod interact;
pub mod notify;
pub mod piece;
pub mod profile;
pub mod query;
pub mod social;
pub mod store;

pub use error::{Constraint, Error, Result};
