//! Link store backed by SQLite.
//!
//! `repo` holds the SQL-only functions; rows map into
//! [`crate::model::LinkRecord`]. Callers import from `tg_linkbot::db`.

pub mod repo;

pub use repo::*;
