//! SQLite backend for the order engine.
//!
//! [`SqliteDatabase`] implements every backend trait. The free functions in [`db`] are the building blocks it
//! composes inside transactions. Schema migrations live in `src/sqlite/migrations` and are embedded at compile time.
mod sqlite_impl;

pub mod db;
pub use sqlite_impl::SqliteDatabase;
