//! Arvigo Core - Shared domain types.
//!
//! This crate provides the types the API crate builds its responses from:
//! - typed entity ids and validated emails
//! - product status, role and sales channel enums
//! - the comma-delimited product image field
//! - [`CatalogTables`], the immutable face-shape / tag / role / marketplace lookups
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no database
//! access, no HTTP clients. The `postgres` feature adds sqlx encode/decode
//! support for the id newtypes.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod catalog;
pub mod types;

pub use catalog::{CatalogTables, CatalogTablesError};
pub use types::*;
