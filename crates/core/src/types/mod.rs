//! Core types for Arvigo.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod channel;
pub mod email;
pub mod id;
pub mod images;
pub mod status;
pub mod tags;

pub use channel::Channel;
pub use email::{Email, EmailError};
pub use id::*;
pub use images::ProductImages;
pub use status::*;
pub use tags::{dedup_preserving_order, parse_tag_ids};
