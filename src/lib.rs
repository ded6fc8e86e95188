//! Category hierarchy core for the catalog backend.
//!
//! Categories are stored as flat rows linked by `parent_id`. This crate
//! keeps that graph a forest: it checks for cycles before every re-parent,
//! assembles trees on read, answers ancestry questions and cascades
//! activation changes across subtrees.

pub mod core;
pub mod features;
pub mod shared;

pub use crate::core::error::{AppError, Result};
