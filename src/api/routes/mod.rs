//! API Routes
//!
//! Route handlers organized by functionality.

pub mod health;
pub mod query;
pub mod reference;
pub mod templates;
pub mod ui;
