//! Domain services used by the HTTP routes.
//!
//! ARCHITECTURE
//! ============
//! Service modules own the page lifecycle, visibility rules, rendering and
//! persistence so route handlers can stay focused on request translation.

pub mod condition;
pub mod page;
pub mod persistence;
pub mod render;
