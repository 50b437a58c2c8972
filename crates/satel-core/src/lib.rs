//! Shared types used by every layer of the Satel Integra client: the
//! top-level error taxonomy, panel/module capability tables, and small
//! device-wide enums (day of week, arming mode, language) that don't belong
//! to any single protocol layer.

mod error;
mod panel;

pub use error::*;
pub use panel::*;
