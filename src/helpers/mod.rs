//! Helper functions for templates
//!
//! Plain functions behind the template filters and shortcodes, so they can
//! be used and tested without a template engine.

mod date;
mod html;

pub use date::*;
pub use html::*;
