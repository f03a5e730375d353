//! Content module - handles posts, pages, and content processing

mod frontmatter;
pub mod loader;
mod markdown;
mod post;

pub use frontmatter::{parse_date_string, FrontMatter};
pub use markdown::{html_escape, MarkdownRenderer};
pub use post::{output_path_for, Page, Post};
