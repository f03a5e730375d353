//! Post and Page models

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// A blog post, one item of the `posts` collection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    /// Post title
    pub title: String,

    /// Publication date, `None` for undated posts
    pub date: Option<DateTime<Local>>,

    /// Draft flag, absent means published
    pub draft: Option<bool>,

    /// Short summary from front-matter
    pub description: Option<String>,

    /// Raw markdown content
    pub raw: String,

    /// Rendered HTML content
    pub content: String,

    /// Post tags
    pub tags: Vec<String>,

    /// Layout template to use
    pub layout: String,

    /// Source file path relative to the input directory
    pub source: String,

    /// Full source file path
    pub full_source: PathBuf,

    /// URL path, always starting and ending with `/` unless it names a file
    pub url: String,

    /// Full permalink URL
    pub permalink: String,

    /// Slug (URL-friendly name)
    pub slug: String,

    /// Custom front-matter fields
    #[serde(flatten)]
    pub extra: HashMap<String, serde_yaml::Value>,
}

impl Post {
    /// Create a new post with minimal required fields
    pub fn new(title: String, date: Option<DateTime<Local>>, source: String) -> Self {
        let slug = slug::slugify(&title);
        Self {
            title,
            date,
            draft: None,
            description: None,
            raw: String::new(),
            content: String::new(),
            tags: Vec::new(),
            layout: "post.html".to_string(),
            source: source.clone(),
            full_source: PathBuf::from(&source),
            url: String::new(),
            permalink: String::new(),
            slug,
            extra: HashMap::new(),
        }
    }

    /// Whether the post is flagged as a draft
    pub fn is_draft(&self) -> bool {
        self.draft.unwrap_or(false)
    }
}

/// A standalone page (any markdown file outside the posts glob)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page {
    /// Page title
    pub title: String,

    /// Optional date from front-matter
    pub date: Option<DateTime<Local>>,

    /// Short summary from front-matter
    pub description: Option<String>,

    /// Raw markdown content
    pub raw: String,

    /// Rendered HTML content
    pub content: String,

    /// Layout template to use
    pub layout: String,

    /// Source file path relative to the input directory
    pub source: String,

    /// Full source file path
    pub full_source: PathBuf,

    /// URL path
    pub url: String,

    /// Full permalink URL
    pub permalink: String,

    /// Custom front-matter fields
    #[serde(flatten)]
    pub extra: HashMap<String, serde_yaml::Value>,
}

impl Page {
    /// Create a new page with minimal required fields
    pub fn new(title: String, source: String) -> Self {
        Self {
            title,
            date: None,
            description: None,
            raw: String::new(),
            content: String::new(),
            layout: "page.html".to_string(),
            source: source.clone(),
            full_source: PathBuf::from(&source),
            url: String::new(),
            permalink: String::new(),
            extra: HashMap::new(),
        }
    }
}

/// Output file for a URL path, relative to the output directory
///
/// `/posts/hello/` maps to `posts/hello/index.html`, `/feed.xml` maps to
/// itself.
pub fn output_path_for(url: &str) -> PathBuf {
    let clean = url.trim_start_matches('/');
    if clean.is_empty() || clean.ends_with('/') {
        PathBuf::from(clean).join("index.html")
    } else if PathBuf::from(clean).extension().is_some() {
        PathBuf::from(clean)
    } else {
        PathBuf::from(clean).join("index.html")
    }
}
