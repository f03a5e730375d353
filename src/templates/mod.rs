//! Layout rendering with the Tera template engine
//!
//! Default layouts are embedded in the binary. Any `.html` file under the
//! includes directory is registered by its relative path and replaces the
//! built-in layout of the same name.

use anyhow::{anyhow, Result};
use serde::Serialize;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tera::{Context, Tera, Value};
use walkdir::WalkDir;

use crate::config::SiteConfig;
use crate::content::{Page, Post};
use crate::helpers::{current_year, iso_date, post_date, strip_html, truncate_chars};

/// Built-in layouts, `(name, source)`
const DEFAULT_LAYOUTS: [(&str, &str); 4] = [
    ("base.html", include_str!("default/base.html")),
    ("post.html", include_str!("default/post.html")),
    ("page.html", include_str!("default/page.html")),
    ("index.html", include_str!("default/index.html")),
];

/// Template renderer with built-in and user layouts
pub struct TemplateRenderer {
    tera: Tera,
}

impl TemplateRenderer {
    /// Create a renderer, loading user layouts from `includes_dir`
    pub fn new(config: &SiteConfig, includes_dir: &Path) -> Result<Self> {
        let mut tera = Tera::default();

        // Output is HTML generated from trusted markdown
        tera.autoescape_on(vec![]);

        let mut layouts: HashMap<String, String> = DEFAULT_LAYOUTS
            .iter()
            .map(|(name, source)| (name.to_string(), source.to_string()))
            .collect();

        for (name, source) in load_user_layouts(includes_dir)? {
            tracing::debug!("Using layout {} from {:?}", name, includes_dir);
            layouts.insert(name, source);
        }

        tera.add_raw_templates(layouts)
            .map_err(|e| anyhow!("Failed to load layouts: {}", describe(&e)))?;

        let draft_label = config.draft_label.clone();
        tera.register_filter(
            "postDate",
            move |value: &Value, _: &HashMap<String, Value>| {
                post_date_filter(value, &draft_label)
            },
        );
        tera.register_filter("isoDate", iso_date_filter);
        tera.register_filter("strip_html", strip_html_filter);
        tera.register_filter("truncate_chars", truncate_chars_filter);

        let tz = config.tz();
        tera.register_function("year", move |_: &HashMap<String, Value>| {
            Ok(Value::String(current_year(tz)))
        });

        Ok(Self { tera })
    }

    /// Whether a layout with this name is registered
    pub fn has_layout(&self, name: &str) -> bool {
        self.tera.get_template_names().any(|n| n == name)
    }

    /// Resolve a front-matter layout name, falling back to `default`
    ///
    /// `post` and `post.html` both name `post.html`.
    pub fn resolve_layout(&self, name: &str, default: &str) -> String {
        let name = if Path::new(name).extension().is_some() {
            name.to_string()
        } else {
            format!("{}.html", name)
        };

        if self.has_layout(&name) {
            name
        } else {
            tracing::warn!("Layout {:?} not found, using {:?}", name, default);
            default.to_string()
        }
    }

    /// Render a template with given context
    pub fn render(&self, template_name: &str, context: &Context) -> Result<String> {
        self.tera
            .render(template_name, context)
            .map_err(|e| anyhow!("Failed to render {}: {}", template_name, describe(&e)))
    }
}

/// Read every `.html` file under the includes directory
fn load_user_layouts(includes_dir: &Path) -> Result<Vec<(String, String)>> {
    if !includes_dir.exists() {
        return Ok(Vec::new());
    }

    let mut layouts = Vec::new();

    for entry in WalkDir::new(includes_dir)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let path = entry.path();
        let is_html = path.extension().map(|e| e == "html").unwrap_or(false);
        if !path.is_file() || !is_html {
            continue;
        }

        let name = path
            .strip_prefix(includes_dir)?
            .to_string_lossy()
            .replace('\\', "/");
        layouts.push((name, fs::read_to_string(path)?));
    }

    Ok(layouts)
}

/// Tera errors keep the useful part in their source chain
fn describe(error: &tera::Error) -> String {
    let mut message = error.to_string();
    let mut source = std::error::Error::source(error);
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

/// Parse a serialized post date; null means undated
fn date_value(name: &str, value: &Value) -> tera::Result<Option<chrono::DateTime<chrono::FixedOffset>>> {
    match value {
        Value::Null => Ok(None),
        Value::String(s) if s.is_empty() => Ok(None),
        Value::String(s) => chrono::DateTime::parse_from_rfc3339(s)
            .map(Some)
            .map_err(|e| tera::Error::msg(format!("Filter `{}`: invalid date {:?}: {}", name, s, e))),
        other => Err(tera::Error::msg(format!(
            "Filter `{}` expects a date string, got {}",
            name, other
        ))),
    }
}

/// Tera filter: medium date, or the draft label for undated posts
fn post_date_filter(value: &Value, draft_label: &str) -> tera::Result<Value> {
    let date = date_value("postDate", value)?;
    Ok(Value::String(post_date(date.as_ref(), draft_label)))
}

/// Tera filter: ISO 8601 date, empty for undated posts
fn iso_date_filter(value: &Value, _args: &HashMap<String, Value>) -> tera::Result<Value> {
    let date = date_value("isoDate", value)?;
    Ok(Value::String(date.as_ref().map(iso_date).unwrap_or_default()))
}

/// Tera filter: strip HTML tags
fn strip_html_filter(value: &Value, _args: &HashMap<String, Value>) -> tera::Result<Value> {
    let s = tera::try_get_value!("strip_html", "value", String, value);
    Ok(Value::String(strip_html(&s)))
}

/// Tera filter: truncate by character count
fn truncate_chars_filter(value: &Value, args: &HashMap<String, Value>) -> tera::Result<Value> {
    let s = tera::try_get_value!("truncate_chars", "value", String, value);
    let length = match args.get("length") {
        Some(val) => tera::try_get_value!("truncate_chars", "length", usize, val),
        None => 150,
    };
    let omission = match args.get("omission") {
        Some(val) => tera::try_get_value!("truncate_chars", "omission", String, val),
        None => "…".to_string(),
    };
    Ok(Value::String(truncate_chars(&s, length, &omission)))
}

// Data structures for template context

#[derive(Debug, Clone, Serialize)]
pub struct SiteData {
    pub title: String,
    pub description: String,
    pub author: String,
    pub url: String,
    pub language: String,
    pub extra: HashMap<String, serde_yaml::Value>,
}

impl From<&SiteConfig> for SiteData {
    fn from(config: &SiteConfig) -> Self {
        Self {
            title: config.title.clone(),
            description: config.description.clone(),
            author: config.author.clone(),
            url: config.url.clone(),
            language: config.language.clone(),
            extra: config.extra.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PostData {
    pub title: String,
    /// RFC 3339, `None` for undated posts
    pub date: Option<String>,
    pub draft: bool,
    pub url: String,
    pub permalink: String,
    pub description: Option<String>,
    pub tags: Vec<String>,
    pub content: String,
    pub extra: HashMap<String, serde_yaml::Value>,
}

impl From<&Post> for PostData {
    fn from(post: &Post) -> Self {
        Self {
            title: post.title.clone(),
            date: post.date.map(|d| d.to_rfc3339()),
            draft: post.is_draft(),
            url: post.url.clone(),
            permalink: post.permalink.clone(),
            description: post.description.clone(),
            tags: post.tags.clone(),
            content: post.content.clone(),
            extra: post.extra.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PageData {
    pub title: String,
    pub date: Option<String>,
    pub url: String,
    pub permalink: String,
    pub description: Option<String>,
    pub content: String,
    pub extra: HashMap<String, serde_yaml::Value>,
}

impl From<&Page> for PageData {
    fn from(page: &Page) -> Self {
        Self {
            title: page.title.clone(),
            date: page.date.map(|d| d.to_rfc3339()),
            url: page.url.clone(),
            permalink: page.permalink.clone(),
            description: page.description.clone(),
            content: page.content.clone(),
            extra: page.extra.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CollectionsData {
    pub posts: Vec<PostData>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NavPost {
    pub title: String,
    pub url: String,
}

impl From<&Post> for NavPost {
    fn from(post: &Post) -> Self {
        Self {
            title: post.title.clone(),
            url: post.url.clone(),
        }
    }
}
