//! Site configuration (eleventy.yml / eleventy.toml)

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::collection::{CollectionPolicy, PostOrder, UndatedPolicy};

/// Config file names, in lookup order
pub const CONFIG_FILES: [&str; 3] = ["eleventy.yml", "eleventy.yaml", "eleventy.toml"];

/// Main site configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    // Site
    pub title: String,
    pub description: String,
    pub author: String,
    pub url: String,
    pub language: String,
    /// IANA timezone name; empty means the local timezone
    pub timezone: String,

    // Directories
    pub dir: DirConfig,
    /// Copied verbatim, relative to input
    pub passthrough_copy: Vec<String>,
    /// Extra paths to watch, relative to the base directory
    pub watch_targets: Vec<String>,

    // Collections
    pub posts: PostsConfig,

    // Rendering
    pub highlight: HighlightConfig,
    pub draft_label: String,

    // Store any additional fields
    #[serde(flatten)]
    pub extra: HashMap<String, serde_yaml::Value>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "My Blog".to_string(),
            description: String::new(),
            author: String::new(),
            url: "http://localhost:8080".to_string(),
            language: "en".to_string(),
            timezone: String::new(),

            dir: DirConfig::default(),
            passthrough_copy: vec!["css".to_string()],
            watch_targets: vec!["src/css".to_string()],

            posts: PostsConfig::default(),

            highlight: HighlightConfig::default(),
            draft_label: "Draft".to_string(),

            extra: HashMap::new(),
        }
    }
}

impl SiteConfig {
    /// Load configuration from a file, picking the format from its extension
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;

        let config = match path.extension().and_then(|e| e.to_str()) {
            Some("toml") => toml::from_str(&content)
                .map_err(|e| anyhow!("Invalid config {:?}: {}", path, e))?,
            _ => serde_yaml::from_str(&content)
                .map_err(|e| anyhow!("Invalid config {:?}: {}", path, e))?,
        };

        Ok(config)
    }

    /// Find the config file in a base directory
    pub fn find<P: AsRef<Path>>(base_dir: P) -> Option<PathBuf> {
        CONFIG_FILES
            .iter()
            .map(|name| base_dir.as_ref().join(name))
            .find(|path| path.exists())
    }

    /// Load the config file from a base directory, or fall back to defaults
    pub fn discover<P: AsRef<Path>>(base_dir: P) -> Result<Self> {
        match Self::find(&base_dir) {
            Some(path) => {
                tracing::debug!("Loading config from {:?}", path);
                Self::load(path)
            }
            None => {
                tracing::debug!("No config file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Parsed timezone, `None` means local time
    pub fn tz(&self) -> Option<chrono_tz::Tz> {
        if self.timezone.is_empty() {
            return None;
        }
        match self.timezone.parse::<chrono_tz::Tz>() {
            Ok(tz) => Some(tz),
            Err(_) => {
                tracing::warn!("Unknown timezone {:?}, using local time", self.timezone);
                None
            }
        }
    }
}

/// Input and output directories
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DirConfig {
    pub input: String,
    pub output: String,
    /// Layouts directory, relative to input
    pub includes: String,
}

impl Default for DirConfig {
    fn default() -> Self {
        Self {
            input: "src".to_string(),
            output: "public".to_string(),
            includes: "_includes".to_string(),
        }
    }
}

/// The `posts` collection
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PostsConfig {
    /// Glob relative to the input directory
    pub glob: String,
    pub allow_drafts: bool,
    /// Environment variable that turns drafts on when set to `true`
    pub draft_env: String,
    pub undated: UndatedPolicy,
    pub order: PostOrder,
    pub layout: String,
}

impl Default for PostsConfig {
    fn default() -> Self {
        Self {
            glob: "posts/*.md".to_string(),
            allow_drafts: false,
            draft_env: "ALLOW_DRAFT".to_string(),
            undated: UndatedPolicy::Now,
            order: PostOrder::DateDesc,
            layout: "post.html".to_string(),
        }
    }
}

impl PostsConfig {
    /// Collection policy for one build
    pub fn policy(&self, allow_drafts: bool) -> CollectionPolicy {
        CollectionPolicy {
            allow_drafts: allow_drafts || self.allow_drafts,
            undated: self.undated,
            order: self.order,
        }
    }

    /// Literal directory prefix of the glob (`posts/*.md` -> `posts`)
    pub fn posts_dir(&self) -> PathBuf {
        Path::new(&self.glob)
            .components()
            .take_while(|c| {
                !c.as_os_str()
                    .to_string_lossy()
                    .contains(['*', '?', '[', '{'])
            })
            .collect()
    }

    /// Read the draft flag from the environment
    pub fn drafts_from_env(&self) -> bool {
        drafts_from_env(&self.draft_env)
    }
}

/// Whether the named variable is exactly `true`
pub fn drafts_from_env(var: &str) -> bool {
    std::env::var(var).map(|v| v == "true").unwrap_or(false)
}

/// Code highlighting configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HighlightConfig {
    pub enable: bool,
    pub theme: String,
    pub line_number: bool,
}

impl Default for HighlightConfig {
    fn default() -> Self {
        Self {
            enable: true,
            theme: "base16-ocean.dark".to_string(),
            line_number: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SiteConfig::default();
        assert_eq!(config.dir.input, "src");
        assert_eq!(config.dir.output, "public");
        assert_eq!(config.passthrough_copy, vec!["css"]);
        assert_eq!(config.posts.glob, "posts/*.md");
        assert_eq!(config.posts.draft_env, "ALLOW_DRAFT");
        assert_eq!(config.draft_label, "Draft");
    }

    #[test]
    fn test_parse_yaml_config() {
        let yaml = r#"
title: Notes
timezone: Europe/Berlin
dir:
  output: _site
posts:
  undated: reject
  order: discovery
github: someone
"#;
        let config: SiteConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.title, "Notes");
        assert_eq!(config.dir.input, "src");
        assert_eq!(config.dir.output, "_site");
        assert_eq!(config.posts.undated, UndatedPolicy::Reject);
        assert_eq!(config.posts.order, PostOrder::Discovery);
        assert_eq!(config.posts.glob, "posts/*.md");
        assert_eq!(config.tz(), Some(chrono_tz::Europe::Berlin));
        assert!(config.extra.contains_key("github"));
    }

    #[test]
    fn test_load_toml_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("eleventy.toml");
        fs::write(
            &path,
            "title = \"Toml Blog\"\npassthrough_copy = [\"css\", \"img\"]\n\n[posts]\nallow_drafts = true\n",
        )
        .unwrap();

        assert_eq!(SiteConfig::find(dir.path()), Some(path));
        let config = SiteConfig::discover(dir.path()).unwrap();
        assert_eq!(config.title, "Toml Blog");
        assert_eq!(config.passthrough_copy, vec!["css", "img"]);
        assert!(config.posts.allow_drafts);
    }

    #[test]
    fn test_discover_without_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = SiteConfig::discover(dir.path()).unwrap();
        assert_eq!(config.title, "My Blog");
    }

    #[test]
    fn test_policy_merges_flags() {
        let posts = PostsConfig::default();
        assert!(!posts.policy(false).allow_drafts);
        assert!(posts.policy(true).allow_drafts);

        let posts = PostsConfig {
            allow_drafts: true,
            ..Default::default()
        };
        assert!(posts.policy(false).allow_drafts);
    }

    #[test]
    fn test_posts_dir() {
        assert_eq!(PostsConfig::default().posts_dir(), PathBuf::from("posts"));

        let nested = PostsConfig {
            glob: "blog/posts/**/*.md".to_string(),
            ..Default::default()
        };
        assert_eq!(nested.posts_dir(), PathBuf::from("blog/posts"));
    }

    #[test]
    fn test_drafts_from_env_requires_exact_true() {
        std::env::set_var("ELEVENTY_RS_TEST_DRAFTS_A", "true");
        std::env::set_var("ELEVENTY_RS_TEST_DRAFTS_B", "1");
        assert!(drafts_from_env("ELEVENTY_RS_TEST_DRAFTS_A"));
        assert!(!drafts_from_env("ELEVENTY_RS_TEST_DRAFTS_B"));
        assert!(!drafts_from_env("ELEVENTY_RS_TEST_DRAFTS_UNSET"));
    }

    #[test]
    fn test_unknown_timezone_falls_back() {
        let config = SiteConfig {
            timezone: "Mars/Olympus".to_string(),
            ..Default::default()
        };
        assert_eq!(config.tz(), None);
    }
}
