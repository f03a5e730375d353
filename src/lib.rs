//! eleventy-rs: a fast static blog generator
//!
//! Markdown posts matched by a glob become the `posts` collection: drafts
//! are hidden unless allowed, the rest ordered newest first. Posts and pages
//! are rendered through Tera layouts with highlighted code blocks, and
//! static assets such as CSS are copied through verbatim.

pub mod collection;
pub mod commands;
pub mod config;
pub mod content;
pub mod generator;
pub mod helpers;
pub mod server;
pub mod templates;

use anyhow::Result;
use std::path::{Path, PathBuf};

use collection::CollectionPolicy;

/// The main site handle
#[derive(Debug, Clone)]
pub struct Eleventy {
    /// Site configuration
    pub config: config::SiteConfig,
    /// Base (project) directory
    pub base_dir: PathBuf,
    /// Input directory
    pub input_dir: PathBuf,
    /// Output directory
    pub output_dir: PathBuf,
    /// Layouts directory
    pub includes_dir: PathBuf,
    /// Draft visibility for this run, on top of the config setting
    pub allow_drafts: bool,
}

impl Eleventy {
    /// Create a new site from a directory
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        let config = config::SiteConfig::discover(&base_dir)?;
        Ok(Self::with_config(base_dir, config))
    }

    /// Create a site from an already loaded config
    pub fn with_config(base_dir: PathBuf, config: config::SiteConfig) -> Self {
        let input_dir = base_dir.join(&config.dir.input);
        let output_dir = base_dir.join(&config.dir.output);
        let includes_dir = input_dir.join(&config.dir.includes);

        Self {
            config,
            base_dir,
            input_dir,
            output_dir,
            includes_dir,
            allow_drafts: false,
        }
    }

    /// Allow drafts for this run
    pub fn with_drafts(mut self, allow_drafts: bool) -> Self {
        self.allow_drafts = allow_drafts;
        self
    }

    /// Collection policy for this run
    pub fn collection_policy(&self) -> CollectionPolicy {
        self.config.posts.policy(self.allow_drafts)
    }

    /// Path of the config file, if there is one
    pub fn config_path(&self) -> Option<PathBuf> {
        config::SiteConfig::find(&self.base_dir)
    }

    /// Paths a watcher should follow: the input directory, watch targets
    /// outside it and the config file
    pub fn watch_paths(&self) -> Vec<PathBuf> {
        let mut paths = vec![self.input_dir.clone()];

        paths.extend(
            self.config
                .watch_targets
                .iter()
                .map(|target| self.base_dir.join(target.trim_start_matches("./")))
                .filter(|path| !path.starts_with(&self.input_dir)),
        );

        paths.extend(self.config_path());
        paths
    }

    /// Build the site
    pub fn build(&self) -> Result<generator::GenerateSummary> {
        commands::build::run(self)
    }

    /// Remove the output directory
    pub fn clean(&self) -> Result<()> {
        commands::clean::run(self)
    }

    /// Create a new post
    pub fn new_post(&self, title: &str, publish: bool) -> Result<PathBuf> {
        commands::new::create_post(self, title, publish)
    }
}
