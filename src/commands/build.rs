//! Build the site

use anyhow::Result;
use notify::{RecursiveMode, Watcher};
use notify_debouncer_mini::new_debouncer;
use std::path::PathBuf;
use std::sync::mpsc::channel;
use std::time::{Duration, Instant};

use crate::collection::PostCollectionBuilder;
use crate::content::loader::ContentLoader;
use crate::generator::{GenerateSummary, Generator};
use crate::Eleventy;

/// Build the site once
pub fn run(site: &Eleventy) -> Result<GenerateSummary> {
    let start = Instant::now();

    let loader = ContentLoader::new(site);
    let items = loader.load_posts()?;
    let pages = loader.load_pages()?;

    let builder = PostCollectionBuilder::new(site.collection_policy());
    let posts = builder.build(&items)?;

    tracing::info!(
        "Loaded {} posts ({} hidden as drafts) and {} pages",
        items.len(),
        items.len() - posts.len(),
        pages.len()
    );

    let generator = Generator::new(site)?;
    let summary = generator.generate(&posts, &pages)?;

    tracing::info!(
        "Wrote {} posts and {} pages, copied {} files in {:.2}s",
        summary.posts,
        summary.pages,
        summary.copied,
        start.elapsed().as_secs_f64()
    );

    Ok(summary)
}

/// Reload the config from disk and build with it
///
/// The draft flag resolved at startup carries over. On success `site` is
/// replaced by the reloaded one; a config that fails to load keeps the
/// previous site and returns the error.
pub fn rebuild(site: &mut Eleventy) -> Result<GenerateSummary> {
    let fresh = Eleventy::new(&site.base_dir)?.with_drafts(site.allow_drafts);
    let summary = run(&fresh)?;
    *site = fresh;
    Ok(summary)
}

/// Watch for file changes and rebuild
pub async fn watch(site: &Eleventy) -> Result<()> {
    let site = site.clone();
    tracing::info!("Watching for changes. Press Ctrl+C to stop.");
    tokio::task::spawn_blocking(move || watch_blocking(site, || {})).await?
}

/// Debounced watch loop over the site's watch paths
///
/// `on_rebuild` runs after every successful rebuild. Paths are registered
/// once, from the config the loop started with.
pub fn watch_blocking<F>(mut site: Eleventy, mut on_rebuild: F) -> Result<()>
where
    F: FnMut(),
{
    let (tx, rx) = channel();
    let mut debouncer = new_debouncer(Duration::from_millis(500), tx)?;

    for path in site.watch_paths() {
        if !path.exists() {
            tracing::debug!("Not watching missing path {:?}", path);
            continue;
        }
        let mode = if path.is_dir() {
            RecursiveMode::Recursive
        } else {
            RecursiveMode::NonRecursive
        };
        debouncer.watcher().watch(&path, mode)?;
        tracing::debug!("Watching: {:?}", path);
    }

    while let Ok(result) = rx.recv() {
        let events = match result {
            Ok(events) => events,
            Err(e) => {
                tracing::error!("Watch error: {:?}", e);
                continue;
            }
        };

        let changed = relevant_changes(&site, events.into_iter().map(|e| e.path));
        if changed.is_empty() {
            continue;
        }
        for path in &changed {
            tracing::info!("File changed: {}", path.display());
        }

        match rebuild(&mut site) {
            Ok(_) => on_rebuild(),
            Err(e) => tracing::error!("Build failed: {}", e),
        }
    }

    Ok(())
}

/// Changed paths worth a rebuild: not build output, VCS or editor noise
pub fn relevant_changes<I>(site: &Eleventy, paths: I) -> Vec<PathBuf>
where
    I: IntoIterator<Item = PathBuf>,
{
    paths
        .into_iter()
        .filter(|path| {
            if path.starts_with(&site.output_dir) {
                return false;
            }
            let path_str = path.to_string_lossy();
            !path_str.contains("/.git/")
                && !path_str.ends_with(".DS_Store")
                && !path_str.contains("node_modules")
                && !path_str.ends_with('~')
        })
        .collect()
}
