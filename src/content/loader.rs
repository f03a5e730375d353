//! Content loader - discovers posts and pages under the input directory

use anyhow::{anyhow, Result};
use glob::Pattern;
use std::fs;
use std::path::{Component, Path, PathBuf};
use walkdir::WalkDir;

use super::{FrontMatter, MarkdownRenderer, Page, Post};
use crate::Eleventy;

/// Loads content from the input directory
pub struct ContentLoader<'a> {
    site: &'a Eleventy,
    renderer: MarkdownRenderer,
}

impl<'a> ContentLoader<'a> {
    /// Create a new content loader
    pub fn new(site: &'a Eleventy) -> Self {
        let renderer = MarkdownRenderer::with_config(&site.config.highlight);
        Self { site, renderer }
    }

    /// Load every file the posts glob matches, in discovery order
    ///
    /// Drafts are kept here; filtering and ordering is the collection's job.
    pub fn load_posts(&self) -> Result<Vec<Post>> {
        let pattern = self.site.input_dir.join(&self.site.config.posts.glob);
        let pattern = pattern.to_string_lossy();

        let mut posts = Vec::new();

        for entry in glob::glob(&pattern)
            .map_err(|e| anyhow!("Invalid posts glob {:?}: {}", pattern, e))?
        {
            let path = match entry {
                Ok(path) => path,
                Err(e) => {
                    tracing::warn!("Skipping unreadable path: {}", e);
                    continue;
                }
            };

            if !path.is_file() || !is_markdown_file(&path) {
                continue;
            }

            match self.load_post(&path) {
                Ok(post) => posts.push(post),
                Err(e) => tracing::warn!("Failed to load post {:?}: {}", path, e),
            }
        }

        Ok(posts)
    }

    /// Load a single post from a file
    fn load_post(&self, path: &Path) -> Result<Post> {
        let content = fs::read_to_string(path)?;
        let (fm, body) = FrontMatter::parse(&content)?;

        let date = fm.parse_date();
        let source = self.relative_source(path);
        let title = fm.title.clone().unwrap_or_else(|| file_title(path));
        let url = url_for_source(&source, fm.permalink.as_deref())?;

        let mut post = Post::new(title, date, source);
        post.draft = fm.draft;
        post.description = fm.description;
        post.raw = body.to_string();
        post.content = self.renderer.render(body)?;
        post.tags = fm.tags;
        post.layout = fm
            .layout
            .unwrap_or_else(|| self.site.config.posts.layout.clone());
        post.full_source = path.to_path_buf();
        post.permalink = self.permalink(&url);
        post.url = url;
        post.slug = slug::slugify(file_stem(path));
        post.extra = fm.extra;

        Ok(post)
    }

    /// Load all pages (markdown files outside the posts glob)
    pub fn load_pages(&self) -> Result<Vec<Page>> {
        let input_dir = &self.site.input_dir;
        let posts_glob = Pattern::new(&self.site.config.posts.glob)
            .map_err(|e| anyhow!("Invalid posts glob: {}", e))?;

        let mut pages = Vec::new();

        let walker = WalkDir::new(input_dir)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| !self.is_skipped_dir(e.path()));

        for entry in walker.filter_map(|e| e.ok()) {
            let path = entry.path();
            if !path.is_file() || !is_markdown_file(path) {
                continue;
            }

            let relative = path.strip_prefix(input_dir).unwrap_or(path);
            if posts_glob.matches_path(relative) {
                continue;
            }

            match self.load_page(path) {
                Ok(page) => pages.push(page),
                Err(e) => tracing::warn!("Failed to load page {:?}: {}", path, e),
            }
        }

        Ok(pages)
    }

    /// Load a single page from a file
    fn load_page(&self, path: &Path) -> Result<Page> {
        let content = fs::read_to_string(path)?;
        let (fm, body) = FrontMatter::parse(&content)?;

        let source = self.relative_source(path);
        let title = fm.title.clone().unwrap_or_else(|| file_title(path));
        let url = url_for_source(&source, fm.permalink.as_deref())?;

        let mut page = Page::new(title, source);
        page.date = fm.parse_date();
        page.description = fm.description;
        page.raw = body.to_string();
        page.content = self.renderer.render(body)?;
        page.layout = fm.layout.unwrap_or_else(|| "page.html".to_string());
        page.full_source = path.to_path_buf();
        page.permalink = self.permalink(&url);
        page.url = url;
        page.extra = fm.extra;

        Ok(page)
    }

    /// Directories never scanned for pages: `_`/`.` prefixed ones (layouts
    /// live there), passthrough copies and the output directory
    fn is_skipped_dir(&self, path: &Path) -> bool {
        if path == self.site.input_dir {
            return false;
        }
        if path == self.site.output_dir {
            return true;
        }

        let relative = path.strip_prefix(&self.site.input_dir).unwrap_or(path);

        let hidden = relative
            .components()
            .next()
            .and_then(|c| c.as_os_str().to_str())
            .map(|name| name.starts_with('_') || name.starts_with('.'))
            .unwrap_or(false);

        hidden
            || self
                .site
                .config
                .passthrough_copy
                .iter()
                .any(|p| relative.starts_with(p))
    }

    /// Source path relative to input, with forward slashes
    fn relative_source(&self, path: &Path) -> String {
        path.strip_prefix(&self.site.input_dir)
            .unwrap_or(path)
            .to_string_lossy()
            .replace('\\', "/")
    }

    fn permalink(&self, url: &str) -> String {
        format!("{}{}", self.site.config.url.trim_end_matches('/'), url)
    }
}

/// URL for a source path: `posts/hello.md` -> `/posts/hello/`,
/// `index.md` -> `/`, `notes/index.md` -> `/notes/`
///
/// A permalink may not climb out of the output directory.
pub fn url_for_source(source: &str, permalink: Option<&str>) -> Result<String> {
    if let Some(permalink) = permalink.filter(|p| !p.trim().is_empty()) {
        let permalink = permalink.trim().trim_start_matches('/');
        if Path::new(permalink)
            .components()
            .any(|c| matches!(c, Component::ParentDir))
        {
            anyhow::bail!("Permalink {:?} leaves the output directory", permalink);
        }
        return Ok(format!("/{}", permalink));
    }

    let without_ext = PathBuf::from(source).with_extension("");
    let without_ext = without_ext.to_string_lossy().replace('\\', "/");

    let dir = if without_ext == "index" {
        ""
    } else if let Some(parent) = without_ext.strip_suffix("/index") {
        parent
    } else {
        without_ext.as_str()
    };

    if dir.is_empty() {
        Ok("/".to_string())
    } else {
        Ok(format!("/{}/", dir))
    }
}

/// Check if a file is a markdown file
fn is_markdown_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e == "md" || e == "markdown")
        .unwrap_or(false)
}

fn file_stem(path: &Path) -> &str {
    path.file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("untitled")
}

fn file_title(path: &Path) -> String {
    file_stem(path).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collection::{CollectionItem, CollectionPolicy, PostCollectionBuilder};

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn fixture() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("src");
        write(
            &src,
            "posts/b-second.md",
            "---\ntitle: Second\ndate: 2024-06-01\n---\nSecond body\n",
        );
        write(
            &src,
            "posts/a-first.md",
            "---\ntitle: First\ndate: 2024-01-01\ntags: intro\n---\nFirst body\n",
        );
        write(
            &src,
            "posts/c-draft.md",
            "---\ntitle: Draft\ndraft: true\n---\n```rust\nlet x = 1;\n```\n",
        );
        write(&src, "posts/notes.txt", "not markdown");
        write(&src, "about.md", "---\ntitle: About\n---\nAbout me\n");
        write(&src, "index.md", "Welcome\n");
        write(&src, "_includes/readme.md", "layout notes");
        write(&src, "css/readme.md", "asset notes");
        dir
    }

    #[test]
    fn test_load_posts_in_discovery_order() {
        let dir = fixture();
        let site = Eleventy::new(dir.path()).unwrap();
        let posts = ContentLoader::new(&site).load_posts().unwrap();

        let sources: Vec<_> = posts.iter().map(|p| p.source.as_str()).collect();
        assert_eq!(
            sources,
            vec!["posts/a-first.md", "posts/b-second.md", "posts/c-draft.md"]
        );

        let first = &posts[0];
        assert_eq!(first.title, "First");
        assert_eq!(first.url, "/posts/a-first/");
        assert_eq!(first.permalink, "http://localhost:8080/posts/a-first/");
        assert_eq!(first.tags, vec!["intro"]);
        assert_eq!(first.layout, "post.html");
        assert!(first.content.contains("<p>First body</p>"));

        let draft = &posts[2];
        assert!(draft.is_draft());
        assert!(CollectionItem::date(draft).is_none());
        assert!(draft.content.contains("language-rust"));
    }

    #[test]
    fn test_load_pages_skips_posts_and_special_dirs() {
        let dir = fixture();
        let site = Eleventy::new(dir.path()).unwrap();
        let pages = ContentLoader::new(&site).load_pages().unwrap();

        let sources: Vec<_> = pages.iter().map(|p| p.source.as_str()).collect();
        assert_eq!(sources, vec!["about.md", "index.md"]);
        assert_eq!(pages[0].url, "/about/");
        assert_eq!(pages[1].url, "/");
        assert_eq!(pages[1].title, "index");
    }

    #[test]
    fn test_missing_posts_dir() {
        let dir = tempfile::tempdir().unwrap();
        let site = Eleventy::new(dir.path()).unwrap();
        let loader = ContentLoader::new(&site);
        assert!(loader.load_posts().unwrap().is_empty());
        assert!(loader.load_pages().unwrap().is_empty());
    }

    #[test]
    fn test_draft_flag_truthiness_hides_posts() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("src");
        write(&src, "posts/one.md", "---\ndraft: 1\n---\nSecret\n");
        write(&src, "posts/quoted.md", "---\ndraft: \"true\"\n---\nSecret\n");
        write(&src, "posts/yes.md", "---\ndraft: yes\n---\nSecret\n");
        write(&src, "posts/broken.md", "---\ndraft: true\ntags:\n  a: b\n---\nSecret\n");
        write(&src, "posts/public.md", "---\ndate: 2024-01-01\n---\nHello\n");

        let site = Eleventy::new(dir.path()).unwrap();
        let items = ContentLoader::new(&site).load_posts().unwrap();

        let sources: Vec<_> = items.iter().map(|p| p.source.as_str()).collect();
        assert_eq!(
            sources,
            vec!["posts/one.md", "posts/public.md", "posts/quoted.md", "posts/yes.md"]
        );
        assert!(items.iter().all(|p| !p.content.contains("<hr")));

        let posts = PostCollectionBuilder::new(CollectionPolicy::default())
            .build(&items)
            .unwrap();
        let published: Vec<_> = posts.iter().map(|p| p.source.as_str()).collect();
        assert_eq!(published, vec!["posts/public.md"]);
    }

    #[test]
    fn test_parent_dir_permalink_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("src");
        write(&src, "posts/escape.md", "---\npermalink: ../../x/\n---\nBody\n");
        write(&src, "away.md", "---\npermalink: /a/../../b\n---\nBody\n");

        let site = Eleventy::new(dir.path()).unwrap();
        let loader = ContentLoader::new(&site);
        assert!(loader.load_posts().unwrap().is_empty());
        assert!(loader.load_pages().unwrap().is_empty());
    }

    #[test]
    fn test_url_for_source() {
        assert_eq!(url_for_source("posts/hello.md", None).unwrap(), "/posts/hello/");
        assert_eq!(url_for_source("index.md", None).unwrap(), "/");
        assert_eq!(url_for_source("notes/index.md", None).unwrap(), "/notes/");
        assert_eq!(
            url_for_source("posts/hello.md", Some("blog/hi/")).unwrap(),
            "/blog/hi/"
        );
        assert_eq!(
            url_for_source("feed.md", Some("/feed.xml")).unwrap(),
            "/feed.xml"
        );
        assert!(url_for_source("posts/hello.md", Some("../../x")).is_err());
        assert!(url_for_source("posts/hello.md", Some("/blog/../../x/")).is_err());
    }
}
