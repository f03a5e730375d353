//! Generator module - writes the collection, pages and passthrough assets

use anyhow::{anyhow, Result};
use std::fs;
use std::path::{Component, Path};

use tera::Context;
use walkdir::WalkDir;

use crate::content::{output_path_for, Page, Post};
use crate::templates::{CollectionsData, NavPost, PageData, PostData, SiteData, TemplateRenderer};
use crate::Eleventy;

/// What a generation run wrote
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GenerateSummary {
    pub posts: usize,
    pub pages: usize,
    pub copied: usize,
}

/// Static site generator using Tera layouts
pub struct Generator {
    site: Eleventy,
    renderer: TemplateRenderer,
}

impl Generator {
    /// Create a new generator
    pub fn new(site: &Eleventy) -> Result<Self> {
        let renderer = TemplateRenderer::new(&site.config, &site.includes_dir)?;

        Ok(Self {
            site: site.clone(),
            renderer,
        })
    }

    /// Generate the site from the built collection and the pages
    pub fn generate(&self, posts: &[&Post], pages: &[Page]) -> Result<GenerateSummary> {
        fs::create_dir_all(&self.site.output_dir)?;

        let copied = self.copy_passthrough()?;

        let site_data = SiteData::from(&self.site.config);
        let collections = CollectionsData {
            posts: posts.iter().map(|p| PostData::from(*p)).collect(),
        };

        self.generate_post_pages(posts, &site_data, &collections)?;
        self.generate_page_pages(pages, &site_data, &collections)?;

        let mut pages_written = pages.len();
        if !pages.iter().any(|p| p.url == "/") {
            self.generate_index_page(&site_data, &collections)?;
            pages_written += 1;
        }

        Ok(GenerateSummary {
            posts: posts.len(),
            pages: pages_written,
            copied,
        })
    }

    /// Create a base context with common variables
    fn create_base_context(&self, site_data: &SiteData, collections: &CollectionsData) -> Context {
        let mut context = Context::new();
        context.insert("site", site_data);
        context.insert("collections", collections);
        context
    }

    /// Render each post; `prev_post` is the older neighbour, `next_post` the newer
    fn generate_post_pages(
        &self,
        posts: &[&Post],
        site_data: &SiteData,
        collections: &CollectionsData,
    ) -> Result<()> {
        let default_layout = self.site.config.posts.layout.as_str();

        for (i, post) in posts.iter().enumerate() {
            let mut context = self.create_base_context(site_data, collections);
            context.insert("page", &collections.posts[i]);
            context.insert("content", &post.content);

            if let Some(older) = posts.get(i + 1) {
                context.insert("prev_post", &NavPost::from(*older));
            }
            if let Some(newer) = i.checked_sub(1).and_then(|j| posts.get(j)) {
                context.insert("next_post", &NavPost::from(*newer));
            }

            let layout = self.renderer.resolve_layout(&post.layout, default_layout);
            let html = self.renderer.render(&layout, &context)?;
            self.write_output(&post.url, &html)?;
        }

        Ok(())
    }

    /// Render standalone pages
    fn generate_page_pages(
        &self,
        pages: &[Page],
        site_data: &SiteData,
        collections: &CollectionsData,
    ) -> Result<()> {
        for page in pages {
            let mut context = self.create_base_context(site_data, collections);
            context.insert("page", &PageData::from(page));
            context.insert("content", &page.content);

            let layout = self.renderer.resolve_layout(&page.layout, "page.html");
            let html = self.renderer.render(&layout, &context)?;
            self.write_output(&page.url, &html)?;
        }

        Ok(())
    }

    /// Render the post listing at `/`
    fn generate_index_page(&self, site_data: &SiteData, collections: &CollectionsData) -> Result<()> {
        let mut context = self.create_base_context(site_data, collections);
        context.insert("content", "");

        let html = self.renderer.render("index.html", &context)?;
        self.write_output("/", &html)
    }

    fn write_output(&self, url: &str, html: &str) -> Result<()> {
        let relative = output_path_for(url);
        if relative
            .components()
            .any(|c| matches!(c, Component::ParentDir))
        {
            anyhow::bail!("Refusing to write {:?} outside the output directory", url);
        }
        let output_path = self.site.output_dir.join(relative);
        if let Some(parent) = output_path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| anyhow!("Failed to create dir {:?}: {}", parent, e))?;
        }
        fs::write(&output_path, html)
            .map_err(|e| anyhow!("Failed to write {:?}: {}", output_path, e))?;
        tracing::debug!("Generated: {:?}", output_path);
        Ok(())
    }

    /// Copy passthrough paths verbatim from input to output
    pub fn copy_passthrough(&self) -> Result<usize> {
        let mut copied = 0;

        for target in &self.site.config.passthrough_copy {
            let target = target.trim_start_matches("./").trim_end_matches('/');
            let source = self.site.input_dir.join(target);

            if !source.exists() {
                tracing::debug!("Passthrough path missing, skipping: {:?}", source);
                continue;
            }

            copied += copy_tree(&source, &self.site.output_dir.join(target))?;
        }

        Ok(copied)
    }
}

/// Copy a file or directory tree, returns the number of files copied
fn copy_tree(source: &Path, dest: &Path) -> Result<usize> {
    if source.is_file() {
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::copy(source, dest)?;
        return Ok(1);
    }

    let mut copied = 0;
    for entry in WalkDir::new(source)
        .follow_links(true)
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let path = entry.path();
        if !path.is_file() {
            continue;
        }

        let target = dest.join(path.strip_prefix(source)?);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::copy(path, &target)?;
        copied += 1;
    }

    tracing::debug!("Copied {} files from {:?}", copied, source);
    Ok(copied)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collection::PostCollectionBuilder;
    use crate::content::loader::ContentLoader;

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
            "posts/old.md",
            "---\ntitle: Old Post\ndate: 2024-01-01\n---\nOld body\n",
        );
        write(
            &src,
            "posts/new.md",
            "---\ntitle: New Post\ndate: 2024-06-01\n---\nNew body\n",
        );
        write(
            &src,
            "posts/wip.md",
            "---\ntitle: Work In Progress\ndraft: true\n---\nNot yet\n",
        );
        write(&src, "about.md", "---\ntitle: About\n---\nAbout me\n");
        write(&src, "css/style.css", "body { color: black; }\n");
        write(&src, "css/vendor/prism.css", "code {}\n");
        dir
    }

    fn generate(site: &Eleventy) -> GenerateSummary {
        let loader = ContentLoader::new(site);
        let items = loader.load_posts().unwrap();
        let pages = loader.load_pages().unwrap();
        let posts = PostCollectionBuilder::new(site.collection_policy())
            .build(&items)
            .unwrap();
        Generator::new(site).unwrap().generate(&posts, &pages).unwrap()
    }

    #[test]
    fn test_generate_site() {
        let dir = fixture();
        let site = Eleventy::new(dir.path()).unwrap();
        let summary = generate(&site);

        assert_eq!(
            summary,
            GenerateSummary {
                posts: 2,
                pages: 2,
                copied: 2
            }
        );

        let public = dir.path().join("public");
        let new_post = fs::read_to_string(public.join("posts/new/index.html")).unwrap();
        assert!(new_post.contains("<h1>New Post</h1>"));
        assert!(new_post.contains("Jun 1, 2024"));
        assert!(new_post.contains(r#"href="/posts/old/""#));
        assert!(public.join("posts/old/index.html").exists());
        assert!(!public.join("posts/wip/index.html").exists());
        assert!(public.join("about/index.html").exists());

        let index = fs::read_to_string(public.join("index.html")).unwrap();
        let newer = index.find("New Post").unwrap();
        let older = index.find("Old Post").unwrap();
        assert!(newer < older);
        assert!(!index.contains("Work In Progress"));

        assert_eq!(
            fs::read_to_string(public.join("css/style.css")).unwrap(),
            "body { color: black; }\n"
        );
        assert!(public.join("css/vendor/prism.css").exists());
    }

    #[test]
    fn test_generate_with_drafts() {
        let dir = fixture();
        let site = Eleventy::new(dir.path()).unwrap().with_drafts(true);
        generate(&site);

        let public = dir.path().join("public");
        let draft = fs::read_to_string(public.join("posts/wip/index.html")).unwrap();
        assert!(draft.contains("Draft"));

        let index = fs::read_to_string(public.join("index.html")).unwrap();
        assert!(index.contains("Work In Progress"));
    }

    #[test]
    fn test_user_index_page_wins() {
        let dir = fixture();
        write(
            &dir.path().join("src"),
            "index.md",
            "---\ntitle: Home\nlayout: index\n---\nHello there\n",
        );
        let site = Eleventy::new(dir.path()).unwrap();
        let summary = generate(&site);
        assert_eq!(summary.pages, 2);

        let index = fs::read_to_string(dir.path().join("public/index.html")).unwrap();
        assert!(index.contains("Hello there"));
        assert!(index.contains("New Post"));
    }

    #[test]
    fn test_refuses_to_write_outside_output() {
        let dir = tempfile::tempdir().unwrap();
        let site = Eleventy::new(dir.path()).unwrap();

        let mut post = Post::new("Escape".to_string(), None, "posts/escape.md".to_string());
        post.url = "/../escape/".to_string();

        let result = Generator::new(&site).unwrap().generate(&[&post], &[]);
        assert!(result.is_err());
        assert!(!dir.path().join("escape/index.html").exists());
    }

    #[test]
    fn test_empty_site() {
        let dir = tempfile::tempdir().unwrap();
        let site = Eleventy::new(dir.path()).unwrap();
        let posts: Vec<&Post> = Vec::new();
        let summary = Generator::new(&site).unwrap().generate(&posts, &[]).unwrap();
        assert_eq!(summary.posts, 0);
        assert_eq!(summary.copied, 0);

        let index = fs::read_to_string(dir.path().join("public/index.html")).unwrap();
        assert!(index.contains("No posts yet."));
    }
}
