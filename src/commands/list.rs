//! List site content

use anyhow::Result;

use crate::collection::PostCollectionBuilder;
use crate::content::loader::ContentLoader;
use crate::content::Post;
use crate::helpers::post_date;
use crate::Eleventy;

/// List site content by type
pub fn run(site: &Eleventy, content_type: &str) -> Result<()> {
    let loader = ContentLoader::new(site);

    match content_type {
        "post" | "posts" => {
            let items = loader.load_posts()?;
            let posts = PostCollectionBuilder::new(site.collection_policy()).build(&items)?;
            println!("Posts ({}):", posts.len());
            for line in post_lines(site, &posts) {
                println!("  {}", line);
            }
        }
        "draft" | "drafts" => {
            let items = loader.load_posts()?;
            let drafts: Vec<&Post> = items.iter().filter(|p| p.is_draft()).collect();
            println!("Drafts ({}):", drafts.len());
            for line in post_lines(site, &drafts) {
                println!("  {}", line);
            }
        }
        "page" | "pages" => {
            let pages = loader.load_pages()?;
            println!("Pages ({}):", pages.len());
            for page in pages {
                println!("  {} {} [{}]", page.url, page.title, page.source);
            }
        }
        _ => {
            anyhow::bail!(
                "Unknown type: {}. Available: posts, drafts, pages",
                content_type
            );
        }
    }

    Ok(())
}

/// One display line per post: date (or draft label), title, source
pub fn post_lines(site: &Eleventy, posts: &[&Post]) -> Vec<String> {
    posts
        .iter()
        .map(|post| {
            let mut line = format!(
                "{} - {} [{}]",
                post_date(post.date.as_ref(), &site.config.draft_label),
                post.title,
                post.source
            );
            if post.is_draft() {
                line.push_str(" (draft)");
            }
            line
        })
        .collect()
}
