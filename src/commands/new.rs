//! Create a new post

use anyhow::Result;
use std::fs;
use std::path::PathBuf;

use crate::Eleventy;

/// Create a new post in the posts directory
///
/// New posts are undated drafts unless `publish` is set, in which case they
/// are dated now and not flagged.
pub fn create_post(site: &Eleventy, title: &str, publish: bool) -> Result<PathBuf> {
    let target_dir = site.input_dir.join(site.config.posts.posts_dir());
    fs::create_dir_all(&target_dir)?;

    let slug = slug::slugify(title);
    if slug.is_empty() {
        anyhow::bail!("Title {:?} does not produce a file name", title);
    }

    let file_path = target_dir.join(format!("{}.md", slug));
    if file_path.exists() {
        anyhow::bail!("File already exists: {:?}", file_path);
    }

    let front_matter = if publish {
        let now = chrono::Local::now();
        format!(
            "---\ntitle: {}\ndate: {}\n---\n",
            yaml_string(title),
            now.format("%Y-%m-%d %H:%M:%S")
        )
    } else {
        format!("---\ntitle: {}\ndraft: true\n---\n", yaml_string(title))
    };

    fs::write(&file_path, front_matter)?;
    tracing::info!("Created: {:?}", file_path);

    Ok(file_path)
}

/// Quote a title for YAML
fn yaml_string(s: &str) -> String {
    format!("\"{}\"", s.replace('\\', "\\\\").replace('"', "\\\""))
}
