//! Initialize a new site

use anyhow::Result;
use std::fs;
use std::path::Path;

const CONFIG_TEMPLATE: &str = r#"# Site
title: My Blog
description: ''
author: ''
url: http://localhost:8080
language: en
timezone: ''

# Directories
dir:
  input: src
  output: public
  includes: _includes

# Copied verbatim, relative to input
passthrough_copy:
  - css

# Extra paths that trigger a rebuild
watch_targets:
  - src/css

# Posts collection
posts:
  glob: posts/*.md
  allow_drafts: false
  draft_env: ALLOW_DRAFT
  undated: now
  order: date_desc
  layout: post.html

# Code highlighting
highlight:
  enable: true
  theme: base16-ocean.dark
  line_number: false

draft_label: Draft
"#;

const STYLESHEET: &str = r#"body {
  max-width: 42rem;
  margin: 0 auto;
  padding: 1rem;
  font-family: system-ui, sans-serif;
  line-height: 1.6;
}

.post-list {
  list-style: none;
  padding: 0;
}

.post-list time,
.post time {
  color: #666;
  font-size: 0.9rem;
}

pre[class*="language-"] {
  padding: 1rem;
  overflow-x: auto;
  background: #2b303b;
  border-radius: 4px;
}

.line-number {
  display: inline-block;
  width: 2rem;
  color: #65737e;
  user-select: none;
}
"#;

/// Initialize a new site in the given directory
pub fn init_site(target_dir: &Path) -> Result<()> {
    let src = target_dir.join("src");

    fs::create_dir_all(src.join("posts"))?;
    fs::create_dir_all(src.join("css"))?;
    fs::create_dir_all(src.join("_includes"))?;

    write_if_missing(&target_dir.join("eleventy.yml"), CONFIG_TEMPLATE)?;
    write_if_missing(&src.join("css/style.css"), STYLESHEET)?;

    let now = chrono::Local::now();
    let sample_post = format!(
        r#"---
title: Hello World
date: {}
---

Welcome to your new blog. Posts live in `src/posts` and are listed newest
first on the home page.

```rust
fn main() {{
    println!("Hello, world!");
}}
```

Mark a post with `draft: true` to keep it out of the build. Run with
`ALLOW_DRAFT=true` (or `--drafts`) to include drafts while writing.
"#,
        now.format("%Y-%m-%d %H:%M:%S")
    );

    write_if_missing(&src.join("posts/hello-world.md"), &sample_post)?;

    Ok(())
}

fn write_if_missing(path: &Path, content: &str) -> Result<()> {
    if path.exists() {
        tracing::warn!("Keeping existing file {:?}", path);
        return Ok(());
    }
    fs::write(path, content)?;
    tracing::debug!("Created: {:?}", path);
    Ok(())
}
