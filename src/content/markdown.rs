//! Markdown rendering with syntax highlighting

use anyhow::Result;
use pulldown_cmark::{html, CodeBlockKind, CowStr, Event, Options, Parser, Tag, TagEnd};
use syntect::easy::HighlightLines;
use syntect::highlighting::{Theme, ThemeSet};
use syntect::html::{styled_line_to_highlighted_html, IncludeBackground};
use syntect::parsing::SyntaxSet;
use syntect::util::LinesWithEndings;

use crate::config::HighlightConfig;

/// Markdown renderer with syntax highlighting
pub struct MarkdownRenderer {
    syntax_set: SyntaxSet,
    theme_set: ThemeSet,
    theme_name: String,
    highlight: bool,
    line_numbers: bool,
}

impl MarkdownRenderer {
    /// Create a new markdown renderer
    pub fn new() -> Self {
        Self::with_config(&HighlightConfig::default())
    }

    /// Create from the highlight section of the site config
    pub fn with_config(config: &HighlightConfig) -> Self {
        Self {
            syntax_set: SyntaxSet::load_defaults_newlines(),
            theme_set: ThemeSet::load_defaults(),
            theme_name: config.theme.clone(),
            highlight: config.enable,
            line_numbers: config.line_number,
        }
    }

    /// Render markdown to HTML
    pub fn render(&self, markdown: &str) -> Result<String> {
        let options = Options::ENABLE_TABLES
            | Options::ENABLE_FOOTNOTES
            | Options::ENABLE_STRIKETHROUGH
            | Options::ENABLE_TASKLISTS
            | Options::ENABLE_SMART_PUNCTUATION
            | Options::ENABLE_HEADING_ATTRIBUTES;
        let parser = Parser::new_ext(markdown, options);

        let mut events: Vec<Event> = Vec::new();
        let mut in_code_block = false;
        let mut code_lang: Option<String> = None;
        let mut code = String::new();

        for event in parser {
            match event {
                Event::Start(Tag::CodeBlock(kind)) => {
                    in_code_block = true;
                    code_lang = match kind {
                        CodeBlockKind::Fenced(info) => fence_language(&info),
                        CodeBlockKind::Indented => None,
                    };
                    code.clear();
                }
                Event::End(TagEnd::CodeBlock) => {
                    in_code_block = false;
                    let block = self.highlight_code(&code, code_lang.take().as_deref())?;
                    events.push(Event::Html(CowStr::from(block)));
                }
                Event::Text(text) if in_code_block => code.push_str(&text),
                other => events.push(other),
            }
        }

        let mut html_output = String::new();
        html::push_html(&mut html_output, events.into_iter());

        Ok(html_output)
    }

    /// Highlight a code block into `<pre class="language-x"><code ...>`
    fn highlight_code(&self, code: &str, lang: Option<&str>) -> Result<String> {
        let lang = lang.unwrap_or("text");

        let body = match self.theme() {
            Some(theme) if self.highlight => self.highlight_lines(code, lang, theme)?,
            _ => html_escape(code),
        };

        let body = if self.line_numbers {
            add_line_numbers(&body)
        } else {
            body
        };

        let class = html_escape(lang);
        Ok(format!(
            r#"<pre class="language-{class}"><code class="language-{class}">{body}</code></pre>"#
        ))
    }

    fn highlight_lines(&self, code: &str, lang: &str, theme: &Theme) -> Result<String> {
        let syntax = self
            .syntax_set
            .find_syntax_by_token(lang)
            .or_else(|| self.syntax_set.find_syntax_by_extension(lang))
            .unwrap_or_else(|| self.syntax_set.find_syntax_plain_text());

        let mut highlighter = HighlightLines::new(syntax, theme);
        let mut output = String::with_capacity(code.len() * 2);

        for line in LinesWithEndings::from(code) {
            let regions = highlighter.highlight_line(line, &self.syntax_set)?;
            output.push_str(&styled_line_to_highlighted_html(
                &regions[..],
                IncludeBackground::No,
            )?);
        }

        Ok(output)
    }

    fn theme(&self) -> Option<&Theme> {
        self.theme_set
            .themes
            .get(&self.theme_name)
            .or_else(|| self.theme_set.themes.values().next())
    }
}

impl Default for MarkdownRenderer {
    fn default() -> Self {
        Self::new()
    }
}

/// Language token of a fence info string (`rust,ignore` -> `rust`)
fn fence_language(info: &str) -> Option<String> {
    info.split(|c: char| c.is_whitespace() || c == ',' || c == '{')
        .next()
        .filter(|lang| !lang.is_empty())
        .map(|lang| lang.to_lowercase())
}

/// Prefix every line with a line-number span
fn add_line_numbers(code: &str) -> String {
    code.trim_end_matches('\n')
        .lines()
        .enumerate()
        .map(|(i, line)| format!(r#"<span class="line-number">{}</span>{}"#, i + 1, line))
        .collect::<Vec<_>>()
        .join("\n")
        + "\n"
}

/// Simple HTML escaping
pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_basic_markdown() {
        let renderer = MarkdownRenderer::new();
        let html = renderer.render("# Hello World\n\nThis is a test.").unwrap();
        assert!(html.contains("<h1>Hello World</h1>"));
        assert!(html.contains("<p>This is a test.</p>"));
    }

    #[test]
    fn test_render_code_block() {
        let renderer = MarkdownRenderer::new();
        let html = renderer
            .render("```rust\nfn main() {}\n```\n\nafter")
            .unwrap();
        assert!(html.contains(r#"<pre class="language-rust"><code class="language-rust">"#));
        assert!(html.contains("<span style="));
        assert!(html.contains("main"));
        assert!(html.contains("<p>after</p>"));
    }

    #[test]
    fn test_highlight_disabled_escapes() {
        let renderer = MarkdownRenderer::with_config(&HighlightConfig {
            enable: false,
            ..Default::default()
        });
        let html = renderer.render("```html\n<b>x</b>\n```").unwrap();
        assert!(html.contains("&lt;b&gt;x&lt;/b&gt;"));
        assert!(!html.contains("<span style="));
    }

    #[test]
    fn test_line_numbers() {
        let renderer = MarkdownRenderer::with_config(&HighlightConfig {
            enable: false,
            line_number: true,
            ..Default::default()
        });
        let html = renderer.render("```\none\ntwo\n```").unwrap();
        assert!(html.contains(r#"<span class="line-number">1</span>one"#));
        assert!(html.contains(r#"<span class="line-number">2</span>two"#));
        assert!(html.contains("language-text"));
    }

    #[test]
    fn test_fence_language_is_escaped() {
        let renderer = MarkdownRenderer::new();
        let html = renderer.render("```a\"onclick=x\n1\n```").unwrap();
        assert!(html.contains(r#"<pre class="language-a&quot;onclick=x">"#));
        assert!(!html.contains(r#"language-a""#));
    }

    #[test]
    fn test_fence_language() {
        assert_eq!(fence_language("rust,ignore"), Some("rust".to_string()));
        assert_eq!(fence_language("JS {1,3}"), Some("js".to_string()));
        assert_eq!(fence_language(""), None);
    }
}
