//! Front-matter parsing

use anyhow::{anyhow, Result};
use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, TimeZone};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;

/// Accepts either a single string or a list of strings
fn string_or_vec<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
        Nothing(()),
    }

    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(s) => vec![s],
        OneOrMany::Many(v) => v,
        OneOrMany::Nothing(()) => Vec::new(),
    })
}

/// Reads a draft flag by truthiness: `true`, non-zero numbers and non-empty
/// strings other than `"false"` mark a draft
fn truthy_flag<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Int(i64),
        Float(f64),
        Text(String),
        Nothing(()),
    }

    Ok(match Flag::deserialize(deserializer)? {
        Flag::Bool(b) => Some(b),
        Flag::Int(n) => Some(n != 0),
        Flag::Float(n) => Some(n != 0.0),
        Flag::Text(s) => {
            let s = s.trim();
            Some(!s.is_empty() && !s.eq_ignore_ascii_case("false"))
        }
        Flag::Nothing(()) => None,
    })
}

/// Front-matter data from a post or page
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FrontMatter {
    pub title: Option<String>,
    pub date: Option<String>,
    #[serde(deserialize_with = "truthy_flag")]
    pub draft: Option<bool>,
    pub description: Option<String>,
    #[serde(deserialize_with = "string_or_vec")]
    pub tags: Vec<String>,
    pub layout: Option<String>,
    pub permalink: Option<String>,

    /// Additional custom fields
    #[serde(flatten)]
    pub extra: HashMap<String, serde_yaml::Value>,
}

impl FrontMatter {
    /// Parse front-matter from content string
    /// Returns (front_matter, remaining_content)
    pub fn parse(content: &str) -> Result<(Self, &str)> {
        let trimmed = content.trim_start();

        if let Some(rest) = trimmed.strip_prefix("---json") {
            return Self::parse_json(rest);
        }

        if trimmed.starts_with("---") {
            return Self::parse_yaml(trimmed);
        }

        Ok((FrontMatter::default(), trimmed))
    }

    /// YAML between `---` fences; anything that does not look like YAML is
    /// returned untouched as body, a block of `key: value` lines that fails
    /// to parse is an error
    fn parse_yaml(content: &str) -> Result<(Self, &str)> {
        let Some((block, body)) = split_fenced(&content[3..]) else {
            return Ok((FrontMatter::default(), content));
        };

        if block.trim().is_empty() {
            return Ok((FrontMatter::default(), body));
        }

        if !block.lines().any(is_yaml_key_line) {
            return Ok((FrontMatter::default(), content));
        }

        let fm = serde_yaml::from_str::<FrontMatter>(block)
            .map_err(|e| anyhow!("Failed to parse YAML front-matter: {}", e))?;

        Ok((fm, body))
    }

    fn parse_json(rest: &str) -> Result<(Self, &str)> {
        let (block, body) =
            split_fenced(rest).ok_or_else(|| anyhow!("Unterminated JSON front-matter"))?;

        let fm: FrontMatter = serde_json::from_str(block)
            .map_err(|e| anyhow!("Failed to parse JSON front-matter: {}", e))?;

        Ok((fm, body))
    }

    /// Parse the date string into a DateTime
    pub fn parse_date(&self) -> Option<DateTime<Local>> {
        let raw = self.date.as_deref()?;
        let parsed = parse_date_string(raw);
        if parsed.is_none() {
            tracing::warn!("Unrecognised date {:?}, treating as undated", raw);
        }
        parsed
    }
}

/// Split `\n<block>\n---\n<body>` after the opening fence
fn split_fenced(rest: &str) -> Option<(&str, &str)> {
    let rest = rest.trim_start_matches([' ', '\t']);
    let rest = rest
        .strip_prefix("\r\n")
        .or_else(|| rest.strip_prefix('\n'))?;

    if let Some(body) = rest.strip_prefix("---") {
        return Some(("", body.trim_start_matches(['\n', '\r'])));
    }

    let end = rest.find("\n---")?;
    let block = &rest[..end];
    let body = rest[end + 4..].trim_start_matches(['\n', '\r']);
    Some((block, body))
}

/// A `key: value` line, where key is a plain identifier and not a URL scheme
fn is_yaml_key_line(line: &str) -> bool {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return false;
    }

    let Some((key, value)) = trimmed.split_once(':') else {
        return false;
    };

    let plain_key = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');

    plain_key
        && !matches!(key, "http" | "https" | "ftp" | "mailto")
        && (value.is_empty() || value.starts_with(' '))
}

/// Parse a date string in various formats, interpreted in local time
pub fn parse_date_string(s: &str) -> Option<DateTime<Local>> {
    let s = s.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Local));
    }

    const DATETIME_FORMATS: [&str; 6] = [
        "%Y-%m-%d %H:%M:%S",
        "%Y/%m/%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
        "%Y/%m/%d %H:%M",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M:%S%.f",
    ];

    let naive = DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .or_else(|| {
            ["%Y-%m-%d", "%Y/%m/%d"]
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })?;

    Local.from_local_datetime(&naive).earliest()
}
