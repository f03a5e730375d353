//! Post collection - filters drafts and orders posts for display
//!
//! The builder is a pure transformation over items the content loader
//! discovered. It never mutates the items; it returns references to them in
//! display order. Everything that varies between sites (draft visibility,
//! how undated posts are treated, whether to sort at all) is carried by an
//! explicit [`CollectionPolicy`].

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::content::Post;

/// Collection errors
#[derive(Error, Debug, PartialEq, Eq)]
pub enum CollectionError {
    #[error("Post has no date and undated posts are rejected: {path}")]
    Undated { path: String },
}

/// What to do with a retained post that has no date
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UndatedPolicy {
    /// Compare as if dated at build start
    #[default]
    Now,
    /// Fail the build
    Reject,
}

/// Display order of the collection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PostOrder {
    /// Most recent first
    #[default]
    DateDesc,
    /// Keep discovery order
    Discovery,
}

/// Per-build collection settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CollectionPolicy {
    /// Keep posts flagged `draft: true`
    pub allow_drafts: bool,
    pub undated: UndatedPolicy,
    pub order: PostOrder,
}

/// Metadata the builder reads from a content item
pub trait CollectionItem {
    /// Whether the item is flagged as a draft (absent means no)
    fn is_draft(&self) -> bool;

    /// Publication date, if any
    fn date(&self) -> Option<DateTime<Local>>;

    /// Source path, used in error messages
    fn source(&self) -> &str;
}

impl CollectionItem for Post {
    fn is_draft(&self) -> bool {
        self.draft.unwrap_or(false)
    }

    fn date(&self) -> Option<DateTime<Local>> {
        self.date
    }

    fn source(&self) -> &str {
        &self.source
    }
}

/// Builds the `posts` collection
#[derive(Debug, Clone)]
pub struct PostCollectionBuilder {
    policy: CollectionPolicy,
    now: DateTime<Local>,
}

impl PostCollectionBuilder {
    /// Create a builder that treats undated posts as dated now
    pub fn new(policy: CollectionPolicy) -> Self {
        Self::at(policy, Local::now())
    }

    /// Create a builder with a fixed build-start time
    pub fn at(policy: CollectionPolicy, now: DateTime<Local>) -> Self {
        Self { policy, now }
    }

    /// The policy this builder applies
    pub fn policy(&self) -> &CollectionPolicy {
        &self.policy
    }

    /// Filter and order items
    pub fn build<'a, T: CollectionItem>(
        &self,
        items: &'a [T],
    ) -> Result<Vec<&'a T>, CollectionError> {
        let mut posts: Vec<&T> = items
            .iter()
            .filter(|item| self.policy.allow_drafts || !item.is_draft())
            .collect();

        if self.policy.undated == UndatedPolicy::Reject {
            if let Some(item) = posts.iter().find(|item| item.date().is_none()) {
                return Err(CollectionError::Undated {
                    path: item.source().to_string(),
                });
            }
        }

        match self.policy.order {
            // sort_by is stable, ties keep discovery order
            PostOrder::DateDesc => {
                posts.sort_by(|a, b| self.effective_date(*b).cmp(&self.effective_date(*a)))
            }
            PostOrder::Discovery => {}
        }

        tracing::debug!(
            "Collection built: {} of {} items (drafts {})",
            posts.len(),
            items.len(),
            if self.policy.allow_drafts {
                "allowed"
            } else {
                "hidden"
            }
        );

        Ok(posts)
    }

    fn effective_date<T: CollectionItem>(&self, item: &T) -> DateTime<Local> {
        item.date().unwrap_or(self.now)
    }
}
