use crate::domain::group::GroupSummary;
use crate::domain::user::Author;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

const LABEL_CHARS: usize = 15;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: i64,
    pub text: String,
    pub pub_date: DateTime<Utc>,
    pub author: Author,
    pub group: Option<GroupSummary>,
}

/// Cleaned form values bound onto a new or an existing post.
///
/// Carries neither author nor publication date: the author comes from the
/// request, the date is stamped once by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostDraft {
    pub text: String,
    pub group_id: Option<i64>,
}

/// Which posts a feed shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostFilter {
    All,
    Group(i64),
    Author(i64),
}

impl Post {
    pub fn group_id(&self) -> Option<i64> {
        self.group.as_ref().map(|group| group.id)
    }

    pub fn is_authored_by(&self, user_id: i64) -> bool {
        self.author.id == user_id
    }

    /// Short label used wherever a post is listed by name.
    pub fn label(&self) -> String {
        self.text.chars().take(LABEL_CHARS).collect()
    }
}

impl fmt::Display for Post {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}
