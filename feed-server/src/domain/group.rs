use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub id: i64,
    pub title: String,
    pub slug: String,
    pub description: String,
}

/// The part of a group embedded into every post it holds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupSummary {
    pub id: i64,
    pub title: String,
    pub slug: String,
}

/// Entry of the group choice list rendered by the post form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupChoice {
    pub id: i64,
    pub title: String,
}

impl From<&Group> for GroupSummary {
    fn from(group: &Group) -> Self {
        Self {
            id: group.id,
            title: group.title.clone(),
            slug: group.slug.clone(),
        }
    }
}

impl From<Group> for GroupChoice {
    fn from(group: Group) -> Self {
        Self {
            id: group.id,
            title: group.title,
        }
    }
}

impl fmt::Display for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.title)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn group_displays_its_title() {
        let group = Group {
            id: 1,
            title: "Rustaceans".to_string(),
            slug: "rust".to_string(),
            description: "All things Rust".to_string(),
        };

        assert_eq!(group.to_string(), "Rustaceans");
        assert_eq!(GroupSummary::from(&group).slug, "rust");
    }
}
