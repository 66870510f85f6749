use crate::data::group_repository::GroupRepository;
use crate::domain::group::GroupChoice;
use crate::domain::post::{Post, PostDraft};
use crate::domain::DomainError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use validator::Validate;

pub const REQUIRED_MESSAGE: &str = "This field is required.";
pub const INVALID_CHOICE_MESSAGE: &str =
    "Select a valid choice. That choice is not one of the available choices.";

/// Field name to the messages shown next to that field.
pub type FieldErrors = BTreeMap<String, Vec<String>>;

/// Raw values of the post form as submitted by the browser.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostForm {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub group: Option<String>,
}

#[derive(Debug, Validate)]
struct CleanedText {
    #[validate(length(min = 1, message = "This field is required."))]
    text: String,
}

/// A form that failed validation, ready to be displayed again.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BoundForm {
    pub text: String,
    pub group: Option<String>,
    pub errors: FieldErrors,
    pub groups: Vec<GroupChoice>,
}

impl PostForm {
    /// Form pre-filled from an existing post.
    pub fn from_post(post: &Post) -> Self {
        Self {
            text: post.text.clone(),
            group: post.group_id().map(|id| id.to_string()),
        }
    }

    /// Validates the submitted values and returns the draft to persist.
    ///
    /// The group, when given, must name an existing group. A blank group
    /// clears it. Field errors are returned as `DomainError::InvalidForm`.
    pub async fn clean(&self, groups: &dyn GroupRepository) -> Result<PostDraft, DomainError> {
        let mut errors = FieldErrors::new();

        let cleaned = CleanedText {
            text: self.text.trim().to_string(),
        };
        if let Err(validation) = cleaned.validate() {
            for (field, field_errors) in validation.field_errors() {
                let messages = field_errors.iter().map(|error| {
                    error
                        .message
                        .as_ref()
                        .map(|message| message.to_string())
                        .unwrap_or_else(|| REQUIRED_MESSAGE.to_string())
                });
                errors
                    .entry(field.to_string())
                    .or_default()
                    .extend(messages);
            }
        }

        let group_id = match self.group.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => {
                let found = match raw.parse::<i64>() {
                    Ok(id) => groups.exists(id).await?.then_some(id),
                    Err(_) => None,
                };
                if found.is_none() {
                    errors
                        .entry("group".to_string())
                        .or_default()
                        .push(INVALID_CHOICE_MESSAGE.to_string());
                }
                found
            }
        };

        if !errors.is_empty() {
            return Err(DomainError::InvalidForm(errors));
        }

        Ok(PostDraft {
            text: cleaned.text,
            group_id,
        })
    }

    pub fn bind(self, errors: FieldErrors, groups: Vec<GroupChoice>) -> BoundForm {
        BoundForm {
            text: self.text,
            group: self.group,
            errors,
            groups,
        }
    }
}
