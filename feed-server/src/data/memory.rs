//! In-memory store behind all three repository traits, for tests.
//!
//! Mirrors the schema's foreign keys: deleting a user removes their posts,
//! deleting a group clears it from its posts.

use crate::data::group_repository::GroupRepository;
use crate::data::post_repository::PostRepository;
use crate::data::user_repository::UserRepository;
use crate::domain::group::GroupSummary;
use crate::domain::post::{PostDraft, PostFilter};
use crate::domain::user::Author;
use crate::domain::{DomainError, Group, Post, User};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Mutex;

#[derive(Debug, Clone)]
struct StoredPost {
    id: i64,
    text: String,
    pub_date: DateTime<Utc>,
    author_id: i64,
    group_id: Option<i64>,
}

#[derive(Default)]
struct State {
    users: Vec<User>,
    groups: Vec<Group>,
    posts: Vec<StoredPost>,
    next_id: i64,
}

impl State {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn load(&self, stored: &StoredPost) -> Result<Post, DomainError> {
        let author = self
            .users
            .iter()
            .find(|user| user.id == stored.author_id)
            .ok_or(DomainError::UserNotFound)?;
        let group = stored
            .group_id
            .and_then(|id| self.groups.iter().find(|group| group.id == id));

        Ok(Post {
            id: stored.id,
            text: stored.text.clone(),
            pub_date: stored.pub_date,
            author: Author::from(author),
            group: group.map(GroupSummary::from),
        })
    }

    fn check_refs(&self, author_id: i64, group_id: Option<i64>) -> Result<(), DomainError> {
        if !self.users.iter().any(|user| user.id == author_id) {
            return Err(DomainError::UserNotFound);
        }
        if let Some(group_id) = group_id {
            if !self.groups.iter().any(|group| group.id == group_id) {
                return Err(DomainError::GroupNotFound);
            }
        }
        Ok(())
    }

    fn matching(&self, filter: PostFilter) -> Vec<&StoredPost> {
        let mut posts: Vec<&StoredPost> = self
            .posts
            .iter()
            .filter(|post| match filter {
                PostFilter::All => true,
                PostFilter::Group(id) => post.group_id == Some(id),
                PostFilter::Author(id) => post.author_id == id,
            })
            .collect();
        posts.sort_by(|a, b| b.pub_date.cmp(&a.pub_date).then(b.id.cmp(&a.id)));
        posts
    }
}

#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<State>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_user(&self, username: &str) -> User {
        let mut state = self.state.lock().unwrap();
        let user = User {
            id: state.next_id(),
            username: username.to_string(),
            date_joined: Utc::now(),
        };
        state.users.push(user.clone());
        user
    }

    pub fn add_group(&self, title: &str, slug: &str, description: &str) -> Group {
        let mut state = self.state.lock().unwrap();
        let group = Group {
            id: state.next_id(),
            title: title.to_string(),
            slug: slug.to_string(),
            description: description.to_string(),
        };
        state.groups.push(group.clone());
        group
    }

    pub fn add_post(&self, author: &User, text: &str, group: Option<&Group>) -> Post {
        let mut state = self.state.lock().unwrap();
        let stored = StoredPost {
            id: state.next_id(),
            text: text.to_string(),
            pub_date: Utc::now(),
            author_id: author.id,
            group_id: group.map(|group| group.id),
        };
        state.posts.push(stored.clone());
        state.load(&stored).unwrap()
    }

    pub fn post(&self, id: i64) -> Option<Post> {
        let state = self.state.lock().unwrap();
        let stored = state.posts.iter().find(|post| post.id == id)?;
        state.load(stored).ok()
    }

    pub fn posts(&self) -> Vec<Post> {
        let state = self.state.lock().unwrap();
        state
            .matching(PostFilter::All)
            .into_iter()
            .map(|post| state.load(post).unwrap())
            .collect()
    }

    pub fn delete_user(&self, id: i64) {
        let mut state = self.state.lock().unwrap();
        state.users.retain(|user| user.id != id);
        state.posts.retain(|post| post.author_id != id);
    }

    pub fn delete_group(&self, id: i64) {
        let mut state = self.state.lock().unwrap();
        state.groups.retain(|group| group.id != id);
        for post in state.posts.iter_mut().filter(|post| post.group_id == Some(id)) {
            post.group_id = None;
        }
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn find_by_username(&self, username: &str) -> Result<User, DomainError> {
        let state = self.state.lock().unwrap();
        state
            .users
            .iter()
            .find(|user| user.username == username)
            .cloned()
            .ok_or(DomainError::UserNotFound)
    }

    async fn find_by_id(&self, id: i64) -> Result<User, DomainError> {
        let state = self.state.lock().unwrap();
        state
            .users
            .iter()
            .find(|user| user.id == id)
            .cloned()
            .ok_or(DomainError::UserNotFound)
    }
}

#[async_trait]
impl GroupRepository for MemoryStore {
    async fn find_by_slug(&self, slug: &str) -> Result<Group, DomainError> {
        let state = self.state.lock().unwrap();
        state
            .groups
            .iter()
            .find(|group| group.slug == slug)
            .cloned()
            .ok_or(DomainError::GroupNotFound)
    }

    async fn exists(&self, id: i64) -> Result<bool, DomainError> {
        let state = self.state.lock().unwrap();
        Ok(state.groups.iter().any(|group| group.id == id))
    }

    async fn list(&self) -> Result<Vec<Group>, DomainError> {
        let state = self.state.lock().unwrap();
        let mut groups = state.groups.clone();
        groups.sort_by(|a, b| a.title.cmp(&b.title).then(a.id.cmp(&b.id)));
        Ok(groups)
    }
}

#[async_trait]
impl PostRepository for MemoryStore {
    async fn create(&self, author_id: i64, draft: PostDraft) -> Result<Post, DomainError> {
        let mut state = self.state.lock().unwrap();
        state.check_refs(author_id, draft.group_id)?;
        let stored = StoredPost {
            id: state.next_id(),
            text: draft.text,
            pub_date: Utc::now(),
            author_id,
            group_id: draft.group_id,
        };
        state.posts.push(stored.clone());
        state.load(&stored)
    }

    async fn find_by_id(&self, id: i64) -> Result<Post, DomainError> {
        let state = self.state.lock().unwrap();
        let stored = state
            .posts
            .iter()
            .find(|post| post.id == id)
            .ok_or(DomainError::PostNotFound)?;
        state.load(stored)
    }

    async fn update(&self, id: i64, draft: PostDraft) -> Result<Post, DomainError> {
        let mut state = self.state.lock().unwrap();
        let author_id = state
            .posts
            .iter()
            .find(|post| post.id == id)
            .map(|post| post.author_id)
            .ok_or(DomainError::PostNotFound)?;
        state.check_refs(author_id, draft.group_id)?;

        let stored = state
            .posts
            .iter_mut()
            .find(|post| post.id == id)
            .ok_or(DomainError::PostNotFound)?;
        stored.text = draft.text;
        stored.group_id = draft.group_id;
        let stored = stored.clone();
        state.load(&stored)
    }

    async fn count(&self, filter: PostFilter) -> Result<i64, DomainError> {
        let state = self.state.lock().unwrap();
        Ok(state.matching(filter).len() as i64)
    }

    async fn list(
        &self,
        filter: PostFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Post>, DomainError> {
        let state = self.state.lock().unwrap();
        state
            .matching(filter)
            .into_iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .map(|post| state.load(post))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[actix_rt::test]
    async fn deleting_group_keeps_posts_without_group() {
        let store = MemoryStore::new();
        let user = store.add_user("TestUser");
        let group = store.add_group("TestTitle", "test_slug", "TestDescription");
        let post = store.add_post(&user, "TestText", Some(&group));

        store.delete_group(group.id);

        let post = store.post(post.id).expect("post survives");
        assert_eq!(post.group, None);
        assert_eq!(store.count(PostFilter::Group(group.id)).await.unwrap(), 0);
    }

    #[actix_rt::test]
    async fn deleting_author_removes_their_posts() {
        let store = MemoryStore::new();
        let author = store.add_user("TestUser");
        let other = store.add_user("Other");
        store.add_post(&author, "first", None);
        store.add_post(&author, "second", None);
        let kept = store.add_post(&other, "kept", None);

        store.delete_user(author.id);

        assert_eq!(store.posts(), vec![kept]);
    }

    #[actix_rt::test]
    async fn create_rejects_dangling_references() {
        let store = MemoryStore::new();
        let user = store.add_user("TestUser");

        let missing_group = store
            .create(
                user.id,
                PostDraft {
                    text: "text".to_string(),
                    group_id: Some(999),
                },
            )
            .await;
        let missing_author = store
            .create(
                999,
                PostDraft {
                    text: "text".to_string(),
                    group_id: None,
                },
            )
            .await;

        assert!(matches!(missing_group, Err(DomainError::GroupNotFound)));
        assert!(matches!(missing_author, Err(DomainError::UserNotFound)));
    }
}
