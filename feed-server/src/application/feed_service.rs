use crate::data::group_repository::GroupRepository;
use crate::data::post_repository::PostRepository;
use crate::data::user_repository::UserRepository;
use crate::domain::forms::PostForm;
use crate::domain::group::GroupChoice;
use crate::domain::pagination::{Page, Paginator};
use crate::domain::post::PostFilter;
use crate::domain::{DomainError, Group, Post, User};
use std::sync::Arc;

/// Result of an edit attempt: the owner gets the post, anyone else is
/// turned away without an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditAccess {
    Granted(Post),
    Denied,
}

pub struct FeedService {
    post_repo: Arc<dyn PostRepository + Send + Sync>,
    group_repo: Arc<dyn GroupRepository + Send + Sync>,
    user_repo: Arc<dyn UserRepository + Send + Sync>,
    posts_per_page: i64,
}

impl FeedService {
    pub fn new(
        post_repo: Arc<dyn PostRepository + Send + Sync>,
        group_repo: Arc<dyn GroupRepository + Send + Sync>,
        user_repo: Arc<dyn UserRepository + Send + Sync>,
        posts_per_page: i64,
    ) -> Self {
        Self {
            post_repo,
            group_repo,
            user_repo,
            posts_per_page,
        }
    }

    async fn feed_page(
        &self,
        filter: PostFilter,
        page: Option<&str>,
    ) -> Result<Page<Post>, DomainError> {
        let total = self.post_repo.count(filter).await?;
        let paginator = Paginator::new(total, self.posts_per_page);
        let window = paginator.window(page);

        let posts = self
            .post_repo
            .list(filter, window.limit, window.offset)
            .await?;

        tracing::debug!(
            "Feed {:?}: page {}/{} with {} posts",
            filter,
            window.number,
            paginator.num_pages(),
            posts.len()
        );

        Ok(paginator.page(window.number, posts))
    }

    pub async fn index(&self, page: Option<&str>) -> Result<Page<Post>, DomainError> {
        self.feed_page(PostFilter::All, page).await
    }

    pub async fn group_posts(
        &self,
        slug: &str,
        page: Option<&str>,
    ) -> Result<(Group, Page<Post>), DomainError> {
        let group = self.group_repo.find_by_slug(slug).await?;
        let posts = self.feed_page(PostFilter::Group(group.id), page).await?;
        Ok((group, posts))
    }

    pub async fn profile(
        &self,
        username: &str,
        page: Option<&str>,
    ) -> Result<(User, Page<Post>), DomainError> {
        let author = self.user_repo.find_by_username(username).await?;
        let posts = self.feed_page(PostFilter::Author(author.id), page).await?;
        Ok((author, posts))
    }

    pub async fn post_detail(&self, id: i64) -> Result<Post, DomainError> {
        self.post_repo.find_by_id(id).await
    }

    pub async fn group_choices(&self) -> Result<Vec<GroupChoice>, DomainError> {
        let groups = self.group_repo.list().await?;
        Ok(groups.into_iter().map(GroupChoice::from).collect())
    }

    pub async fn create_post(&self, author_id: i64, form: &PostForm) -> Result<Post, DomainError> {
        let author = self.user_repo.find_by_id(author_id).await?;
        let draft = form.clean(self.group_repo.as_ref()).await?;

        let post = self.post_repo.create(author.id, draft).await?;

        tracing::info!("Post created: id={}, author={}", post.id, author.username);

        Ok(post)
    }

    /// Loads a post for its author's edit form.
    pub async fn editable_post(&self, id: i64, user_id: i64) -> Result<EditAccess, DomainError> {
        let post = self.post_repo.find_by_id(id).await?;

        if !post.is_authored_by(user_id) {
            tracing::warn!(
                "User {} opened edit form of post {} owned by {}",
                user_id,
                id,
                post.author.id
            );
            return Ok(EditAccess::Denied);
        }

        Ok(EditAccess::Granted(post))
    }

    pub async fn update_post(
        &self,
        id: i64,
        user_id: i64,
        form: &PostForm,
    ) -> Result<EditAccess, DomainError> {
        let post = self.post_repo.find_by_id(id).await?;

        if !post.is_authored_by(user_id) {
            tracing::warn!(
                "User {} attempted to update post {} owned by {}",
                user_id,
                id,
                post.author.id
            );
            return Ok(EditAccess::Denied);
        }

        let draft = form.clean(self.group_repo.as_ref()).await?;
        let updated_post = self.post_repo.update(id, draft).await?;

        tracing::info!("Post updated: id={}, author_id={}", id, user_id);

        Ok(EditAccess::Granted(updated_post))
    }
}
