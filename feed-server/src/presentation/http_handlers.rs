use crate::application::{EditAccess, FeedService};
use crate::domain::forms::{BoundForm, FieldErrors, PostForm};
use crate::domain::pagination::Page;
use crate::domain::{DomainError, Group, Post, User};
use crate::presentation::current_user::CurrentUser;
use crate::presentation::urls::{post_detail_url, profile_url};
use actix_web::http::{header, StatusCode};
use actix_web::{web, HttpResponse, Responder, ResponseError};
use serde::Serialize;
use std::sync::Arc;

pub const INDEX_TEMPLATE: &str = "posts/index.html";
pub const GROUP_TEMPLATE: &str = "posts/group_list.html";
pub const PROFILE_TEMPLATE: &str = "posts/profile.html";
pub const DETAIL_TEMPLATE: &str = "posts/post_detail.html";
pub const FORM_TEMPLATE: &str = "posts/create_post.html";

// Query pairs of the paginated feeds, kept raw so that junk or repeated
// keys fall back to a valid page instead of failing extraction.
type QueryPairs = web::Query<Vec<(String, String)>>;

// The last `page` value wins when the key is repeated.
fn page_param(query: &[(String, String)]) -> Option<&str> {
    query
        .iter()
        .rev()
        .find(|(key, _)| key == "page")
        .map(|(_, value)| value.as_str())
}

/// Everything the rendering layer needs to produce a page.
#[derive(Serialize)]
struct PageContext<T: Serialize> {
    template: &'static str,
    #[serde(flatten)]
    context: T,
}

#[derive(Serialize)]
struct FeedContext {
    page_obj: Page<Post>,
}

#[derive(Serialize)]
struct GroupFeedContext {
    group: Group,
    page_obj: Page<Post>,
}

#[derive(Serialize)]
struct ProfileContext {
    author: User,
    page_obj: Page<Post>,
}

#[derive(Serialize)]
struct DetailContext {
    post: Post,
}

#[derive(Serialize)]
struct FormContext {
    is_edit: bool,
    post_id: Option<i64>,
    form: BoundForm,
}

fn render<T: Serialize>(template: &'static str, context: T) -> HttpResponse {
    HttpResponse::Ok().json(PageContext { template, context })
}

fn redirect(location: &str) -> HttpResponse {
    HttpResponse::Found()
        .insert_header((header::LOCATION, location))
        .finish()
}

// Преобразование DomainError в HttpResponse
fn error_to_response(err: &DomainError) -> HttpResponse {
    let message = err.to_string();

    match err {
        DomainError::LoginRequired { location } => redirect(location),
        DomainError::UserNotFound | DomainError::GroupNotFound | DomainError::PostNotFound => {
            HttpResponse::NotFound().json(serde_json::json!({ "error": message }))
        }
        DomainError::InvalidForm(errors) => {
            HttpResponse::BadRequest().json(serde_json::json!({ "errors": errors }))
        }
        DomainError::DatabaseError(_) | DomainError::InternalError(_) => {
            tracing::error!("Request failed: {}", message);
            HttpResponse::InternalServerError()
                .json(serde_json::json!({ "error": "Internal server error" }))
        }
    }
}

impl ResponseError for DomainError {
    fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.to_status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    fn error_response(&self) -> HttpResponse {
        error_to_response(self)
    }
}

async fn render_form(
    feed_service: &FeedService,
    post_id: Option<i64>,
    form: PostForm,
    errors: FieldErrors,
) -> HttpResponse {
    match feed_service.group_choices().await {
        Ok(groups) => render(
            FORM_TEMPLATE,
            FormContext {
                is_edit: post_id.is_some(),
                post_id,
                form: form.bind(errors, groups),
            },
        ),
        Err(err) => error_to_response(&err),
    }
}

// ============== Feed Handlers ==============

pub async fn index(
    feed_service: web::Data<Arc<FeedService>>,
    query: QueryPairs,
) -> impl Responder {
    let page = page_param(&query);

    tracing::info!("Listing index page={:?}", page);

    match feed_service.index(page).await {
        Ok(page_obj) => render(INDEX_TEMPLATE, FeedContext { page_obj }),
        Err(err) => error_to_response(&err),
    }
}

pub async fn group_posts(
    feed_service: web::Data<Arc<FeedService>>,
    path: web::Path<String>,
    query: QueryPairs,
) -> impl Responder {
    let slug = path.into_inner();
    let page = page_param(&query);

    tracing::info!("Listing group slug={} page={:?}", slug, page);

    match feed_service.group_posts(&slug, page).await {
        Ok((group, page_obj)) => render(GROUP_TEMPLATE, GroupFeedContext { group, page_obj }),
        Err(err) => error_to_response(&err),
    }
}

pub async fn profile(
    feed_service: web::Data<Arc<FeedService>>,
    path: web::Path<String>,
    query: QueryPairs,
) -> impl Responder {
    let username = path.into_inner();
    let page = page_param(&query);

    tracing::info!("Listing profile username={} page={:?}", username, page);

    match feed_service.profile(&username, page).await {
        Ok((author, page_obj)) => render(PROFILE_TEMPLATE, ProfileContext { author, page_obj }),
        Err(err) => error_to_response(&err),
    }
}

pub async fn post_detail(
    feed_service: web::Data<Arc<FeedService>>,
    path: web::Path<i64>,
) -> impl Responder {
    let post_id = path.into_inner();

    tracing::info!("Getting post with id={}", post_id);

    match feed_service.post_detail(post_id).await {
        Ok(post) => render(DETAIL_TEMPLATE, DetailContext { post }),
        Err(err) => error_to_response(&err),
    }
}

// ============== Form Handlers ==============

pub async fn create_post_form(
    _user: CurrentUser,
    feed_service: web::Data<Arc<FeedService>>,
) -> impl Responder {
    render_form(&feed_service, None, PostForm::default(), FieldErrors::new()).await
}

pub async fn create_post(
    user: CurrentUser,
    feed_service: web::Data<Arc<FeedService>>,
    form: web::Form<PostForm>,
) -> impl Responder {
    let form = form.into_inner();

    tracing::info!("Creating post for user_id={}", user.id);

    match feed_service.create_post(user.id, &form).await {
        Ok(post) => redirect(&profile_url(&post.author.username)),
        Err(DomainError::InvalidForm(errors)) => {
            tracing::debug!("Post form rejected: {:?}", errors);
            render_form(&feed_service, None, form, errors).await
        }
        Err(err) => error_to_response(&err),
    }
}

pub async fn edit_post_form(
    user: CurrentUser,
    feed_service: web::Data<Arc<FeedService>>,
    path: web::Path<i64>,
) -> impl Responder {
    let post_id = path.into_inner();

    match feed_service.editable_post(post_id, user.id).await {
        Ok(EditAccess::Granted(post)) => render_form(
            &feed_service,
            Some(post_id),
            PostForm::from_post(&post),
            FieldErrors::new(),
        )
        .await,
        Ok(EditAccess::Denied) => redirect(&post_detail_url(post_id)),
        Err(err) => error_to_response(&err),
    }
}

pub async fn edit_post(
    user: CurrentUser,
    feed_service: web::Data<Arc<FeedService>>,
    path: web::Path<i64>,
    form: web::Form<PostForm>,
) -> impl Responder {
    let post_id = path.into_inner();
    let form = form.into_inner();

    tracing::info!("Updating post id={} for user_id={}", post_id, user.id);

    // A non-owner is sent to the post page like a successful edit would be;
    // there is no distinct forbidden response.
    match feed_service.update_post(post_id, user.id, &form).await {
        Ok(EditAccess::Granted(post)) => redirect(&post_detail_url(post.id)),
        Ok(EditAccess::Denied) => redirect(&post_detail_url(post_id)),
        Err(DomainError::InvalidForm(errors)) => {
            tracing::debug!("Post form rejected: {:?}", errors);
            render_form(&feed_service, Some(post_id), form, errors).await
        }
        Err(err) => error_to_response(&err),
    }
}

pub async fn not_found() -> impl Responder {
    HttpResponse::NotFound().json(serde_json::json!({ "error": "Page not found" }))
}
