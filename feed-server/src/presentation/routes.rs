use crate::presentation::http_handlers;
use actix_web::web;

/// Page routes. Post ids only match digits, anything else falls through
/// to the not-found handler.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(http_handlers::index))
        .route("/group/{slug}/", web::get().to(http_handlers::group_posts))
        .route("/profile/{username}/", web::get().to(http_handlers::profile))
        .route(
            "/posts/{post_id:\\d+}/",
            web::get().to(http_handlers::post_detail),
        )
        .service(
            web::resource("/create/")
                .route(web::get().to(http_handlers::create_post_form))
                .route(web::post().to(http_handlers::create_post)),
        )
        .service(
            web::resource("/posts/{post_id:\\d+}/edit/")
                .route(web::get().to(http_handlers::edit_post_form))
                .route(web::post().to(http_handlers::edit_post)),
        )
        .default_service(web::to(http_handlers::not_found));
}
