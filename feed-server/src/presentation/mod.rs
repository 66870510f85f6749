pub mod current_user;
pub mod http_handlers;
pub mod routes;
pub mod urls;
