pub mod error;
pub mod forms;
pub mod group;
pub mod pagination;
pub mod post;
pub mod user;

pub use error::DomainError;
pub use group::Group;
pub use post::Post;
pub use user::User;
