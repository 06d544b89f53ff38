//! Wire entities exchanged between the blog front-end core and the REST
//! collaborator. Field names follow the collaborator's camelCase JSON.

pub mod id;
pub mod post;
pub mod user;

pub use id::Id;
pub use post::{Category, Comment, NewPost, ParseCategoryError, Post};
pub use user::{NewUser, Role, User};
