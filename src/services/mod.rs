pub mod auth;
pub mod bookmark;
pub mod like;
pub mod post;
pub mod profile;
pub mod reply;
