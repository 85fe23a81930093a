// handlers/public/mod.rs - handlers served without a bearer token
pub mod auth;
pub mod home;
pub mod tours;

pub use home::{health, posts_home, root};
