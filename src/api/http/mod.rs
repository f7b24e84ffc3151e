pub mod auth;
pub mod comments;
pub mod extract;
pub mod roadmap;
