pub mod auth;
pub mod comments;
pub mod roadmap;
pub mod threads;
