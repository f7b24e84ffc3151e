pub mod comments;
pub mod roadmap;
pub mod users;
