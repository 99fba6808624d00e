pub mod graph;
pub mod media;
pub mod posts;
pub mod users;
