pub mod mysql;
pub mod schema;

pub use mysql::*;
pub use schema::*;
