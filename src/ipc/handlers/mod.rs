pub mod core;
pub mod manager;
pub mod parent;
pub mod teacher;
pub mod users;
