pub mod manager;
pub mod models;
pub mod page;
pub mod patch;
pub mod repository;

pub use manager::{DatabaseError, DatabaseManager};
pub use page::{contains_pattern, page_count, Page, PageQuery};
pub use patch::Patch;
pub use repository::{Create, Repository, Resource};
