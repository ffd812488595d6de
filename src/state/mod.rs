//! Local UI State
//!
//! Framework-free state primitives shared by the page models:
//!
//! - **pagination**: page numbering and a clamped paginator
//! - **list**: load state of a list view
//! - **load**: load state of a single resource
//! - **cache**: time-bounded cache with an explicit staleness window

pub mod cache;
pub mod list;
pub mod load;
pub mod pagination;

pub use cache::TtlCache;
pub use list::ListState;
pub use load::LoadState;
pub use pagination::{page_numbers, total_pages, Paginator};
