//! Exhaustive pagination over the two membership APIs.
//!
//! Each pager exposes its pages as a lazy, finite stream
//! (`pages()`), and a `fetch_all()` that drains the stream into a complete
//! in-memory collection. Calling `pages()` again restarts from the first
//! page. Pages within one pager are fetched strictly in sequence because
//! each request depends on the previous response.
//!
//! The pagers treat failures differently:
//!
//! | Pager            | Paging scheme          | Failure mid-listing          |
//! |------------------|------------------------|------------------------------|
//! | [`ScimPager`]    | `startIndex` / `count` | logged, partial set returned |
//! | [`DirectoryPager`] | `first` / `after`    | fatal [`FetchError`]         |
//!
//! Directory membership is authoritative and must be complete; a short SCIM
//! listing still produces a (conservative) report.
//!
//! [`FetchError`]: crate::error::FetchError

pub mod directory;
pub mod query;
pub mod scim;

pub use directory::{DirectoryPage, DirectoryPager};
pub use scim::{ScimPage, ScimPager};

/// Items requested per page from both APIs.
pub const PAGE_SIZE: u32 = 100;
