//! Application Layer
//!
//! Listing engine, output rendering and the facade used by binaries.

pub mod facade;
pub mod output;
pub mod pagination;

pub use facade::ImxApp;
pub use output::OutputFormat;
pub use pagination::{
    ListResult, PageQuery, PaginationError, PaginationFailure, Paginator, QueryConfig,
};
