#![forbid(unsafe_code)]
#![warn(missing_docs)]

//! Search state driver for cvsearch.
//!
//! The external search-UI framework the original page leaned on kept all
//! mutable state implicit. This crate makes it explicit: [`SearchState`]
//! holds the query string, selected facet filters, current page, and last
//! results; [`SearchDriver`] is the only thing allowed to mutate it, via
//! handler functions mirroring the page's interactions.

pub mod driver;
pub mod state;

// Re-exports for convenience
pub use driver::SearchDriver;
pub use state::{PagingInfo, SearchState};
