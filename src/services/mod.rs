// src/services/mod.rs

//! Application services. Each one holds a `SharedStore` handle and takes the
//! acting user's id as an explicit argument.

pub mod accounts;
pub mod feed;
pub mod likes;
pub mod search;

pub use accounts::AccountService;
pub use feed::FeedService;
pub use likes::LikeService;
pub use search::{SearchResults, SearchScope, SearchService};
