pub mod catalog;
pub mod config;
pub mod export;
pub mod import;
pub mod metadata;
pub mod model;
pub mod search;
pub mod statistics;
pub mod store;

pub use catalog::*;
pub use model::*;
pub use search::{Search, SearchField};
pub use statistics::*;
