pub mod book;
pub mod report;

pub use book::*;
pub use report::*;
