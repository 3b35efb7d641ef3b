pub mod aggregate;
pub mod cli;
pub mod error;
pub mod identity;
pub mod model;
pub mod render;
pub mod report;
pub mod source;
