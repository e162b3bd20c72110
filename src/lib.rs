pub mod cli;
pub mod config;
pub mod error;
pub mod ingest;
pub mod input;
pub mod model;
pub mod parsers;
pub mod prefix;
pub mod registry;
pub mod report;
pub mod source;
pub mod tree;
