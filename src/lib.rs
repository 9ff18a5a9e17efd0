//! Import citation records from Zenodo record pages and search listings.

pub mod cli;
pub mod config;
pub mod csl;
pub mod document;
pub mod fetch;
pub mod item;
pub mod output;
pub mod resolver;
pub mod select;
pub mod translator;
pub mod utilities;
