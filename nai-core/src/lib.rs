//! Podcast directory search: the iTunes client, the observable result store
//! and the settings both are built from.

pub mod config;
pub mod itunes;
pub mod search;

pub use nai_common::{keep_linked, PodcastSummary, SearchResultSet};
