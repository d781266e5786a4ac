mod podcast;
mod result_set;

pub use podcast::PodcastSummary;
pub use result_set::{keep_linked, SearchResultSet};
