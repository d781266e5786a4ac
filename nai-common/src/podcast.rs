/// One podcast show as returned by a directory search.
///
/// Values are built fresh from every response and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PodcastSummary {
    /// Identifier assigned by the remote directory
    pub collection_id: i64,
    /// Display title
    pub collection_name: String,
    /// Display subtitle (creator)
    pub artist_name: String,
    /// Cover image URL
    pub artwork_url: String,
    /// Web page for the show. Shows without one are never displayed.
    pub page_url: Option<String>,
}

impl PodcastSummary {
    pub fn has_page(&self) -> bool {
        self.page_url.is_some()
    }
}
