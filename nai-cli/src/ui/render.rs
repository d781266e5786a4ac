use nai_common::SearchResultSet;

const COLUMNS: usize = 2;
const COLUMN_WIDTH: usize = 38;
const GUTTER: &str = "  ";

pub const INTRO: &str = "\
🎧 Welcome to Nai PodCast!

Search the iTunes podcast directory and open any show in your browser.

Press Enter to start exploring podcasts.";

pub const SEARCH_HELP: &str = "\
Type a search term and press Enter.
  :open N   open result N in the browser
  :help     show this help
  :q        quit";

/// Render the result set as a grid of numbered cells, two per row.
///
/// Each cell shows the title, the artist and the artwork URL on three lines.
pub fn render_grid(set: &SearchResultSet) -> String {
    if set.is_empty() {
        return "No podcasts found.".to_string();
    }

    let mut lines = Vec::new();
    for (row_index, row) in set.rows(COLUMNS).enumerate() {
        if row_index > 0 {
            lines.push(String::new());
        }
        let mut titles = Vec::new();
        let mut artists = Vec::new();
        let mut artwork = Vec::new();
        for (column, podcast) in row.iter().enumerate() {
            let number = row_index * COLUMNS + column + 1;
            titles.push(fit(
                &format!("{:>2}. {}", number, podcast.collection_name),
                COLUMN_WIDTH,
            ));
            artists.push(fit(&format!("    {}", podcast.artist_name), COLUMN_WIDTH));
            artwork.push(fit(&format!("    {}", podcast.artwork_url), COLUMN_WIDTH));
        }
        for cells in [titles, artists, artwork] {
            lines.push(cells.join(GUTTER).trim_end().to_string());
        }
    }
    lines.join("\n")
}

/// Pad or truncate `text` to exactly `width` characters.
fn fit(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        format!("{:<width$}", text, width = width)
    } else {
        let mut truncated: String = text.chars().take(width.saturating_sub(1)).collect();
        truncated.push('…');
        truncated
    }
}
