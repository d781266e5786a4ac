use std::io::Write;

use nai_common::SearchResultSet;
use nai_core::search::SearchStore;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use super::command::{self, Command};
use super::navigation::Screen;
use super::render::{render_grid, INTRO, SEARCH_HELP};

/// Interactive session driving a [`SearchStore`] from stdin.
pub struct App {
    store: SearchStore,
    initial_term: String,
    screen: Screen,
}

impl App {
    pub fn new(store: SearchStore, initial_term: String, skip_intro: bool) -> Self {
        Self {
            store,
            initial_term,
            screen: Screen::initial(skip_intro),
        }
    }

    pub async fn run(mut self) -> std::io::Result<()> {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();

        if self.screen == Screen::Intro {
            println!("{}\n", INTRO);
            if lines.next_line().await?.is_none() {
                return Ok(());
            }
            self.screen = self.screen.start();
        }

        info!("Entering search screen");
        println!("{}\n", SEARCH_HELP);
        let renderer = spawn_renderer(self.store.subscribe(), std::io::stdout());
        self.store.search(self.initial_term.clone());

        while let Some(line) = lines.next_line().await? {
            match command::parse(&line) {
                Command::Search(term) => {
                    println!("Searching for {:?}…", term);
                    self.store.search(term);
                }
                Command::Open(number) => self.open(number),
                Command::Help => println!("{}", SEARCH_HELP),
                Command::Quit => break,
                Command::Invalid(message) => println!("{}", message),
            }
        }

        self.store.shutdown();
        renderer.abort();
        Ok(())
    }

    fn open(&self, number: usize) {
        if let Some(note) = still_searching_note(&self.store) {
            println!("{}", note);
        }
        let results = self.store.results();
        let Some(url) = page_url(&results, number) else {
            println!("No result #{}", number);
            return;
        };
        info!("Opening {}", url);
        if let Err(e) = open::that(url) {
            warn!("Failed to open {}: {}", url, e);
            println!("Could not open {}", url);
        }
    }
}

/// Run one search and print its results.
pub async fn run_once(store: &SearchStore, term: &str) {
    store.run_search(term).await;
    println!("{}", render_grid(&store.results()));
}

/// Reprint the grid to `out` every time a new result set is published.
fn spawn_renderer<W>(mut results: watch::Receiver<SearchResultSet>, mut out: W) -> JoinHandle<()>
where
    W: Write + Send + 'static,
{
    tokio::spawn(async move {
        while results.changed().await.is_ok() {
            let set = results.borrow_and_update().clone();
            let written = writeln!(out, "\n{}\n", render_grid(&set)).and_then(|_| out.flush());
            if let Err(e) = written {
                warn!("Failed to render results: {}", e);
                break;
            }
        }
    })
}

/// Shown when `:open` picks from a set that a running search is about to replace.
fn still_searching_note(store: &SearchStore) -> Option<&'static str> {
    store
        .is_searching()
        .then_some("Still searching; opening from the previous results.")
}

/// Page URL of the 1-based result `number`.
fn page_url(results: &SearchResultSet, number: usize) -> Option<&str> {
    results
        .get(number.checked_sub(1)?)
        .and_then(|podcast| podcast.page_url.as_deref())
}
