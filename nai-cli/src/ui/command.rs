/// One line of input on the search screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Search for the line as typed
    Search(String),
    /// Open the page of result N (1-based)
    Open(usize),
    Help,
    Quit,
    Invalid(String),
}

/// Parse an input line. Lines starting with `:` are commands; `::` escapes a
/// term that itself starts with `:`. Anything else is searched verbatim.
pub fn parse(line: &str) -> Command {
    let Some(rest) = line.strip_prefix(':') else {
        return Command::Search(line.to_string());
    };
    if rest.starts_with(':') {
        return Command::Search(rest.to_string());
    }

    let mut parts = rest.split_whitespace();
    match (parts.next(), parts.next(), parts.next()) {
        (Some("q" | "quit"), None, _) => Command::Quit,
        (Some("h" | "help"), None, _) => Command::Help,
        (Some("o" | "open"), Some(number), None) => match number.parse::<usize>() {
            Ok(n) if n >= 1 => Command::Open(n),
            _ => Command::Invalid(format!("Not a result number: {}", number)),
        },
        (Some("o" | "open"), None, _) => Command::Invalid("Usage: :open N".to_string()),
        _ => Command::Invalid(format!("Unknown command: {}", line)),
    }
}
