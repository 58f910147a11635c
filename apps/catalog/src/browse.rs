//! Line commands understood by `catalog browse`.

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BrowseCommand {
    Next,
    Previous,
    Page(i64),
    Search(String),
    Quit,
    Help,
}

pub const HELP: &str = "n: next page, p: previous page, page N: jump, /TERM or search TERM: filter, q: quit";

/// Parses one input line. `None` for anything unrecognised.
pub fn parse(line: &str) -> Option<BrowseCommand> {
    let line = line.trim();
    if let Some(term) = line.strip_prefix('/') {
        return Some(BrowseCommand::Search(term.trim().to_string()));
    }

    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };
    match (word, rest) {
        ("n" | "next", "") => Some(BrowseCommand::Next),
        ("p" | "prev" | "previous", "") => Some(BrowseCommand::Previous),
        ("q" | "quit" | "exit", "") => Some(BrowseCommand::Quit),
        ("?" | "h" | "help", "") => Some(BrowseCommand::Help),
        ("page", n) => n.parse().ok().map(BrowseCommand::Page),
        ("search", term) => Some(BrowseCommand::Search(term.to_string())),
        _ => None,
    }
}
