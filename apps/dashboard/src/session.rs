//! Line commands for the interactive session.

use shared::domain::{SortField, UserId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCommand {
    Search(String),
    Sort(SortField),
    Page(usize),
    Like(UserId),
    Dislike(UserId),
    Refresh,
    Show,
    Help,
    Quit,
}

pub const HELP: &str = "commands: search [text] | sort <name|email|mobile> | page <n> | like <id> | dislike <id> | refresh | show | help | quit";

impl SessionCommand {
    pub fn parse(line: &str) -> Result<Self, String> {
        let line = line.trim();
        let (verb, rest) = match line.split_once(char::is_whitespace) {
            Some((verb, rest)) => (verb, rest.trim()),
            None => (line, ""),
        };

        match verb.to_ascii_lowercase().as_str() {
            "search" | "s" => Ok(Self::Search(rest.to_string())),
            "sort" => rest
                .parse::<SortField>()
                .map(Self::Sort)
                .map_err(|err| err.to_string()),
            "page" | "p" => rest
                .parse::<usize>()
                .map(Self::Page)
                .map_err(|_| format!("invalid page number '{rest}'")),
            "like" if !rest.is_empty() => Ok(Self::Like(UserId::new(rest))),
            "dislike" if !rest.is_empty() => Ok(Self::Dislike(UserId::new(rest))),
            "like" | "dislike" => Err(format!("{verb} needs a user id")),
            "refresh" | "r" => Ok(Self::Refresh),
            "show" | "" => Ok(Self::Show),
            "help" | "?" => Ok(Self::Help),
            "quit" | "exit" | "q" => Ok(Self::Quit),
            other => Err(format!("unknown command '{other}'")),
        }
    }
}
