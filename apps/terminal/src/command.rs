//! Line commands understood by the terminal front end.

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Plain text is treated as the content of the search box.
    Search(String),
    ToggleSort,
    Refresh,
    Show,
    New,
    Edit(usize),
    Delete(usize),
    Help,
    Quit,
    Invalid(String),
}

impl Command {
    pub fn parse(line: &str) -> Self {
        let line = line.trim_end_matches(['\r', '\n']);
        let Some(rest) = line.strip_prefix(':') else {
            return Self::Search(line.to_string());
        };

        let mut parts = rest.split_whitespace();
        let name = parts.next().unwrap_or_default();
        let arg = parts.next();
        match (name, arg) {
            ("sort", None) => Self::ToggleSort,
            ("refresh", None) => Self::Refresh,
            ("show" | "ls", None) => Self::Show,
            ("new", None) => Self::New,
            ("edit", Some(index)) => parse_index(index).map_or_else(
                || Self::Invalid(format!("'{index}' is not a list position")),
                Self::Edit,
            ),
            ("delete" | "rm", Some(index)) => parse_index(index).map_or_else(
                || Self::Invalid(format!("'{index}' is not a list position")),
                Self::Delete,
            ),
            ("help" | "h", None) => Self::Help,
            ("quit" | "q", None) => Self::Quit,
            _ => Self::Invalid(format!("unknown command ':{rest}'")),
        }
    }
}

/// Positions are shown 1-based.
fn parse_index(raw: &str) -> Option<usize> {
    raw.parse::<usize>().ok().filter(|n| *n > 0).map(|n| n - 1)
}

pub const HELP: &str = "\
type to search (empty line clears the search)
  :sort         toggle name order
  :refresh      reload the list
  :show         print the current list
  :new          create a contact
  :edit N       edit contact at position N
  :delete N     delete contact at position N
  :quit         exit";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_is_search_input() {
        assert_eq!(Command::parse("an"), Command::Search("an".into()));
        assert_eq!(Command::parse(""), Command::Search(String::new()));
        assert_eq!(Command::parse("ana maria\n"), Command::Search("ana maria".into()));
    }

    #[test]
    fn positions_are_one_based() {
        assert_eq!(Command::parse(":delete 2"), Command::Delete(1));
        assert_eq!(Command::parse(":edit 1"), Command::Edit(0));
        assert!(matches!(Command::parse(":delete 0"), Command::Invalid(_)));
        assert!(matches!(Command::parse(":edit x"), Command::Invalid(_)));
    }

    #[test]
    fn unknown_commands_are_reported() {
        assert_eq!(
            Command::parse(":fly away"),
            Command::Invalid("unknown command ':fly away'".into())
        );
        assert_eq!(Command::parse(":sort"), Command::ToggleSort);
        assert_eq!(Command::parse(":q"), Command::Quit);
    }
}
