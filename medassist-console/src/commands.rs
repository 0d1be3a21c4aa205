use medassist_flow::{Language, View};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Go(View),
    /// One step up: panel → choose → home.
    Back,
    /// Toggle when no language is given.
    Lang(Option<Language>),
    Text(String),
    Image(PathBuf),
    Remove,
    Analyze,
    Dismiss,
    Show,
    Help,
    Quit,
}

#[derive(Error, Debug, PartialEq)]
pub enum CommandError {
    #[error("unknown command '{0}', type 'help'")]
    Unknown(String),

    #[error("'{command}' needs {what}")]
    MissingArgument {
        command: &'static str,
        what: &'static str,
    },

    #[error("{0}")]
    Invalid(String),
}

pub const HELP: &str = "\
commands:
  go <home|choose|symptoms|skin>   switch view
  start                            open the analysis chooser
  back                             go one view up
  lang [en|ar]                     switch or toggle language
  text <description>               set the symptom description
  image <path>                     stage an image (jpg, png, webp; max 10MB)
  remove                           clear the current panel
  analyze                          submit the current panel
  dismiss                          hide the current notice
  show                             redraw the current view
  quit                             exit";

/// Parse one input line. Blank lines yield `None`.
pub fn parse(line: &str) -> Result<Option<Command>, CommandError> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }

    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };

    let command = match word.to_ascii_lowercase().as_str() {
        "go" => {
            if rest.is_empty() {
                return Err(CommandError::MissingArgument {
                    command: "go",
                    what: "a view",
                });
            }
            Command::Go(rest.parse().map_err(|e: medassist_flow::AssistError| {
                CommandError::Invalid(e.to_string())
            })?)
        }
        "start" => Command::Go(View::Choose),
        "back" => Command::Back,
        "lang" => {
            if rest.is_empty() {
                Command::Lang(None)
            } else {
                Command::Lang(Some(rest.parse().map_err(CommandError::Invalid)?))
            }
        }
        // empty text is accepted here; the panel reports it on analyze
        "text" => Command::Text(rest.to_string()),
        "image" => {
            if rest.is_empty() {
                return Err(CommandError::MissingArgument {
                    command: "image",
                    what: "a file path",
                });
            }
            Command::Image(PathBuf::from(rest))
        }
        "remove" => Command::Remove,
        "analyze" => Command::Analyze,
        "dismiss" => Command::Dismiss,
        "show" => Command::Show,
        "help" | "?" => Command::Help,
        "quit" | "exit" => Command::Quit,
        other => return Err(CommandError::Unknown(other.to_string())),
    };

    Ok(Some(command))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_commands() {
        assert_eq!(parse("  ").unwrap(), None);
        assert_eq!(parse("go skin").unwrap(), Some(Command::Go(View::Skin)));
        assert_eq!(parse("START").unwrap(), Some(Command::Go(View::Choose)));
        assert_eq!(parse("lang").unwrap(), Some(Command::Lang(None)));
        assert_eq!(parse("lang ar").unwrap(), Some(Command::Lang(Some(Language::Ar))));
        assert_eq!(
            parse("text  headache and fever for 2 days ").unwrap(),
            Some(Command::Text("headache and fever for 2 days".into()))
        );
        assert_eq!(
            parse("image ./photos/arm rash.png").unwrap(),
            Some(Command::Image(PathBuf::from("./photos/arm rash.png")))
        );
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(parse("jump").unwrap_err(), CommandError::Unknown("jump".into()));
        assert!(matches!(parse("go").unwrap_err(), CommandError::MissingArgument { .. }));
        assert!(matches!(parse("go results").unwrap_err(), CommandError::Invalid(_)));
        assert!(matches!(parse("lang fr").unwrap_err(), CommandError::Invalid(_)));
        assert!(matches!(parse("image").unwrap_err(), CommandError::MissingArgument { .. }));
    }
}
