//! Slash Commands
//!
//! Lines starting with `/` are commands; anything else is a chat message.

use std::path::PathBuf;

use thiserror::Error;

use docchat_core::{FileFilter, Mode};

/// Shown for `/help`
pub const HELP: &str = "Commands: /upload [path], /file <path>, /mode [general|document], \
/reset, /quit. Start a message with // to send a leading /. Enter sends, \
PgUp/PgDn scroll, Esc quits.";

/// A parsed input line
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// Plain chat message
    Send(String),
    /// Select a file (if given) and upload the selection
    Upload(Option<PathBuf>),
    /// Select a file without uploading
    SelectFile(PathBuf),
    /// Switch mode; `None` toggles
    Mode(Option<Mode>),
    /// Ask to clear the conversation
    Reset,
    /// Leave the app
    Quit,
    /// Show the command list
    Help,
}

/// Why a command line was rejected
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum CommandError {
    /// Not a known command
    #[error("Unknown command: /{0}")]
    Unknown(String),
    /// Required argument missing
    #[error("/{0} needs a file path")]
    MissingPath(&'static str),
    /// Bad `/mode` argument
    #[error("{0}")]
    InvalidMode(String),
    /// File type not in the allowed list
    #[error("Unsupported file type (allowed: {allowed})")]
    UnsupportedFile {
        /// Comma-separated allowed extensions
        allowed: String,
    },
}

/// Parse one submitted line
///
/// A leading `//` escapes the command prefix: the line is sent with one
/// slash removed.
///
/// # Errors
///
/// Returns a [`CommandError`] for unknown commands, missing or invalid
/// arguments, and files the filter rejects.
pub fn parse(line: &str, filter: &FileFilter) -> Result<Command, CommandError> {
    let Some(rest) = line.trim_start().strip_prefix('/') else {
        return Ok(Command::Send(line.to_string()));
    };
    if rest.starts_with('/') {
        return Ok(Command::Send(rest.to_string()));
    }

    let (name, arg) = match rest.split_once(char::is_whitespace) {
        Some((name, arg)) => (name, arg.trim()),
        None => (rest.trim(), ""),
    };

    match name {
        "upload" => {
            if arg.is_empty() {
                Ok(Command::Upload(None))
            } else {
                checked_path(arg, filter).map(|p| Command::Upload(Some(p)))
            }
        }
        "file" => {
            if arg.is_empty() {
                Err(CommandError::MissingPath("file"))
            } else {
                checked_path(arg, filter).map(Command::SelectFile)
            }
        }
        "mode" => {
            if arg.is_empty() {
                Ok(Command::Mode(None))
            } else {
                arg.parse()
                    .map(|m| Command::Mode(Some(m)))
                    .map_err(CommandError::InvalidMode)
            }
        }
        "reset" | "clear" => Ok(Command::Reset),
        "quit" | "exit" => Ok(Command::Quit),
        "help" => Ok(Command::Help),
        other => Err(CommandError::Unknown(other.to_string())),
    }
}

fn checked_path(arg: &str, filter: &FileFilter) -> Result<PathBuf, CommandError> {
    let path = PathBuf::from(arg);
    if filter.accepts(&path) {
        Ok(path)
    } else {
        Err(CommandError::UnsupportedFile {
            allowed: filter.extensions().join(", "),
        })
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_plain_text_is_send() {
        let filter = FileFilter::default();
        assert_eq!(
            parse("what is in the report?", &filter).unwrap(),
            Command::Send("what is in the report?".to_string())
        );
    }

    #[test]
    fn test_double_slash_sends_literal_text() {
        let filter = FileFilter::default();
        assert_eq!(
            parse("//etc/hosts is what?", &filter).unwrap(),
            Command::Send("/etc/hosts is what?".to_string())
        );
        assert_eq!(
            parse("/etc/hosts is what?", &filter),
            Err(CommandError::Unknown("etc/hosts".to_string()))
        );
    }

    #[test]
    fn test_upload_with_and_without_path() {
        let filter = FileFilter::default();
        assert_eq!(parse("/upload", &filter).unwrap(), Command::Upload(None));
        assert_eq!(
            parse("/upload  /tmp/My Report.pdf ", &filter).unwrap(),
            Command::Upload(Some(PathBuf::from("/tmp/My Report.pdf")))
        );
    }

    #[test]
    fn test_filter_rejects_other_types() {
        let filter = FileFilter::default();
        assert_eq!(
            parse("/file notes.docx", &filter).unwrap_err(),
            CommandError::UnsupportedFile {
                allowed: "pdf".to_string()
            }
        );
        assert_eq!(
            parse("/file", &filter).unwrap_err(),
            CommandError::MissingPath("file")
        );
    }

    #[test]
    fn test_mode() {
        let filter = FileFilter::default();
        assert_eq!(parse("/mode", &filter).unwrap(), Command::Mode(None));
        assert_eq!(
            parse("/mode doc", &filter).unwrap(),
            Command::Mode(Some(Mode::Document))
        );
        assert!(matches!(
            parse("/mode poetry", &filter),
            Err(CommandError::InvalidMode(_))
        ));
    }

    #[test]
    fn test_misc_commands() {
        let filter = FileFilter::default();
        assert_eq!(parse("/reset", &filter).unwrap(), Command::Reset);
        assert_eq!(parse("/exit", &filter).unwrap(), Command::Quit);
        assert_eq!(parse("/help", &filter).unwrap(), Command::Help);
        assert_eq!(
            parse("/frobnicate now", &filter).unwrap_err(),
            CommandError::Unknown("frobnicate".to_string())
        );
    }
}
