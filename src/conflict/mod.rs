//! Interactive resolution of a filename that already exists in the target directory.
//!
//! The session is a small state machine over two menus. The top menu offers to replace the
//! file, save under an auto-numbered name, type a different name, or cancel. The custom name
//! menu keeps the last rejected name around: typing the same existing name twice reopens the
//! top menu for that name, and an empty line after a rejection goes back to the top menu.

use std::io::{self, BufRead, Write};
use std::path::Path;

use crate::error::Result;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConflictDecision {
    /// Overwrite the named file.
    Replace(String),
    AutoNumbered(String),
    Custom(String),
    Cancel,
}

impl ConflictDecision {
    pub fn into_filename(self) -> Option<String> {
        match self {
            ConflictDecision::Replace(name)
            | ConflictDecision::AutoNumbered(name)
            | ConflictDecision::Custom(name) => Some(name),
            ConflictDecision::Cancel => None,
        }
    }

    pub fn allows_overwrite(&self) -> bool {
        matches!(self, ConflictDecision::Replace(_))
    }
}

#[derive(Debug)]
enum State {
    TopMenu {
        original: String,
    },
    CustomNameEntry {
        original: String,
        rejected: Option<String>,
    },
}

pub struct ConflictSession<'a, R, W> {
    dir: &'a Path,
    input: R,
    output: W,
}

/// Runs a conflict session on the terminal. Stdin and stdout stay locked until it returns.
pub fn resolve_interactively(dir: &Path, original: &str) -> Result<ConflictDecision> {
    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut session = ConflictSession::new(dir, stdin.lock(), stdout.lock());
    session.resolve(original)
}

impl<'a, R: BufRead, W: Write> ConflictSession<'a, R, W> {
    pub fn new(dir: &'a Path, input: R, output: W) -> Self {
        Self { dir, input, output }
    }

    pub fn resolve(&mut self, original: &str) -> Result<ConflictDecision> {
        let mut state = State::TopMenu {
            original: original.to_string(),
        };

        loop {
            state = match state {
                State::TopMenu { original } => {
                    let auto = next_available_name(self.dir, &original);
                    writeln!(
                        self.output,
                        "\n\"{original}\" already exists. What would you like to do?"
                    )?;
                    writeln!(self.output, "  1) Replace the existing file")?;
                    writeln!(self.output, "  2) Save as \"{auto}\"")?;
                    writeln!(self.output, "  3) Enter a different name")?;
                    writeln!(self.output, "  4) Cancel")?;

                    match self.prompt("Choose an option [1-4]: ")?.as_str() {
                        "1" => return Ok(ConflictDecision::Replace(original)),
                        "2" => return Ok(ConflictDecision::AutoNumbered(auto)),
                        "3" => State::CustomNameEntry {
                            original,
                            rejected: None,
                        },
                        "4" => return Ok(ConflictDecision::Cancel),
                        choice => {
                            writeln!(self.output, "Invalid choice {choice:?}, please enter 1-4.")?;
                            State::TopMenu { original }
                        }
                    }
                }

                State::CustomNameEntry { original, rejected } => {
                    let hint = if rejected.is_some() {
                        " (leave empty to go back)"
                    } else {
                        ""
                    };
                    let name = self.prompt(&format!("New file name{hint}: "))?;

                    if name.is_empty() {
                        if rejected.is_some() {
                            State::TopMenu { original }
                        } else {
                            writeln!(self.output, "File name cannot be empty.")?;
                            State::CustomNameEntry { original, rejected }
                        }
                    } else if !is_plain_file_name(&name) {
                        writeln!(
                            self.output,
                            "\"{name}\" must be a plain file name without directories."
                        )?;
                        State::CustomNameEntry { original, rejected }
                    } else if !self.dir.join(&name).exists() {
                        return Ok(ConflictDecision::Custom(name));
                    } else if rejected.as_deref() == Some(name.as_str()) {
                        State::TopMenu { original: name }
                    } else {
                        writeln!(
                            self.output,
                            "\"{name}\" already exists. Enter it again to choose what to do with it, or pick another name."
                        )?;
                        State::CustomNameEntry {
                            original,
                            rejected: Some(name),
                        }
                    }
                }
            };
        }
    }

    fn prompt(&mut self, message: &str) -> Result<String> {
        write!(self.output, "{message}")?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "input closed").into());
        }
        Ok(line.trim().to_string())
    }
}

/// Returns the first of `name (2).ext`, `name (3).ext`, ... that does not exist in `dir`.
pub fn next_available_name(dir: &Path, name: &str) -> String {
    let (stem, extension) = split_extension(name);
    (2u64..)
        .map(|n| format!("{stem} ({n}){extension}"))
        .find(|candidate| !dir.join(candidate).exists())
        .unwrap_or_else(|| name.to_string())
}

fn split_extension(name: &str) -> (&str, &str) {
    match name.rfind('.') {
        Some(index) if index > 0 => name.split_at(index),
        _ => (name, ""),
    }
}

fn is_plain_file_name(name: &str) -> bool {
    name != "." && name != ".." && !name.contains(['/', '\\'])
}
