/*!
Command assembly for archiver invocations.

The wrapped tools are positionally sensitive (flags before the archive
path, the archive path before member operands), so argument order is
preserved exactly as built. Building a [`Command`] has no side effects;
nothing runs until a runner executes it.
*/

use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::{PackshellError, Result};

/// A fully assembled command line: one program plus its ordered arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    program: String,
    args: Vec<String>,
}

impl Command {
    /// Start a new command for the given program.
    pub fn new<S: Into<String>>(program: S) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// Append a single argument.
    pub fn arg<S: Into<String>>(mut self, arg: S) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Append a sequence of arguments, preserving their order.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Append member paths after validating them (see [`member_args`]).
    pub fn members(mut self, files: &[PathBuf]) -> Result<Self> {
        self.args.extend(member_args(files)?);
        Ok(self)
    }

    /// Program name.
    pub fn program(&self) -> &str {
        &self.program
    }

    /// Ordered argument list.
    pub fn arguments(&self) -> &[String] {
        &self.args
    }

    /// Render the command line for logs and error messages.
    ///
    /// Arguments containing whitespace are single-quoted so the rendered
    /// line reads the way a shell invocation would.
    pub fn command_line(&self) -> String {
        let mut line = self.program.clone();
        for arg in &self.args {
            line.push(' ');
            if arg.is_empty() || arg.contains(char::is_whitespace) {
                line.push('\'');
                line.push_str(arg);
                line.push('\'');
            } else {
                line.push_str(arg);
            }
        }
        line
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.command_line())
    }
}

/// Convert an archive or destination path into a command argument.
///
/// Paths that cannot round-trip as UTF-8 text are rejected rather than
/// lossily re-encoded, since the subprocess would then operate on a
/// different file than the caller named.
pub fn path_arg(path: &Path) -> Result<String> {
    let text = path
        .to_str()
        .ok_or_else(|| PackshellError::invalid_argument(format!("path {path:?} is not valid UTF-8")))?;
    if text.is_empty() {
        return Err(PackshellError::invalid_argument("path is empty"));
    }
    Ok(text.to_string())
}

/// Validate member paths and return their argument form.
///
/// Rejected inputs: non-UTF-8 paths, empty paths, paths containing a NUL
/// byte, and paths whose first byte is `-` (the wrapped tools would read
/// them as flags). Any rejection fails the whole operation before a
/// process is spawned.
pub fn member_args(files: &[PathBuf]) -> Result<Vec<String>> {
    let mut args = Vec::with_capacity(files.len());
    for file in files {
        let text = file.to_str().ok_or_else(|| {
            PackshellError::invalid_argument(format!("member path {file:?} is not valid UTF-8"))
        })?;
        if text.is_empty() {
            return Err(PackshellError::invalid_argument("member path is empty"));
        }
        if text.contains('\0') {
            return Err(PackshellError::invalid_argument(format!(
                "member path {text:?} contains a NUL byte"
            )));
        }
        if text.starts_with('-') {
            return Err(PackshellError::invalid_argument(format!(
                "member path {text:?} would be read as a flag"
            )));
        }
        args.push(text.to_string());
    }
    Ok(args)
}
