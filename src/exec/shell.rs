// src/exec/shell.rs

//! Platform-specific shell conventions: quoting, directive joining, and the
//! shell used to run a finished command line.
//!
//! Quoting rules:
//! - POSIX: every parameter token is wrapped in single quotes; an embedded
//!   `'` becomes `'\''`.
//! - Windows: a token without whitespace or `cmd` metacharacters is emitted
//!   bare; anything else is wrapped in double quotes with embedded `"`
//!   doubled.

use tokio::process::Command;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Posix,
    Windows,
}

const POSIX_SAFE_PUNCTUATION: &str = "_-./:=@%+,";
const WINDOWS_UNSAFE: &str = "\"&|<>^%()!";

impl Platform {
    /// The platform this binary was compiled for.
    pub fn current() -> Self {
        if cfg!(windows) {
            Platform::Windows
        } else {
            Platform::Posix
        }
    }

    /// Separator placed between environment directives and the command.
    pub fn joiner(self) -> &'static str {
        match self {
            Platform::Posix => "; ",
            Platform::Windows => " & ",
        }
    }

    /// Directive that changes the working directory.
    pub fn change_dir(self, dir: &str) -> String {
        match self {
            Platform::Posix => format!("cd {}", self.quote_if_needed(dir)),
            Platform::Windows => format!("cd /d {}", self.quote_if_needed(dir)),
        }
    }

    /// Quote a parameter token.
    pub fn quote(self, token: &str) -> String {
        match self {
            Platform::Posix => format!("'{}'", token.replace('\'', r"'\''")),
            Platform::Windows => {
                if is_windows_safe(token) {
                    token.to_string()
                } else {
                    format!("\"{}\"", token.replace('"', "\"\""))
                }
            }
        }
    }

    /// Quote only when the token would otherwise be split or interpreted by
    /// the shell. Used for paths and user names.
    pub fn quote_if_needed(self, token: &str) -> String {
        match self {
            Platform::Posix if is_posix_safe(token) => token.to_string(),
            _ => self.quote(token),
        }
    }

    /// Build a process that hands `line` to the platform shell.
    pub fn shell_command(self, line: &str) -> Command {
        match self {
            Platform::Windows => {
                let mut c = Command::new("cmd");
                c.arg("/C").arg(line);
                c
            }
            Platform::Posix => {
                let mut c = Command::new("sh");
                c.arg("-c").arg(line);
                c
            }
        }
    }
}

fn is_posix_safe(token: &str) -> bool {
    !token.is_empty()
        && token
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || POSIX_SAFE_PUNCTUATION.contains(c))
}

fn is_windows_safe(token: &str) -> bool {
    !token.is_empty()
        && token
            .chars()
            .all(|c| !c.is_whitespace() && !WINDOWS_UNSAFE.contains(c))
}
