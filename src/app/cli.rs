//! 命令行：`docktree [FOLDER]...`

use std::fmt;
use std::path::{Path, PathBuf};

pub const USAGE: &str = "\
Usage: docktree [FOLDER]...

Browse and control the Docker Compose projects found in each FOLDER
(default: the current directory).

Options:
  -h, --help       Print this help
  -V, --version    Print version
";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliCommand {
    Run { folders: Vec<PathBuf> },
    Help,
    Version,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliError {
    UnknownOption(String),
    NotADirectory(PathBuf),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::UnknownOption(opt) => write!(f, "unknown option: {}", opt),
            CliError::NotADirectory(path) => write!(f, "not a directory: {}", path.display()),
        }
    }
}

impl std::error::Error for CliError {}

pub fn version() -> String {
    format!("docktree {}", env!("CARGO_PKG_VERSION"))
}

/// Relative folders resolve against `cwd`; no folders means `cwd` itself.
pub fn parse<I, S>(args: I, cwd: &Path) -> Result<CliCommand, CliError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut folders = Vec::new();
    let mut only_paths = false;

    for arg in args {
        let arg = arg.as_ref();
        if !only_paths {
            match arg {
                "-h" | "--help" => return Ok(CliCommand::Help),
                "-V" | "--version" => return Ok(CliCommand::Version),
                "--" => {
                    only_paths = true;
                    continue;
                }
                _ if arg.starts_with('-') && arg.len() > 1 => {
                    return Err(CliError::UnknownOption(arg.to_string()));
                }
                _ => {}
            }
        }

        let path = Path::new(arg);
        let path = if path.is_absolute() {
            path.to_path_buf()
        } else {
            cwd.join(path)
        };
        if !path.is_dir() {
            return Err(CliError::NotADirectory(path));
        }
        folders.push(path);
    }

    if folders.is_empty() {
        folders.push(cwd.to_path_buf());
    }
    Ok(CliCommand::Run { folders })
}

#[cfg(test)]
#[path = "../../tests/unit/app/cli.rs"]
mod tests;
