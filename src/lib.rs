//! dupfind - duplicate file finder.
//!
//! Finds groups of files with identical content under a directory in two
//! passes: files are first grouped by size, then only files sharing a size
//! are hashed (BLAKE3) and regrouped by digest.
//!
//! The library entry point is [`duplicates::DuplicateFinder`]; [`run_app`]
//! wraps it with configuration, logging, Ctrl+C handling and report output
//! for the `dupfind` binary.

pub mod cli;
pub mod config;
pub mod duplicates;
pub mod error;
pub mod logging;
pub mod output;
pub mod progress;
pub mod scanner;
pub mod signal;

use std::io::{self, BufRead, IsTerminal, Write};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};

use crate::cli::{Cli, OutputFormat};
use crate::config::Config;
use crate::duplicates::DuplicateFinder;
use crate::error::ExitCode;
use crate::output::{JsonOutput, TextOutput};
use crate::progress::Progress;
use crate::scanner::WalkerConfig;

/// Prompt shown when no directory is given on the command line.
pub const PATH_PROMPT: &str = "Enter the directory path to scan for duplicates: ";

/// Ask for the directory to scan, reading one line from `input`.
///
/// Surrounding whitespace and the line terminator are stripped.
///
/// # Errors
///
/// Returns an error if reading fails or the answer is empty.
pub fn prompt_for_path<R: BufRead, W: Write>(input: &mut R, output: &mut W) -> Result<PathBuf> {
    write!(output, "{PATH_PROMPT}")?;
    output.flush()?;

    let mut line = String::new();
    input
        .read_line(&mut line)
        .context("Failed to read directory path")?;

    let answer = line.trim();
    if answer.is_empty() {
        bail!("No directory path given");
    }
    Ok(PathBuf::from(answer))
}

/// Whether logging is limited to errors.
///
/// `--json-errors` keeps stderr parseable unless `-v` asks for diagnostics.
fn quiet_logging(cli: &Cli) -> bool {
    cli.quiet || (cli.json_errors && cli.verbose == 0)
}

/// Run the application with parsed CLI arguments.
///
/// Returns [`ExitCode::Success`] once a scan completes, whether or not
/// duplicates were found.
///
/// # Errors
///
/// Returns an error if the scan cannot start (bad root, no path given) or is
/// interrupted; a wrapped
/// [`FinderError::Interrupted`](crate::duplicates::FinderError::Interrupted)
/// maps to [`ExitCode::Interrupted`] via [`ExitCode::for_error`].
pub fn run_app(cli: Cli) -> Result<ExitCode> {
    logging::init_logging(cli.verbose, quiet_logging(&cli));

    let config = Config::load();
    let io_threads = cli.io_threads.unwrap_or(config.io_threads);
    let buffer_size = cli.buffer_size.unwrap_or(config.buffer_size);
    let follow_symlinks = cli.follow_symlinks_override().unwrap_or(config.follow_symlinks);

    let path = match cli.path {
        Some(path) => path,
        None => prompt_for_path(&mut io::stdin().lock(), &mut io::stderr())?,
    };

    let handler = signal::install_handler()?;

    let hide_progress = cli.quiet
        || cli.no_progress
        || cli.output == OutputFormat::Json
        || !io::stderr().is_terminal();
    let progress = Arc::new(Progress::new(hide_progress));

    let finder_config = config
        .finder_config()
        .with_io_threads(io_threads)
        .with_buffer_size(buffer_size)
        .with_walker_config(WalkerConfig::new(follow_symlinks))
        .with_paranoid(cli.paranoid)
        .with_shutdown_flag(handler.get_flag())
        .with_progress_callback(progress);
    log::debug!("Finder configuration: {:?}", finder_config);

    let finder = DuplicateFinder::new(finder_config);
    let (groups, summary) = finder.find_duplicates(&path)?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    match cli.output {
        OutputFormat::Text => {
            let report = TextOutput::new(&groups, &summary);
            report.write_to(&mut out)?;
            if !cli.quiet {
                report.write_summary(&mut io::stderr())?;
            }
        }
        OutputFormat::Json => {
            JsonOutput::new(&groups, &summary, ExitCode::Success).write_to(&mut out, true)?;
        }
    }
    out.flush()?;

    Ok(ExitCode::Success)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::io::Cursor;

    #[test]
    fn test_prompt_for_path_reads_line() {
        let mut input = Cursor::new("/tmp/photos\n");
        let mut output = Vec::new();

        let path = prompt_for_path(&mut input, &mut output).unwrap();

        assert_eq!(path, PathBuf::from("/tmp/photos"));
        assert_eq!(String::from_utf8(output).unwrap(), PATH_PROMPT);
    }

    #[test]
    fn test_prompt_for_path_trims_crlf() {
        let mut input = Cursor::new("  C:\\data \r\n");
        let path = prompt_for_path(&mut input, &mut Vec::new()).unwrap();
        assert_eq!(path, PathBuf::from("C:\\data"));
    }

    #[test]
    fn test_quiet_logging_with_json_errors() {
        let parse = |args: &[&str]| Cli::try_parse_from(args).unwrap();

        assert!(!quiet_logging(&parse(&["dupfind", "/data"])));
        assert!(quiet_logging(&parse(&["dupfind", "-q", "/data"])));
        assert!(quiet_logging(&parse(&["dupfind", "--json-errors", "/data"])));
        assert!(!quiet_logging(&parse(&["dupfind", "--json-errors", "-v", "/data"])));
    }

    #[test]
    fn test_prompt_for_path_rejects_empty() {
        let mut input = Cursor::new("\n");
        assert!(prompt_for_path(&mut input, &mut Vec::new()).is_err());

        let mut eof = Cursor::new("");
        assert!(prompt_for_path(&mut eof, &mut Vec::new()).is_err());
    }
}
