//! Interactive shell around a single session
//!
//! Reads one command per line from stdin and drives the same session and
//! pipelines as the one-shot `analyze` command. Commands mirror the actions
//! a user can take on a clip: open, analyze, preview, remove, save.

use crate::analysis::Analyzer;
use crate::config::Config;
use crate::export;
use crate::markdown::terminal::{self, Style};
use crate::session::{pipeline, Session, SessionState};
use crate::video::{format_file_size, SelectedFile};
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, warn};

const HELP: &str = "\
Commands:
  open <path> [--type <mime>]   select a video clip
  analyze [focus...]            analyze the current clip, optionally with a focus
  preview                       open the clip in the system player
  remove                        remove the clip and reset the session
  status                        show the session state
  save [dir]                    save the last analysis as markdown
  pdf <path>                    export the last analysis as PDF
  help                          show this help
  quit                          leave";

const TYPE_FLAG: &str = "--type";

/// A parsed shell command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Command {
    Open {
        path: PathBuf,
        content_type: Option<String>,
    },
    Analyze {
        focus: Option<String>,
    },
    Preview,
    Remove,
    Status,
    Save {
        dir: Option<PathBuf>,
    },
    Pdf {
        path: PathBuf,
    },
    Help,
    Quit,
}

/// Parse one input line. `Ok(None)` for blank input.
pub(crate) fn parse_command(line: &str) -> Result<Option<Command>, String> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    let (verb, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
    let rest = rest.trim();

    let command = match verb.to_ascii_lowercase().as_str() {
        "open" => {
            let (path, content_type) = split_type_flag(rest);
            if path.is_empty() {
                return Err("usage: open <path> [--type <mime>]".to_string());
            }
            Command::Open {
                path: PathBuf::from(path),
                content_type: content_type
                    .filter(|t| !t.is_empty())
                    .map(str::to_string),
            }
        }
        "analyze" => Command::Analyze {
            focus: Some(rest.to_string()).filter(|f| !f.is_empty()),
        },
        "preview" => Command::Preview,
        "remove" => Command::Remove,
        "status" => Command::Status,
        "save" => Command::Save {
            dir: Some(rest).filter(|d| !d.is_empty()).map(PathBuf::from),
        },
        "pdf" => {
            if rest.is_empty() {
                return Err("usage: pdf <path>".to_string());
            }
            Command::Pdf {
                path: PathBuf::from(rest),
            }
        }
        "help" | "?" => Command::Help,
        "quit" | "exit" => Command::Quit,
        other => return Err(format!("unknown command: {other} (try `help`)")),
    };
    Ok(Some(command))
}

/// Split a standalone `--type <mime>` token off the `open` argument.
fn split_type_flag(rest: &str) -> (&str, Option<&str>) {
    let flag = rest.rmatch_indices(TYPE_FLAG).find(|(i, _)| {
        let after = &rest[i + TYPE_FLAG.len()..];
        (*i == 0 || rest[..*i].ends_with(char::is_whitespace))
            && (after.is_empty() || after.starts_with(char::is_whitespace))
    });
    match flag {
        Some((i, _)) => (rest[..i].trim(), Some(rest[i + TYPE_FLAG.len()..].trim())),
        None => (rest, None),
    }
}

/// One-line summary of the session.
pub(crate) fn describe(session: &Session) -> String {
    let mut line = format!("state: {}", session.state());
    if let Some(video) = session.video() {
        line.push_str(&format!(
            " | clip: {} ({}, {})",
            video.file.name,
            format_file_size(video.file.size),
            video.mime_type
        ));
        if let Some(preview) = &video.preview {
            line.push_str(&format!(" | preview: {}", preview.url()));
        }
    }
    if let Some(text) = session.analysis_text() {
        line.push_str(&format!(" | analysis: {} lines", text.lines().count()));
    }
    if let Some(message) = session.error_message() {
        line.push_str(&format!(" | error: {message}"));
    }
    if session.state() == SessionState::Error {
        line.push_str(" | `remove` to start over");
    } else if session.can_start_analysis() {
        line.push_str(" | ready to analyze");
    }
    line
}

/// Run the shell until `quit` or end of input.
pub(crate) async fn run(
    config: &Config,
    analyzer: &dyn Analyzer,
    style: Style,
) -> anyhow::Result<()> {
    let mut session = Session::new(config.video.max_size_bytes);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    println!("MatchVision interactive. Type `help` for commands.");
    loop {
        println!("[{}]>", session.state());
        let Some(line) = lines.next_line().await? else {
            break;
        };

        let command = match parse_command(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(message) => {
                println!("{message}");
                continue;
            }
        };
        debug!(?command, "Shell command");

        if command == Command::Quit {
            break;
        }
        execute(&mut session, command, config, analyzer, style).await;
    }
    Ok(())
}

async fn execute(
    session: &mut Session,
    command: Command,
    config: &Config,
    analyzer: &dyn Analyzer,
    style: Style,
) {
    match command {
        Command::Open { path, content_type } => {
            match SelectedFile::inspect(&path, content_type.as_deref()) {
                Ok(file) => {
                    if let Err(e) = pipeline::load_video(session, file).await {
                        println!("{e}");
                    }
                    println!("{}", describe(session));
                }
                Err(e) => println!("{e}"),
            }
        }
        Command::Analyze { focus } => {
            println!("Analyzing tactics...");
            match pipeline::run_analysis(session, analyzer, focus).await {
                Ok(result) => print!("{}", terminal::render_markdown(&result.markdown, style)),
                Err(e) => println!("{e}"),
            }
        }
        Command::Preview => match session.video().and_then(|v| v.preview.as_ref()) {
            Some(preview) => {
                if let Err(e) = preview.open() {
                    warn!("Failed to open preview: {}", e);
                    println!("Could not open preview: {e}");
                }
            }
            None => println!("No clip to preview"),
        },
        Command::Remove => match session.remove_video() {
            Ok(()) => println!("{}", describe(session)),
            Err(e) => println!("{e}"),
        },
        Command::Status => println!("{}", describe(session)),
        Command::Save { dir } => match (session.analysis(), session.video()) {
            (Some(result), Some(video)) => {
                match export::save_report(result, &video.file.name, dir.as_deref()) {
                    Ok(path) => println!("Saved {}", path.display()),
                    Err(e) => println!("{e}"),
                }
            }
            _ => println!("No analysis to save"),
        },
        Command::Pdf { path } => match (session.analysis(), session.video()) {
            (Some(result), Some(video)) => {
                let title = format!("Coach's Analysis: {}", video.file.name);
                match export::pdf::write_pdf(&path, &title, &result.markdown, &config.export) {
                    Ok(()) => println!("Saved {}", path.display()),
                    Err(e) => println!("{e:#}"),
                }
            }
            _ => println!("No analysis to export"),
        },
        Command::Help => println!("{HELP}"),
        Command::Quit => {}
    }
}
