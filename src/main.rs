#![deny(clippy::all)]

mod analysis;
mod config;
mod credentials;
mod error;
mod export;
mod interactive;
mod markdown;
mod session;
mod video;

use std::io::IsTerminal;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{ArgAction, Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use analysis::gemini::GeminiClient;
use markdown::terminal::{self, Style};
use session::{pipeline, Session, SessionState};
use video::{format_file_size, SelectedFile};

/// Environment variable holding the log filter
const LOG_ENV: &str = "MATCHVISION_LOG";

#[derive(Parser)]
#[command(name = "matchvision", version)]
#[command(about = "Tactical coaching analysis of short match clips")]
#[command(
    after_help = "Environment:\n  GEMINI_API_KEY    API key (falls back to API_KEY, .env is read)\n  MATCHVISION_LOG   Log filter, e.g. matchvision=debug"
)]
struct Cli {
    /// More log output (repeatable)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,
    /// Only warnings and errors in the log
    #[arg(short, long, global = true, default_value_t = false)]
    quiet: bool,
    /// Disable colours in rendered analyses
    #[arg(long, global = true, default_value_t = false)]
    plain: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze one video clip
    Analyze {
        /// Video file (max 25MB)
        video: PathBuf,
        /// Narrow the analysis, e.g. "the left back's positioning"
        #[arg(short, long)]
        focus: Option<String>,
        /// Declared content type, overriding the file extension
        #[arg(long = "mime")]
        mime: Option<String>,
        /// Save the analysis as markdown
        #[arg(long, default_value_t = false)]
        save: bool,
        /// Directory for saved analyses (implies --save)
        #[arg(long)]
        save_dir: Option<PathBuf>,
        /// Also export the analysis as PDF
        #[arg(long)]
        pdf: Option<PathBuf>,
        /// Open the clip in the system player before analyzing
        #[arg(long, default_value_t = false)]
        preview: bool,
    },
    /// Render a markdown analysis file in the terminal
    Render {
        file: PathBuf,
    },
    /// Interactive session: open, analyze, remove, save
    Interactive,
}

fn init_tracing(verbose: u8, quiet: bool) {
    let default_level = match (quiet, verbose) {
        (true, _) => "matchvision=warn",
        (false, 0) => "matchvision=info",
        (false, 1) => "matchvision=debug",
        (false, _) => "matchvision=trace",
    };
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn output_style(plain: bool) -> Style {
    if plain || !std::io::stdout().is_terminal() {
        Style::Plain
    } else {
        Style::Ansi
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    // Initialize tracing for structured logging
    init_tracing(cli.verbose, cli.quiet);

    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            warn!("Failed to load .env file: {}", e);
        }
    }

    // Load configuration from embedded config.toml
    let config = config::Config::load()?;
    let style = output_style(cli.plain);

    match cli.command {
        Commands::Render { file } => {
            let text = std::fs::read_to_string(&file)
                .with_context(|| format!("Failed to read {}", file.display()))?;
            print!("{}", terminal::render_markdown(&text, style));
            Ok(ExitCode::SUCCESS)
        }
        Commands::Interactive => {
            let analyzer = analyzer(&config)?;
            interactive::run(&config, &analyzer, style).await?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Analyze {
            video,
            focus,
            mime,
            save,
            save_dir,
            pdf,
            preview,
        } => {
            let analyzer = analyzer(&config)?;
            let options = AnalyzeOptions {
                focus,
                save: save || save_dir.is_some(),
                save_dir,
                pdf,
                preview,
            };
            let file = SelectedFile::inspect(&video, mime.as_deref())?;
            run_analyze(&config, &analyzer, file, options, style).await
        }
    }
}

fn analyzer(config: &config::Config) -> anyhow::Result<GeminiClient> {
    let credentials = credentials::get_gemini_credentials();
    if credentials.is_none() {
        warn!("No Gemini API key found; analysis will fail until GEMINI_API_KEY is set");
    }
    GeminiClient::new(&config.analysis, credentials)
}

struct AnalyzeOptions {
    focus: Option<String>,
    save: bool,
    save_dir: Option<PathBuf>,
    pdf: Option<PathBuf>,
    preview: bool,
}

/// One-shot selection → analysis → output.
async fn run_analyze(
    config: &config::Config,
    analyzer: &GeminiClient,
    file: SelectedFile,
    options: AnalyzeOptions,
    style: Style,
) -> anyhow::Result<ExitCode> {
    let mut session = Session::new(config.video.max_size_bytes);

    info!(
        "Selected {} ({})",
        file.name,
        format_file_size(file.size)
    );
    if pipeline::load_video(&mut session, file).await.is_err() {
        return Ok(report_failure(&session));
    }

    if options.preview {
        if let Some(preview) = session.video().and_then(|v| v.preview.as_ref()) {
            if let Err(e) = preview.open() {
                warn!("Failed to open preview: {}", e);
            }
        }
    }

    eprintln!("Analyzing tactics...");
    let result = match pipeline::run_analysis(&mut session, analyzer, options.focus).await {
        Ok(result) => result.clone(),
        Err(_) => return Ok(report_failure(&session)),
    };

    print!("{}", style_title("Coach's Analysis", style));
    print!("{}", terminal::render_markdown(&result.markdown, style));

    let video_name = session
        .video()
        .map(|v| v.file.name.clone())
        .unwrap_or_default();

    if options.save {
        let path = export::save_report(&result, &video_name, options.save_dir.as_deref())?;
        eprintln!("Saved analysis to {}", path.display());
    }
    if let Some(path) = options.pdf {
        let title = format!("Coach's Analysis: {}", video_name);
        export::pdf::write_pdf(&path, &title, &result.markdown, &config.export)?;
        eprintln!("Saved PDF to {}", path.display());
    }

    Ok(ExitCode::SUCCESS)
}

fn style_title(title: &str, style: Style) -> String {
    terminal::render_markdown(&format!("# {}", title), style)
}

fn report_failure(session: &Session) -> ExitCode {
    debug_assert_eq!(session.state(), SessionState::Error);
    eprintln!(
        "Error: {}",
        session.error_message().unwrap_or("An error occurred.")
    );
    ExitCode::FAILURE
}
