mod api;
mod config;
mod download;
mod error;
#[cfg(test)]
mod fake;
mod listing;
mod models;
mod parser;
mod sanitise;
mod serialiser;
mod srt;
mod table;

use crate::api::{BilibiliClient, Platform};
use crate::config::{
    ClientConfig, DownloadConfig, Selection, DEFAULT_API_BASE, DEFAULT_TIMEOUT_SECS,
};
use crate::download::{DownloadReport, Downloader};
use crate::parser::{select_range, FilenameTemplate};

use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    match run() {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(err) => {
            print_error("An error occurred:", &err);
            ExitCode::FAILURE
        }
    }
}

#[derive(Parser)]
#[command(
    name = "bilisubdl",
    version,
    about = "Download bilibili.tv subtitles and convert them to SRT",
    after_help = "Examples:\n  bilisubdl download 37738 1042594 -l th\n  bilisubdl list languages 37738\n  bilisubdl timeline sun"
)]
struct Cli {
    #[arg(short, long, global = true, help = "Only report errors.")]
    quiet: bool,
    #[arg(
        short,
        long,
        global = true,
        conflicts_with = "quiet",
        help = "Log every request."
    )]
    verbose: bool,
    #[arg(
        long,
        global = true,
        value_name = "URL",
        env = "BILISUBDL_API_BASE",
        default_value = DEFAULT_API_BASE,
        help = "Base URL of the bilibili.tv gateway."
    )]
    api_base: String,
    #[arg(
        long,
        global = true,
        value_name = "LOCALE",
        env = "BILISUBDL_LOCALE",
        help = "Locale sent with API requests (e.g. en_US)."
    )]
    locale: Option<String>,
    #[arg(
        long,
        global = true,
        value_name = "SECS",
        default_value_t = DEFAULT_TIMEOUT_SECS,
        help = "Timeout for each HTTP request."
    )]
    timeout: u64,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    #[command(about = "Download the subtitles of one or more shows")]
    Download {
        #[arg(required = true, value_name = "ID", help = "Season ids of the shows.")]
        ids: Vec<String>,
        #[command(flatten)]
        target: TargetArgs,
        #[command(flatten)]
        selection: SelectionArgs,
    },
    #[command(about = "Download subtitles by episode id")]
    Episode {
        #[arg(required = true, value_name = "EPISODE_ID")]
        ids: Vec<String>,
        #[command(flatten)]
        target: TargetArgs,
        #[arg(
            long,
            value_name = "TEMPLATE",
            help = "Name the files after a pattern instead of the episode id (e.g. 'Abc %d' = Abc 1, 'Abc %02d' = Abc 01)."
        )]
        filename: Option<String>,
    },
    #[command(about = "List the languages, sections or episodes of a show")]
    List {
        #[command(subcommand)]
        what: ListCommand,
    },
    #[command(about = "Search shows by title")]
    Search {
        query: String,
        #[arg(long, default_value_t = 10, help = "Maximum number of results.")]
        limit: usize,
        #[arg(long, help = "Print the raw results as JSON.")]
        json: bool,
    },
    #[command(about = "Show the weekly release timeline")]
    Timeline {
        #[arg(value_enum, default_value_t = Day::Today)]
        day: Day,
        #[arg(long, help = "Print the raw timeline as JSON.")]
        json: bool,
    },
}

#[derive(Subcommand)]
enum ListCommand {
    #[command(about = "List available subtitle languages")]
    Languages { id: String },
    #[command(about = "List sections")]
    Sections { id: String },
    #[command(about = "List episodes")]
    Episodes {
        id: String,
        #[command(flatten)]
        selection: SelectionArgs,
    },
}

#[derive(Args)]
struct TargetArgs {
    #[arg(
        short,
        long,
        value_name = "LANG",
        help = "Subtitle language to download (e.g. en)."
    )]
    language: String,
    #[arg(
        short,
        long,
        value_name = "DIR",
        default_value = ".",
        help = "The directory to write subtitles to."
    )]
    output: PathBuf,
    #[arg(short = 'w', long, help = "Replace subtitles that were already downloaded.")]
    overwrite: bool,
}

impl TargetArgs {
    fn into_config(self, quiet: bool) -> DownloadConfig {
        let mut config = DownloadConfig::new(self.language, self.output);
        config.overwrite = self.overwrite;
        config.quiet = quiet;
        config
    }
}

#[derive(Args)]
struct SelectionArgs {
    #[arg(long, value_name = "RANGE", help = "Sections to include (e.g. 5,8-10).")]
    section: Vec<String>,
    #[arg(long, value_name = "RANGE", help = "Episodes to include (e.g. 5,8-10).")]
    episode: Vec<String>,
}

impl SelectionArgs {
    /// Rejects malformed ranges before anything is fetched.
    fn into_selection(self) -> Result<Selection> {
        fn tokens(values: Vec<String>) -> Result<Option<Vec<String>>> {
            if values.is_empty() {
                return Ok(None);
            }
            select_range(&values, 0)?;
            Ok(Some(values))
        }
        Ok(Selection {
            sections: tokens(self.section)?,
            episodes: tokens(self.episode)?,
        })
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum Day {
    Today,
    Sun,
    Mon,
    Tue,
    Wed,
    Thu,
    Fri,
    Sat,
}

impl Day {
    fn code(self) -> Option<&'static str> {
        match self {
            Day::Today => None,
            Day::Sun => Some("SUN"),
            Day::Mon => Some("MON"),
            Day::Tue => Some("TUE"),
            Day::Wed => Some("WED"),
            Day::Thu => Some("THU"),
            Day::Fri => Some("FRI"),
            Day::Sat => Some("SAT"),
        }
    }
}

fn init_logging(verbose: bool, quiet: bool) {
    let level = if verbose {
        "debug"
    } else if quiet {
        "error"
    } else {
        "info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!("warn,{}={}", env!("CARGO_CRATE_NAME"), level))
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

/// Returns whether every item succeeded.
fn run() -> Result<bool> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    let client_config = ClientConfig {
        api_base: cli.api_base,
        locale: cli.locale,
        timeout: Duration::from_secs(cli.timeout),
    };
    let client =
        BilibiliClient::new(&client_config).context("Failed to set up the HTTP client")?;
    let mut out = io::stdout().lock();

    match cli.command {
        Command::Download {
            ids,
            target,
            selection,
        } => {
            let mut config = target.into_config(cli.quiet);
            config.selection = selection.into_selection()?;
            Ok(download_shows(&client, &config, &ids))
        }
        Command::Episode {
            ids,
            target,
            filename,
        } => {
            let mut config = target.into_config(cli.quiet);
            config.filename = filename
                .as_deref()
                .map(FilenameTemplate::parse)
                .transpose()?;
            let report = Downloader::new(&client, &config)
                .download_episodes(&ids)
                .context("Failed to download episodes")?;
            Ok(report_failures("episode", report))
        }
        Command::List { what } => {
            let listed = match what {
                ListCommand::Languages { id } => listing::languages(&client, &id, &mut out),
                ListCommand::Sections { id } => listing::sections(&client, &id, &mut out),
                ListCommand::Episodes { id, selection } => {
                    listing::episodes(&client, &id, &selection.into_selection()?, &mut out)
                }
            };
            listed.context("Failed to list show")?;
            Ok(true)
        }
        Command::Search { query, limit, json } => {
            listing::search(&client, &query, limit, json, &mut out).context("Search failed")?;
            Ok(true)
        }
        Command::Timeline { day, json } => {
            listing::timeline(&client, day.code(), json, &mut out)
                .context("Failed to load the timeline")?;
            Ok(true)
        }
    }
}

/// Downloads each show in turn; a failing show is reported and the next one
/// is still processed.
fn download_shows<P: Platform>(platform: &P, config: &DownloadConfig, ids: &[String]) -> bool {
    let downloader = Downloader::new(platform, config);
    let mut success = true;
    for id in ids {
        match downloader.download_show(id) {
            Ok(report) => {
                info!(
                    season_id = %id,
                    written = report.written.len(),
                    skipped = report.skipped.len(),
                    failed = report.failed.len(),
                    "show finished"
                );
                success &= report_failures(&format!("ID: {} episode", id), report);
            }
            Err(err) => {
                print_error(&format!("ID: {}", id), &anyhow::Error::new(err));
                success = false;
            }
        }
    }
    success
}

fn report_failures(prefix: &str, report: DownloadReport) -> bool {
    let success = report.is_success();
    for (episode_id, err) in report.failed {
        print_error(&format!("{} {}:", prefix, episode_id), &anyhow::Error::new(err));
    }
    success
}

fn print_error(prefix: &str, err: &anyhow::Error) {
    eprintln!("{} {}", prefix, err);
    for cause in err.chain().skip(1) {
        eprintln!("    {}", cause);
    }
}
