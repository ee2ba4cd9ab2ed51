use std::{
    fs::{self, File},
    io,
    path::{Path, PathBuf},
    process::ExitCode,
};

use clap::Parser;
use lnk_parser::{DecodeConfig, Lnk, LnkParseError, NarrowCount, NarrowEncoding};
use log::{LevelFilter, error, info, warn};
use simplelog::{ColorChoice, Config, TermLogger, TerminalMode};

#[derive(Debug, clap::Parser)]
struct Args {
    /// Log verbosity
    #[arg(long, value_enum, default_value_t = LogLevel::Warn, global = true)]
    log_level: LogLevel,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, clap::Subcommand)]
enum Command {
    /// Decode a shell link file and print it
    Read {
        #[arg()]
        target: PathBuf,
        /// Print JSON instead of the debug representation
        #[arg(long)]
        json: bool,
        /// Also write the JSON document to `<DIR>/<file stem>.json`
        #[arg(short, long, value_name = "DIR")]
        output: Option<PathBuf>,
        /// Code page used for narrow strings
        #[arg(long, value_enum, default_value_t = Encoding::Latin1)]
        encoding: Encoding,
        /// Width of the StringData length prefix for narrow strings
        #[arg(long, value_enum, default_value_t = Count::U32)]
        narrow_count: Count,
    },
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum Encoding {
    Latin1,
    Utf8,
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum Count {
    U16,
    U32,
}

#[derive(Debug, thiserror::Error)]
enum DumpError {
    #[error("failed to open {path}: {source}")]
    Open { path: PathBuf, source: io::Error },
    #[error("failed to parse link file: {0}")]
    Parse(#[from] LnkParseError),
    #[error("failed to serialize link: {0}")]
    Json(#[from] serde_json::Error),
    #[error("failed to write {path}: {source}")]
    Write { path: PathBuf, source: io::Error },
}

/// Installs the stderr logger. Returns false when a logger was already set.
fn init_logging(level: LogLevel) -> bool {
    match TermLogger::init(
        level.into(),
        Config::default(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    ) {
        Ok(()) => true,
        Err(err) => {
            eprintln!("failed to initialize logging: {err}");
            false
        }
    }
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.log_level);

    match args.command {
        Command::Read {
            target,
            json,
            output,
            encoding,
            narrow_count,
        } => {
            let config = DecodeConfig::build()
                .narrow_encoding(match encoding {
                    Encoding::Latin1 => NarrowEncoding::Latin1,
                    Encoding::Utf8 => NarrowEncoding::Utf8,
                })
                .narrow_count(match narrow_count {
                    Count::U16 => NarrowCount::U16,
                    Count::U32 => NarrowCount::U32,
                });

            match read(&target, json, output.as_deref(), &config) {
                Ok(()) => ExitCode::SUCCESS,
                Err(err) => {
                    error!("[lnk-dump] {err}");
                    ExitCode::FAILURE
                }
            }
        }
    }
}

fn read(
    target: &Path,
    json: bool,
    output: Option<&Path>,
    config: &DecodeConfig,
) -> Result<(), DumpError> {
    let mut file = File::open(target).map_err(|source| DumpError::Open {
        path: target.to_path_buf(),
        source,
    })?;
    let lnk = Lnk::from_reader_with(&mut file, config)?;

    for diagnostic in &lnk.diagnostics {
        warn!("[lnk-dump] {}: {diagnostic}", target.display());
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&lnk)?);
    } else {
        println!("{lnk:#?}");
    }

    if let Some(dir) = output {
        let path = output_path(dir, target);
        let document = serde_json::to_vec_pretty(&lnk)?;
        fs::write(&path, document).map_err(|source| DumpError::Write {
            path: path.clone(),
            source,
        })?;
        info!("[lnk-dump] wrote {}", path.display());
    }

    Ok(())
}

/// `<dir>/<stem of target>.json`
fn output_path(dir: &Path, target: &Path) -> PathBuf {
    let stem = target
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "link".to_string());
    dir.join(format!("{stem}.json"))
}
