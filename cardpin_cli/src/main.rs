use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use clap_verbosity_flag::InfoLevel;
use directories::ProjectDirs;
use tracing::error;

use crate::cmd::{CheckAuthArgs, PinImagesArgs, PinMetadataArgs};
use crate::config::Overrides;
use crate::init_config::CmdConfig;

mod cmd;
mod config;
mod console;
mod init_config;

#[derive(Parser)]
#[command(name = "cardpin", version, about, long_about = None)]
struct Cli {
    /// config file to use instead of ~/.config/cardpin/config.toml
    #[arg(short, long, value_name = "PATH", global = true)]
    config: Option<PathBuf>,

    /// pause between two pin requests, in milliseconds
    #[arg(long, value_name = "MS", global = true)]
    delay_ms: Option<u64>,

    /// save the dictionary after this many new pins (0 saves only at the end)
    #[arg(long, value_name = "COUNT", global = true)]
    save_every: Option<usize>,

    /// prefix of the pin labels
    #[arg(long, value_name = "PREFIX", global = true)]
    label_prefix: Option<String>,

    #[command(flatten)]
    verbosity: clap_verbosity_flag::Verbosity<InfoLevel>,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Modify the cardpin config file
    Config {
        #[command(subcommand)]
        cmd: CmdConfig,
    },
    /// Pin every numbered image of a folder and record the hashes
    PinImages(PinImagesArgs),
    /// Pin a metadata document for every pinned image
    PinMetadata(PinMetadataArgs),
    /// Check the Pinata credentials
    CheckAuth(CheckAuthArgs),
}

impl Commands {
    fn usage(&self) -> &'static str {
        match self {
            Self::Config { .. } => "cardpin config init",
            Self::PinImages(_) => {
                "cardpin pin-images <IMAGE_DICTIONARY_JSON> <IMAGE_FOLDER> <PINATA_API_KEY> <PINATA_API_SECRET>"
            }
            Self::PinMetadata(_) => {
                "cardpin pin-metadata <SCRYFALL_SET_JSON> <IMAGE_DICTIONARY_JSON> <METADATA_DICTIONARY_JSON> <PINATA_API_KEY> <PINATA_API_SECRET>"
            }
            Self::CheckAuth(_) => "cardpin check-auth <PINATA_API_KEY> <PINATA_API_SECRET>",
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => return console::report_parse_error(err),
    };
    console::init(cli.verbosity);

    // ~/.config/cardpin/config.toml unless --config is given
    let config_file = cli.config.or_else(|| {
        ProjectDirs::from("", "", "cardpin").map(|dirs| dirs.config_dir().join("config.toml"))
    });
    let overrides = Overrides {
        delay_ms: cli.delay_ms,
        save_every: cli.save_every,
        label_prefix: cli.label_prefix,
    };

    let usage = cli.cmd.usage();
    match cmd::run_command(config_file, overrides, cli.cmd).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            if let Some(cardpin_core::Error::Argument(_)) = err.downcast_ref() {
                println!("Usage: {usage}");
            }
            error!("{err:#}");
            ExitCode::FAILURE
        }
    }
}
