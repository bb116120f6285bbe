use std::path::PathBuf;

use anyhow::{Context, Result};
use cardpin_core::{BatchDriver, BatchReport, DictionaryStore, Error, Pinner, Source};
use cardpin_pinata::{PinataConfig, PinataPinner};
use clap::Args;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::config::{CardpinConfig, Overrides};

mod check_auth;
mod pin_images;
mod pin_metadata;

pub use check_auth::{CheckAuthArgs, run_check_auth};
pub use pin_images::{PinImagesArgs, run_pin_images};
pub use pin_metadata::{PinMetadataArgs, run_pin_metadata};

pub async fn run_command(
    config_file: Option<PathBuf>,
    overrides: Overrides,
    cmd: crate::Commands,
) -> Result<()> {
    match cmd {
        crate::Commands::Config { cmd } => {
            let config_file = config_file.context("failed to determine config directory path")?;
            cmd.run(&config_file)
        }
        crate::Commands::PinImages(args) => {
            run_pin_images(args, &load_config(config_file, overrides)?).await
        }
        crate::Commands::PinMetadata(args) => {
            run_pin_metadata(args, &load_config(config_file, overrides)?).await
        }
        crate::Commands::CheckAuth(args) => {
            run_check_auth(args, &load_config(config_file, overrides)?).await
        }
    }
}

fn load_config(config_file: Option<PathBuf>, overrides: Overrides) -> Result<CardpinConfig> {
    let mut config = CardpinConfig::load(config_file.as_deref())?;
    config.apply(overrides);
    Ok(config)
}

/// Pinata credentials; given on the command line they win over the config file.
#[derive(Args, Debug, Clone, Default)]
pub struct Credentials {
    #[arg(value_name = "PINATA_API_KEY")]
    pub api_key: Option<String>,
    #[arg(value_name = "PINATA_API_SECRET")]
    pub api_secret: Option<String>,
}

impl Credentials {
    pub fn resolve(self, config: &PinataConfig) -> Result<PinataConfig, Error> {
        let api_key = self.api_key.unwrap_or_else(|| config.api_key.clone());
        let api_secret = self.api_secret.unwrap_or_else(|| config.api_secret.clone());
        Ok(PinataConfig {
            api_key: required(api_key, "PINATA_API_KEY")?,
            api_secret: required(api_secret, "PINATA_API_SECRET")?,
            ..config.clone()
        })
    }
}

/// Rejects empty (or whitespace-only) arguments as `Invalid <NAME>.`.
pub fn required(value: String, name: &str) -> Result<String, Error> {
    if value.trim().is_empty() {
        Err(Error::Argument(name.to_owned()))
    } else {
        Ok(value)
    }
}

pub fn required_path(value: Option<PathBuf>, name: &str) -> Result<PathBuf, Error> {
    match value {
        Some(path) if !path.as_os_str().is_empty() => Ok(path),
        _ => Err(Error::Argument(name.to_owned())),
    }
}

pub fn create_pinner(credentials: Credentials, config: &CardpinConfig) -> Result<PinataPinner> {
    let pinata = credentials.resolve(&config.pinata)?;
    PinataPinner::create(pinata).context("failed to set up the Pinata client")
}

/// Runs one batch, stopping early on Ctrl-C, and logs its summary.
pub async fn run_batch<P, S>(
    pinner: P,
    store: DictionaryStore,
    source: &S,
    config: &CardpinConfig,
) -> Result<BatchReport>
where
    P: Pinner,
    S: Source + ?Sized,
{
    let cancel = CancellationToken::new();
    let ctrl_c = tokio::spawn({
        let cancel = cancel.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("interrupted, saving progress");
                cancel.cancel();
            }
        }
    });

    let mut driver = BatchDriver::new(pinner, store)
        .with_config(config.pipeline.driver_config())
        .with_cancellation(cancel);
    let result = driver.run(source).await;
    ctrl_c.abort();

    let report = result?;
    info!(
        "Pinned {}, already pinned {}, failed {}, not found {}; {} entries in {:?}",
        report.pinned,
        report.already_pinned,
        report.failed,
        report.lookup_failures,
        report.mapping_len,
        driver.store().path(),
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn configured() -> PinataConfig {
        PinataConfig {
            api_key: "file-key".into(),
            api_secret: "file-secret".into(),
            ..Default::default()
        }
    }

    #[test]
    fn command_line_credentials_win() {
        let credentials = Credentials {
            api_key: Some("cli-key".into()),
            api_secret: Some("cli-secret".into()),
        };
        let resolved = credentials.resolve(&configured()).unwrap();
        assert_eq!(resolved.api_key, "cli-key");
        assert_eq!(resolved.api_secret, "cli-secret");
        assert_eq!(resolved.api_url, configured().api_url);
    }

    #[test]
    fn config_file_credentials_are_the_fallback() {
        let resolved = Credentials::default().resolve(&configured()).unwrap();
        assert_eq!(resolved.api_key, "file-key");
        assert_eq!(resolved.api_secret, "file-secret");
    }

    #[test]
    fn missing_credentials_name_the_argument() {
        let err = Credentials::default()
            .resolve(&PinataConfig::default())
            .unwrap_err();
        assert_eq!(err.to_string(), "Invalid PINATA_API_KEY.");

        let err = Credentials {
            api_key: Some("key".into()),
            api_secret: Some(" ".into()),
        }
        .resolve(&PinataConfig::default())
        .unwrap_err();
        assert_eq!(err.to_string(), "Invalid PINATA_API_SECRET.");
    }

    #[test]
    fn empty_paths_are_invalid() {
        assert!(matches!(
            required_path(None, "IMAGE_FOLDER"),
            Err(Error::Argument(name)) if name == "IMAGE_FOLDER"
        ));
        assert!(required_path(Some(PathBuf::new()), "IMAGE_FOLDER").is_err());
        assert!(required_path(Some("images".into()), "IMAGE_FOLDER").is_ok());
    }
}
