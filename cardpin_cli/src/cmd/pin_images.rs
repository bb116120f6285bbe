use std::path::PathBuf;

use anyhow::Result;
use cardpin_core::DictionaryStore;
use cardpin_source_local::ImageFolderSource;
use clap::Args;
use tracing::info;

use super::{Credentials, create_pinner, required_path, run_batch};
use crate::config::CardpinConfig;

#[derive(Args, Debug)]
pub struct PinImagesArgs {
    /// JSON file mapping card keys to pinned image URIs; created if missing
    #[arg(value_name = "IMAGE_DICTIONARY_JSON")]
    pub image_dictionary: Option<PathBuf>,
    /// folder holding the card images (`<key>.<ext>`)
    #[arg(value_name = "IMAGE_FOLDER")]
    pub image_folder: Option<PathBuf>,
    #[command(flatten)]
    pub credentials: Credentials,
}

pub async fn run_pin_images(args: PinImagesArgs, config: &CardpinConfig) -> Result<()> {
    let dictionary = required_path(args.image_dictionary, "IMAGE_DICTIONARY_JSON")?;
    let folder = required_path(args.image_folder, "IMAGE_FOLDER")?;
    let pinner = create_pinner(args.credentials, config)?;

    info!("Pinning images from {folder:?}");
    let source = ImageFolderSource::new(folder, config.pipeline.label_prefix.clone());
    run_batch(pinner, DictionaryStore::new(dictionary), &source, config).await?;
    info!("done.");
    Ok(())
}
