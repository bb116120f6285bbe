use std::path::PathBuf;

use anyhow::Result;
use cardpin_core::DictionaryStore;
use cardpin_source_catalog::{Catalog, CatalogSource};
use clap::Args;
use tracing::info;

use super::{Credentials, create_pinner, required_path, run_batch};
use crate::config::CardpinConfig;

#[derive(Args, Debug)]
pub struct PinMetadataArgs {
    /// Scryfall set export (`{"card_array": [...]}`)
    #[arg(value_name = "SCRYFALL_SET_JSON")]
    pub catalog: Option<PathBuf>,
    /// dictionary written by `pin-images`; must exist
    #[arg(value_name = "IMAGE_DICTIONARY_JSON")]
    pub image_dictionary: Option<PathBuf>,
    /// JSON file mapping card keys to pinned metadata URIs; created if missing
    #[arg(value_name = "METADATA_DICTIONARY_JSON")]
    pub metadata_dictionary: Option<PathBuf>,
    #[command(flatten)]
    pub credentials: Credentials,
}

pub async fn run_pin_metadata(args: PinMetadataArgs, config: &CardpinConfig) -> Result<()> {
    let catalog = required_path(args.catalog, "SCRYFALL_SET_JSON")?;
    let image_dictionary = required_path(args.image_dictionary, "IMAGE_DICTIONARY_JSON")?;
    let metadata_dictionary =
        required_path(args.metadata_dictionary, "METADATA_DICTIONARY_JSON")?;
    let pinner = create_pinner(args.credentials, config)?;

    info!("Loading card catalog...");
    let catalog = Catalog::load(&catalog)?;
    let images = DictionaryStore::new(image_dictionary).load_required()?;
    info!("{} pinned images to describe.", images.len());

    let source = CatalogSource::new(catalog, images, config.pipeline.label_prefix.clone());
    run_batch(pinner, DictionaryStore::new(metadata_dictionary), &source, config).await?;
    info!("done.");
    Ok(())
}
