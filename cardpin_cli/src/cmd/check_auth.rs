use anyhow::{Context, Result};
use clap::Args;
use tracing::info;

use super::{Credentials, create_pinner};
use crate::config::CardpinConfig;

#[derive(Args, Debug)]
pub struct CheckAuthArgs {
    #[command(flatten)]
    pub credentials: Credentials,
}

pub async fn run_check_auth(args: CheckAuthArgs, config: &CardpinConfig) -> Result<()> {
    let pinner = create_pinner(args.credentials, config)?;
    let message = pinner
        .test_authentication()
        .await
        .context("authentication failed")?;
    info!("{message}");
    Ok(())
}
