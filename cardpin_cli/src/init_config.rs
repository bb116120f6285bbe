use std::{fs, io::Write, path::Path};

use anyhow::Context;
use clap::Subcommand;
use toml_edit::{DocumentMut, Item, Table, value};
use tracing::info;

use crate::config::CardpinConfig;

#[derive(Subcommand)]
pub enum CmdConfig {
    /// Creates the config file if it doesn't exist and fills in missing defaults
    Init,
}

impl CmdConfig {
    pub fn run(self, config_file: &Path) -> anyhow::Result<()> {
        let mut doc = if config_file.exists() {
            fs::read_to_string(config_file)?
        } else {
            if let Some(parent) = config_file.parent() {
                fs::create_dir_all(parent)?;
            }
            String::new()
        }
        .parse::<DocumentMut>()
        .context("could not parse config file")?;

        match self {
            Self::Init => {
                let defaults = CardpinConfig::default();

                let pinata = table_mut(&mut doc, "pinata")?;
                pinata
                    .entry("api_url")
                    .or_insert(value(defaults.pinata.api_url));
                pinata
                    .entry("api_key")
                    .or_insert(value(defaults.pinata.api_key));
                pinata
                    .entry("api_secret")
                    .or_insert(value(defaults.pinata.api_secret));
                pinata
                    .entry("timeout_secs")
                    .or_insert(value(defaults.pinata.timeout_secs as i64));

                let pipeline = table_mut(&mut doc, "pipeline")?;
                pipeline
                    .entry("delay_ms")
                    .or_insert(value(defaults.pipeline.delay_ms as i64));
                pipeline
                    .entry("save_every")
                    .or_insert(value(defaults.pipeline.save_every as i64));
                pipeline
                    .entry("label_prefix")
                    .or_insert(value(defaults.pipeline.label_prefix));
            }
        }

        info!("writing to config file {config_file:?}");

        let tmp_path = config_file.with_extension("tmp");
        let mut tmp = fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&tmp_path)?;
        tmp.write_all(doc.to_string().as_bytes())?;
        tmp.sync_all()?;
        fs::rename(&tmp_path, config_file)?;
        Ok(())
    }
}

fn table_mut<'a>(doc: &'a mut DocumentMut, name: &str) -> anyhow::Result<&'a mut Table> {
    doc.entry(name)
        .or_insert(Item::Table(Table::new()))
        .as_table_mut()
        .with_context(|| format!("`{name}` in the config file is not a table"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn creates_default_config() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("cardpin").join("config.toml");
        CmdConfig::Init.run(&path).unwrap();

        let config = CardpinConfig::load(Some(&path)).unwrap();
        assert_eq!(config, CardpinConfig::default());
        assert!(!path.with_extension("tmp").exists());
    }

    #[test]
    fn keeps_existing_values_and_comments() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            "# my keys\n[pinata]\napi_key = \"abc\"\napi_secret = \"xyz\"\n",
        )
        .unwrap();

        CmdConfig::Init.run(&path).unwrap();

        let written = fs::read_to_string(&path).unwrap();
        assert!(written.starts_with("# my keys\n"));
        let config = CardpinConfig::load(Some(&path)).unwrap();
        assert_eq!(config.pinata.api_key, "abc");
        assert_eq!(config.pinata.api_secret, "xyz");
        assert_eq!(config.pipeline.delay_ms, 3000);
    }

    #[test]
    fn rejects_non_table_section() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "pinata = 5\n").unwrap();
        assert!(CmdConfig::Init.run(&path).is_err());
    }
}
