use thiserror::Error;

use crate::{CardKey, PinLabel, PinPayload, Result};

/// One item a source wants pinned.
#[derive(Clone, Debug, PartialEq)]
pub struct SourceItem {
    pub key: CardKey,
    pub label: PinLabel,
    pub payload: PinPayload,
}

/// An item whose key has no counterpart in a companion dataset.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("cannot lookup matching card for {key}")]
pub struct LookupError {
    pub key: CardKey,
}

/// An enumerated entry: either an item ready to pin, or a lookup failure
/// that the driver logs and skips.
pub type Sourced = std::result::Result<SourceItem, LookupError>;

/// Produces the ordered sequence of items for one pipeline run.
///
/// Sources are enumerated fresh on every run and never mutated.
pub trait Source {
    fn enumerate(&self) -> Result<Vec<Sourced>>;
}

impl Source for Vec<Sourced> {
    fn enumerate(&self) -> Result<Vec<Sourced>> {
        Ok(self.clone())
    }
}
