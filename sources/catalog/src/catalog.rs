use std::{collections::BTreeMap, path::Path};

use cardpin_core::{CardKey, Error, Result};
use serde::{Deserialize, Serialize};

/// The fields of a catalog card that the metadata documents need.
/// Everything else in the record is ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardRecord {
    #[serde(default)]
    pub multiverse_ids: Vec<u64>,
    pub name: String,
    #[serde(default)]
    pub oracle_text: Option<String>,
    #[serde(default)]
    pub card_faces: Vec<CardFace>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardFace {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub oracle_text: Option<String>,
}

impl CardRecord {
    /// The card's first multiverse id, which keys it in every mapping.
    pub fn key(&self) -> Option<CardKey> {
        self.multiverse_ids.first().copied().map(CardKey::from)
    }

    /// Rules text of the card. Multi-faced cards carry their text on the
    /// faces; those are joined with a `//` line.
    pub fn description(&self) -> Option<String> {
        if let Some(text) = &self.oracle_text {
            return Some(text.clone());
        }
        let faces: Vec<&str> = self
            .card_faces
            .iter()
            .filter_map(|face| face.oracle_text.as_deref())
            .collect();
        if faces.is_empty() {
            None
        } else {
            Some(faces.join("\n//\n"))
        }
    }
}

#[derive(Deserialize)]
struct CatalogFile {
    card_array: Vec<CardRecord>,
}

/// Catalog cards indexed by key.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    cards: BTreeMap<CardKey, CardRecord>,
}

impl Catalog {
    /// Loads a catalog file (`{"card_array": [...]}`).
    pub fn load(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path).map_err(|err| Error::io(path, err))?;
        let file: CatalogFile =
            serde_json::from_slice(&bytes).map_err(|err| Error::parse(path, err))?;

        let total = file.card_array.len();
        let catalog = Self::from_cards(file.card_array);
        log::info!(
            "Loaded {} cards ({} with a multiverse id) from {:?}",
            total,
            catalog.len(),
            path
        );
        Ok(catalog)
    }

    /// Indexes `cards` by key. Cards without a multiverse id are dropped;
    /// on duplicate keys the last card wins.
    pub fn from_cards(cards: impl IntoIterator<Item = CardRecord>) -> Self {
        let mut indexed = BTreeMap::new();
        for card in cards {
            match card.key() {
                Some(key) => {
                    indexed.insert(key, card);
                }
                None => log::debug!("skipping card {:?} without multiverse id", card.name),
            }
        }
        Self { cards: indexed }
    }

    pub fn get(&self, key: &CardKey) -> Option<&CardRecord> {
        self.cards.get(key)
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }
}
