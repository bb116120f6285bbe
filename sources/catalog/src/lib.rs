//! Builds card metadata documents from a card catalog and the mapping of
//! already pinned card images.

mod catalog;

pub use catalog::{CardFace, CardRecord, Catalog};

use cardpin_core::{
    ContentUri, LookupError, PinLabel, PinPayload, ResultMapping, Source, SourceItem, Sourced,
};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// The metadata document pinned for one card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardMetadata {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub image: ContentUri,
}

impl CardMetadata {
    pub fn from_card(card: &CardRecord, image: ContentUri) -> Self {
        Self {
            name: card.name.clone(),
            description: card.description(),
            image,
        }
    }

    pub fn to_json(&self) -> Value {
        let mut doc = json!({
            "name": self.name,
            "image": self.image,
        });
        if let Some(description) = &self.description {
            doc["description"] = json!(description);
        }
        doc
    }
}

/// Enumerates one metadata document per pinned image, in image key order.
///
/// Images whose key has no card in the catalog are reported as lookup
/// failures instead of items.
#[derive(Debug, Clone)]
pub struct CatalogSource {
    catalog: Catalog,
    images: ResultMapping,
    label_prefix: String,
}

impl CatalogSource {
    pub fn new(catalog: Catalog, images: ResultMapping, label_prefix: impl Into<String>) -> Self {
        Self {
            catalog,
            images,
            label_prefix: label_prefix.into(),
        }
    }
}

impl Source for CatalogSource {
    fn enumerate(&self) -> cardpin_core::Result<Vec<Sourced>> {
        let items = self
            .images
            .iter()
            .map(|(key, image)| match self.catalog.get(key) {
                Some(card) => Ok(SourceItem {
                    key: key.clone(),
                    label: PinLabel::metadata(&self.label_prefix, key),
                    payload: PinPayload::Json(
                        CardMetadata::from_card(card, image.clone()).to_json(),
                    ),
                }),
                None => {
                    log::debug!("no catalog record for image {key}");
                    Err(LookupError { key: key.clone() })
                }
            })
            .collect();
        Ok(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cardpin_core::CardKey;

    fn card(id: u64, name: &str, text: Option<&str>) -> CardRecord {
        CardRecord {
            multiverse_ids: vec![id],
            name: name.to_owned(),
            oracle_text: text.map(str::to_owned),
            card_faces: Vec::new(),
        }
    }

    #[test]
    fn builds_documents_in_key_order() {
        let catalog = Catalog::from_cards([
            card(600, "Black Lotus", Some("{T}, Sacrifice Black Lotus: Add three mana of any one color.")),
            card(95, "Ancestral Recall", Some("Target player draws three cards.")),
        ]);
        let images: ResultMapping = [
            (CardKey::from(600), ContentUri::new("ipfs://QmLotus")),
            (CardKey::from(95), ContentUri::new("ipfs://QmRecall")),
            (CardKey::from(7), ContentUri::new("ipfs://QmOrphan")),
        ]
        .into_iter()
        .collect();

        let items = CatalogSource::new(catalog, images, "alpha")
            .enumerate()
            .unwrap();

        assert_eq!(items.len(), 3);
        assert_eq!(
            items[0],
            Err(LookupError {
                key: CardKey::from(7)
            })
        );

        let recall = items[1].as_ref().unwrap();
        assert_eq!(recall.key, CardKey::from(95));
        assert_eq!(recall.label.as_str(), "alpha_metadata_95");
        assert_eq!(
            recall.payload,
            PinPayload::Json(json!({
                "name": "Ancestral Recall",
                "description": "Target player draws three cards.",
                "image": "ipfs://QmRecall",
            }))
        );
        assert_eq!(items[2].as_ref().unwrap().key, CardKey::from(600));
    }

    #[test]
    fn description_is_omitted_without_text() {
        let doc = CardMetadata::from_card(
            &card(1, "Forest", None),
            ContentUri::new("ipfs://QmForest"),
        )
        .to_json();
        assert_eq!(doc, json!({ "name": "Forest", "image": "ipfs://QmForest" }));
    }
}
