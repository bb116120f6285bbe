//! Core cardpin types and traits.
//!
//! This crate defines what every cardpin crate shares:
//!
//! - Keys and content addresses (`CardKey`, `ContentHash`, `ContentUri`)
//! - The persisted result mapping and its on-disk store
//!   (`ResultMapping`, `DictionaryStore`)
//! - The pinning abstraction (`Pinner`, `PinOutcome`, `PinLabel`)
//! - Sources of items to pin (`Source`, `SourceItem`)
//! - The resumable, rate-limited batch driver (`BatchDriver`)
//!
//! Concrete pinning services and sources live in their own crates
//! (`cardpin_pinata`, `cardpin_source_local`, `cardpin_source_catalog`).

pub mod driver;
pub mod error;
pub mod hash;
pub mod key;
pub mod mapping;
pub mod pin;
pub mod source;

// Test utilities (behind feature flag)
#[cfg(any(test, feature = "testutil"))]
pub mod testutil;

pub use driver::{BatchDriver, BatchReport, DEFAULT_PIN_DELAY, DriverConfig, DriverState};
pub use error::{Error, Result};
pub use hash::{ContentHash, ContentUri};
pub use key::CardKey;
pub use mapping::{DictionaryStore, ResultMapping};
pub use pin::{DEFAULT_LABEL_PREFIX, PinLabel, PinOutcome, PinPayload, Pinner};
pub use source::{LookupError, Source, SourceItem, Sourced};
