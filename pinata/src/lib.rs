mod client;
mod config;

pub use client::{PinataPinner, json_pin_body, parse_pin_response};
pub use config::{DEFAULT_API_URL, DEFAULT_TIMEOUT_SECS, PinataConfig};

use thiserror::Error;

#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    #[error("Got HTTP {0} with content '{1}'")]
    HttpFailWithBody(u16, String),

    #[error("response did not contain an IPFS hash")]
    MissingHash,

    #[error("API key and secret must not be empty")]
    MissingCredentials,

    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Reqwest(#[from] reqwest::Error),
    #[error(transparent)]
    SerdeJson(#[from] serde_json::Error),
    #[error(transparent)]
    HttpInvalidHeaderValue(#[from] reqwest::header::InvalidHeaderValue),
}
