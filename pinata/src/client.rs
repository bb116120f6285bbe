use std::{path::Path, time::Duration};

use bytes::Bytes;
use cardpin_core::{ContentHash, PinLabel, Pinner};
use reqwest::{
    Body, RequestBuilder, Response,
    header::{HeaderMap, HeaderValue},
    multipart::{Form, Part},
};
use serde::Deserialize;
use serde_json::{Value, json};
use tokio_util::io::ReaderStream;

use crate::{Error, PinataConfig};

/// CID version requested for every pin. Version 0 yields the `Qm…` hashes
/// the existing mappings contain.
const CID_VERSION: u8 = 0;

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct PinResponse {
    #[serde(default)]
    ipfs_hash: String,
}

#[derive(Deserialize)]
struct AuthResponse {
    #[serde(default)]
    message: String,
}

/// `Pinner` backed by the Pinata pinning API.
#[derive(Debug, Clone)]
pub struct PinataPinner {
    pin_file_url: String,
    pin_json_url: String,
    test_authentication_url: String,
    auth_headers: HeaderMap,
    /// `None` leaves requests without a deadline.
    timeout: Option<Duration>,
    http_client: reqwest::Client,
}

impl PinataPinner {
    pub fn create(config: PinataConfig) -> Result<Self, Error> {
        Self::with_client(config, reqwest::Client::new())
    }

    /// Like `create`, but sends requests through `http_client`.
    pub fn with_client(config: PinataConfig, http_client: reqwest::Client) -> Result<Self, Error> {
        if config.api_key.is_empty() || config.api_secret.is_empty() {
            return Err(Error::MissingCredentials);
        }

        let mut auth_headers = HeaderMap::new();
        auth_headers.insert("pinata_api_key", HeaderValue::from_str(&config.api_key)?);
        let mut secret = HeaderValue::from_str(&config.api_secret)?;
        secret.set_sensitive(true);
        auth_headers.insert("pinata_secret_api_key", secret);

        let api_url = config.api_url.trim_end_matches('/');
        Ok(Self {
            pin_file_url: format!("{api_url}/pinning/pinFileToIPFS"),
            pin_json_url: format!("{api_url}/pinning/pinJSONToIPFS"),
            test_authentication_url: format!("{api_url}/data/testAuthentication"),
            auth_headers,
            timeout: (config.timeout_secs > 0).then(|| Duration::from_secs(config.timeout_secs)),
            http_client,
        })
    }

    /// Checks the credentials against the API and returns its greeting.
    pub async fn test_authentication(&self) -> Result<String, Error> {
        let res = self
            .http_client
            .get(&self.test_authentication_url)
            .authenticated(self)
            .send()
            .await?;
        let body = success_body(res).await?;
        let auth: AuthResponse = serde_json::from_slice(&body)?;
        Ok(auth.message)
    }
}

#[async_trait::async_trait]
impl Pinner for PinataPinner {
    async fn pin_file(&self, path: &Path, label: &PinLabel) -> anyhow::Result<ContentHash> {
        let file = tokio::fs::File::open(path).await.map_err(Error::from)?;
        let len = file.metadata().await.map_err(Error::from)?.len();
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| label.to_string());

        let part = Part::stream_with_length(Body::wrap_stream(ReaderStream::new(file)), len)
            .file_name(file_name)
            .mime_str("application/octet-stream")?;
        let form = Form::new()
            .part("file", part)
            .text("pinataMetadata", pin_metadata(label).to_string())
            .text("pinataOptions", pin_options().to_string());

        log::debug!("pinning file {:?} as {label}", path);
        let res = self
            .http_client
            .post(&self.pin_file_url)
            .multipart(form)
            .authenticated(self)
            .send()
            .await
            .map_err(Error::from)?;

        Ok(parse_pin_response(&success_body(res).await?)?)
    }

    async fn pin_json(&self, document: &Value, label: &PinLabel) -> anyhow::Result<ContentHash> {
        log::debug!("pinning JSON document as {label}");
        let res = self
            .http_client
            .post(&self.pin_json_url)
            .json(&json_pin_body(document, label))
            .authenticated(self)
            .send()
            .await
            .map_err(Error::from)?;

        Ok(parse_pin_response(&success_body(res).await?)?)
    }
}

trait Authenticated {
    fn authenticated(self, pinner: &PinataPinner) -> Self;
}

impl Authenticated for RequestBuilder {
    /// Adds the API key headers and, if configured, the request timeout.
    fn authenticated(self, pinner: &PinataPinner) -> Self {
        let builder = self.headers(pinner.auth_headers.clone());
        match pinner.timeout {
            Some(timeout) => builder.timeout(timeout),
            None => builder,
        }
    }
}

fn pin_metadata(label: &PinLabel) -> Value {
    json!({ "name": label.as_str() })
}

fn pin_options() -> Value {
    json!({ "cidVersion": CID_VERSION })
}

/// Request body of a JSON pin.
pub fn json_pin_body(document: &Value, label: &PinLabel) -> Value {
    json!({
        "pinataContent": document,
        "pinataMetadata": pin_metadata(label),
        "pinataOptions": pin_options(),
    })
}

/// Extracts the content hash from a pin response.
pub fn parse_pin_response(body: &[u8]) -> Result<ContentHash, Error> {
    let response: PinResponse = serde_json::from_slice(body)?;
    if response.ipfs_hash.is_empty() {
        return Err(Error::MissingHash);
    }
    Ok(ContentHash::new(response.ipfs_hash))
}

async fn success_body(res: Response) -> Result<Bytes, Error> {
    let status = res.status();
    if !status.is_success() {
        let body = res.text().await.unwrap_or_default();
        return Err(Error::HttpFailWithBody(status.as_u16(), body));
    }
    Ok(res.bytes().await?)
}
