pub const DEFAULT_API_URL: &str = "https://api.pinata.cloud";
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct PinataConfig {
    pub api_url: String,
    pub api_key: String,
    pub api_secret: String,
    /// Transport timeout for a single request, in seconds. `0` disables it.
    pub timeout_secs: u64,
}

impl Default for PinataConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_owned(),
            api_key: String::new(),
            api_secret: String::new(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}
