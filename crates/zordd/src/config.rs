use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;
use zord_core::gallery::DEFAULT_MATCH_THRESHOLD;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8000";
const DEFAULT_DESCRIBE_MODEL: &str = "gemini-2.5-flash";
const DEFAULT_DESCRIBE_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("GOOGLE_API_KEY is not set; the description service needs a credential")]
    MissingApiKey,
    #[error("invalid ZORD_BIND_ADDR {0:?}: {1}")]
    InvalidBindAddr(String, std::net::AddrParseError),
}

/// Daemon configuration, loaded from environment variables.
#[derive(Clone)]
pub struct Config {
    /// Listen address for the WebSocket endpoint (default: 0.0.0.0:8000).
    pub bind_addr: SocketAddr,
    /// Directory of reference images for the identity gallery.
    pub known_faces_dir: PathBuf,
    /// Directory containing ONNX model files.
    pub model_dir: PathBuf,
    /// Euclidean distance threshold for a positive identity match.
    pub match_threshold: f32,
    /// Credential for the remote description service.
    pub api_key: String,
    /// Remote description model name.
    pub describe_model: String,
    /// Base URL of the description API.
    pub describe_endpoint: String,
    /// Upper bound on one remote description call.
    pub describe_timeout: Duration,
}

impl Config {
    /// Load configuration from the environment. Fails fast without an API key.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = lookup("GOOGLE_API_KEY")
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .ok_or(ConfigError::MissingApiKey)?;

        let bind = lookup("ZORD_BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr: SocketAddr = bind
            .parse()
            .map_err(|e| ConfigError::InvalidBindAddr(bind.clone(), e))?;

        let parsed = |key: &str| lookup(key).and_then(|v| v.parse::<f64>().ok());

        Ok(Self {
            bind_addr,
            known_faces_dir: lookup("ZORD_KNOWN_FACES_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("known_faces")),
            model_dir: lookup("ZORD_MODEL_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(zord_core::default_model_dir),
            match_threshold: parsed("ZORD_MATCH_THRESHOLD")
                .map(|v| v as f32)
                .unwrap_or(DEFAULT_MATCH_THRESHOLD),
            api_key,
            describe_model: lookup("ZORD_DESCRIBE_MODEL")
                .unwrap_or_else(|| DEFAULT_DESCRIBE_MODEL.to_string()),
            describe_endpoint: lookup("ZORD_DESCRIBE_ENDPOINT")
                .unwrap_or_else(|| DEFAULT_DESCRIBE_ENDPOINT.to_string()),
            describe_timeout: parsed("ZORD_DESCRIBE_TIMEOUT_SECS")
                .filter(|secs| *secs > 0.0)
                .map(Duration::from_secs_f64)
                .unwrap_or(Duration::from_secs(30)),
        })
    }

    /// Path to the SCRFD detection model.
    pub fn scrfd_model_path(&self) -> String {
        self.model_dir
            .join(zord_core::SCRFD_MODEL_FILE)
            .to_string_lossy()
            .into_owned()
    }

    /// Path to the ArcFace recognition model.
    pub fn arcface_model_path(&self) -> String {
        self.model_dir
            .join(zord_core::ARCFACE_MODEL_FILE)
            .to_string_lossy()
            .into_owned()
    }
}
