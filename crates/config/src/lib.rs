//! Configuration loading, validation, and management for dualchat.
//!
//! Loads configuration from `~/.dualchat/config.toml` (or an explicit path)
//! with environment variable overrides. Validates all settings at startup.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// The persona the retrieval session starts with.
pub const DEFAULT_RAG_PERSONA: &str = "You are a customer service agent from British Airways.
Always elaborate your answer with as much useful info as possible and present your response in an easy to read format, and provide links for the user to take action where applicable.

Always answer you don't know if you don't have the information to answer the question, and ask the user to contact British Airways instead.

If you're providing a url, always replace the domain with https://www.britishairways.com.
";

/// The root configuration structure.
///
/// Maps directly to `~/.dualchat/config.toml`.
#[derive(Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Shared API key (used when a service section has none)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Chat-completion service
    #[serde(default)]
    pub chat: ChatConfig,

    /// Embedding service
    #[serde(default)]
    pub embedding: EmbeddingConfig,

    /// Speech synthesis service
    #[serde(default)]
    pub speech: SpeechConfig,

    /// Persisted vector index
    #[serde(default)]
    pub knowledge_base: KnowledgeBaseConfig,

    /// HTTP gateway
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// Initial values of the sidebar widgets
    #[serde(default)]
    pub ui: UiConfig,

    /// Chat panels, left to right
    #[serde(default = "default_sessions")]
    pub sessions: Vec<SessionProfile>,
}

/// Redact a secret for Debug output.
fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("api_key", &redact(&self.api_key))
            .field("chat", &self.chat)
            .field("embedding", &self.embedding)
            .field("speech", &self.speech)
            .field("knowledge_base", &self.knowledge_base)
            .field("gateway", &self.gateway)
            .field("ui", &self.ui)
            .field("sessions", &self.sessions)
            .finish()
    }
}

/// Wire dialect of an OpenAI-style endpoint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApiFlavor {
    /// `{base}/chat/completions` with a bearer token
    #[default]
    Openai,
    /// `{endpoint}/openai/deployments/{model}/...?api-version=` with an `api-key` header
    Azure,
}

#[derive(Clone, Serialize, Deserialize)]
pub struct ChatConfig {
    #[serde(default)]
    pub flavor: ApiFlavor,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Model name, or deployment name for Azure
    #[serde(default = "default_chat_model")]
    pub model: String,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    #[serde(default = "default_api_version")]
    pub api_version: String,
}

fn default_chat_model() -> String {
    "gpt-4o".into()
}
fn default_temperature() -> f32 {
    0.7
}
fn default_max_tokens() -> u32 {
    1024
}
fn default_api_version() -> String {
    "2024-06-01".into()
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            flavor: ApiFlavor::default(),
            api_url: None,
            api_key: None,
            model: default_chat_model(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            api_version: default_api_version(),
        }
    }
}

impl std::fmt::Debug for ChatConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatConfig")
            .field("flavor", &self.flavor)
            .field("api_url", &self.api_url)
            .field("api_key", &redact(&self.api_key))
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("api_version", &self.api_version)
            .finish()
    }
}

#[derive(Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    #[serde(default)]
    pub flavor: ApiFlavor,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(default = "default_embedding_model")]
    pub model: String,

    #[serde(default = "default_api_version")]
    pub api_version: String,
}

fn default_embedding_model() -> String {
    "text-embedding-3-small".into()
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            flavor: ApiFlavor::default(),
            api_url: None,
            api_key: None,
            model: default_embedding_model(),
            api_version: default_api_version(),
        }
    }
}

impl std::fmt::Debug for EmbeddingConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmbeddingConfig")
            .field("flavor", &self.flavor)
            .field("api_url", &self.api_url)
            .field("api_key", &redact(&self.api_key))
            .field("model", &self.model)
            .field("api_version", &self.api_version)
            .finish()
    }
}

/// Which speech backend to use.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpeechBackend {
    /// OpenAI-compatible `/audio/speech`
    #[default]
    Openai,
    /// Azure Speech REST (SSML)
    Azure,
    /// Voice toggle has no effect
    None,
}

#[derive(Clone, Serialize, Deserialize)]
pub struct SpeechConfig {
    #[serde(default)]
    pub backend: SpeechBackend,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Azure region, e.g. `uksouth` (Azure backend only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,

    #[serde(default = "default_speech_model")]
    pub model: String,

    /// Voice name (`alloy` for OpenAI, `en-GB-SoniaNeural` for Azure)
    #[serde(default = "default_voice")]
    pub voice: String,

    #[serde(default = "default_audio_format")]
    pub format: String,
}

fn default_speech_model() -> String {
    "tts-1".into()
}
fn default_voice() -> String {
    "alloy".into()
}
fn default_audio_format() -> String {
    "mp3".into()
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            backend: SpeechBackend::default(),
            api_url: None,
            api_key: None,
            region: None,
            model: default_speech_model(),
            voice: default_voice(),
            format: default_audio_format(),
        }
    }
}

impl std::fmt::Debug for SpeechConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpeechConfig")
            .field("backend", &self.backend)
            .field("api_url", &self.api_url)
            .field("api_key", &redact(&self.api_key))
            .field("region", &self.region)
            .field("model", &self.model)
            .field("voice", &self.voice)
            .field("format", &self.format)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnowledgeBaseConfig {
    /// JSON-lines index file, loaded at startup
    #[serde(default = "default_index_path")]
    pub path: PathBuf,

    /// Documents retrieved per query
    #[serde(default = "default_k")]
    pub k: usize,

    /// Target chunk size in characters when ingesting
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
}

fn default_index_path() -> PathBuf {
    PathBuf::from("data/ba-chunks/index.jsonl")
}
fn default_k() -> usize {
    5
}
fn default_chunk_size() -> usize {
    512
}

impl Default for KnowledgeBaseConfig {
    fn default() -> Self {
        Self {
            path: default_index_path(),
            k: default_k(),
            chunk_size: default_chunk_size(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_host")]
    pub host: String,
}

fn default_port() -> u16 {
    8501
}
fn default_host() -> String {
    "127.0.0.1".into()
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            host: default_host(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UiConfig {
    /// Initial state of the text-to-speech toggle
    #[serde(default)]
    pub voice_on: bool,

    /// Send prior turns of a panel to its model
    #[serde(default)]
    pub include_history: bool,
}

/// Which agent a panel is bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentKind {
    Basic,
    VectorRag,
}

/// One chat panel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionProfile {
    /// Stable identifier used by the browser
    pub id: String,

    /// Panel header
    pub title: String,

    pub agent: AgentKind,

    /// Initial state of the panel's toggle
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Initial persona; panels with a persona get an editable text area
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub persona: Option<String>,

    /// Metadata key holding the citation url
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_key: Option<String>,
}

fn default_true() -> bool {
    true
}

fn default_sessions() -> Vec<SessionProfile> {
    vec![
        SessionProfile {
            id: "gpt".into(),
            title: "GPT-4o".into(),
            agent: AgentKind::Basic,
            enabled: true,
            persona: None,
            source_key: None,
        },
        SessionProfile {
            id: "rag".into(),
            title: "RAG".into(),
            agent: AgentKind::VectorRag,
            enabled: true,
            persona: Some(DEFAULT_RAG_PERSONA.into()),
            source_key: Some("url".into()),
        },
    ]
}

impl AppConfig {
    /// Load configuration from the default path (~/.dualchat/config.toml).
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_with_env(&Self::config_dir().join("config.toml"))
    }

    /// Load from `path` and apply environment overrides:
    /// - `DUALCHAT_API_KEY`, then `AZURE_OPENAI_API_KEY`, then `OPENAI_API_KEY`
    /// - `DUALCHAT_API_URL` / `AZURE_OPENAI_ENDPOINT` for chat and embedding endpoints
    /// - `DUALCHAT_MODEL` for the chat model
    /// - `AZURE_SPEECH_KEY` / `AZURE_SPEECH_REGION` for the Azure speech backend
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load_from(path)?;
        config.apply_env(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    fn apply_env(&mut self, var: impl Fn(&str) -> Option<String>) {
        if self.api_key.is_none() {
            self.api_key = var("DUALCHAT_API_KEY")
                .or_else(|| var("AZURE_OPENAI_API_KEY"))
                .or_else(|| var("OPENAI_API_KEY"));
        }

        if let Some(url) = var("DUALCHAT_API_URL").or_else(|| var("AZURE_OPENAI_ENDPOINT")) {
            self.chat.api_url.get_or_insert_with(|| url.clone());
            self.embedding.api_url.get_or_insert(url);
        }

        if let Some(model) = var("DUALCHAT_MODEL") {
            self.chat.model = model;
        }

        if self.speech.backend == SpeechBackend::Azure {
            if self.speech.api_key.is_none() {
                self.speech.api_key = var("AZURE_SPEECH_KEY");
            }
            if self.speech.region.is_none() {
                self.speech.region = var("AZURE_SPEECH_REGION");
            }
        }
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".dualchat")
    }

    /// Validate the configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=2.0).contains(&self.chat.temperature) {
            return Err(ConfigError::ValidationError(
                "chat.temperature must be between 0.0 and 2.0".into(),
            ));
        }

        if self.knowledge_base.k == 0 {
            return Err(ConfigError::ValidationError(
                "knowledge_base.k must be at least 1".into(),
            ));
        }

        if self.knowledge_base.chunk_size == 0 {
            return Err(ConfigError::ValidationError(
                "knowledge_base.chunk_size must be at least 1".into(),
            ));
        }

        if self.sessions.is_empty() {
            return Err(ConfigError::ValidationError(
                "at least one [[sessions]] entry is required".into(),
            ));
        }

        let mut seen = HashSet::new();
        for session in &self.sessions {
            if session.id.trim().is_empty() {
                return Err(ConfigError::ValidationError("session id must not be empty".into()));
            }
            if !seen.insert(session.id.as_str()) {
                return Err(ConfigError::ValidationError(format!(
                    "duplicate session id '{}'",
                    session.id
                )));
            }
        }

        Ok(())
    }

    /// API key for a service: its own key, else the shared one.
    pub fn key_for(&self, specific: &Option<String>) -> String {
        specific
            .clone()
            .or_else(|| self.api_key.clone())
            .unwrap_or_default()
    }

    /// Whether any session needs the knowledge base.
    pub fn needs_knowledge_base(&self) -> bool {
        self.sessions.iter().any(|s| s.agent == AgentKind::VectorRag)
    }

    /// Generate a default config TOML string (for the `init` command).
    pub fn default_toml() -> String {
        let config = Self::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            chat: ChatConfig::default(),
            embedding: EmbeddingConfig::default(),
            speech: SpeechConfig::default(),
            knowledge_base: KnowledgeBaseConfig::default(),
            gateway: GatewayConfig::default(),
            ui: UiConfig::default(),
            sessions: default_sessions(),
        }
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}
