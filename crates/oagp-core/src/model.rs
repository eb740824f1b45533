use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::FormError;

/// Which kind of code the remote service should generate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    #[default]
    Client,
    Server,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Client => "client",
            Mode::Server => "server",
        }
    }

    /// Capitalized label used on buttons and headings.
    pub fn title(&self) -> &'static str {
        match self {
            Mode::Client => "Client",
            Mode::Server => "Server",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "client" => Ok(Mode::Client),
            "server" => Ok(Mode::Server),
            other => Err(format!("unknown mode: {other}")),
        }
    }
}

/// Where the OpenAPI document is taken from on submit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpecSource {
    #[default]
    Url,
    File,
    Paste,
}

impl SpecSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            SpecSource::Url => "url",
            SpecSource::File => "file",
            SpecSource::Paste => "paste",
        }
    }
}

impl FromStr for SpecSource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "url" => Ok(SpecSource::Url),
            "file" => Ok(SpecSource::File),
            "paste" => Ok(SpecSource::Paste),
            other => Err(format!("unknown specification source: {other}")),
        }
    }
}

/// A picked file and its text contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFile {
    pub name: String,
    pub contents: String,
}

impl SelectedFile {
    pub fn new(name: impl Into<String>, contents: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            contents: contents.into(),
        }
    }

    /// Read a file from disk as the selected specification file.
    pub async fn read(path: &Path) -> Result<Self, FormError> {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| FormError::FileRead {
                name: name.clone(),
                reason: e.to_string(),
            })?;
        Self::from_bytes(name, bytes)
    }

    /// Take an uploaded file's raw contents. Anything that is not UTF-8 is
    /// rejected rather than decoded lossily.
    pub fn from_bytes(name: impl Into<String>, bytes: Vec<u8>) -> Result<Self, FormError> {
        let name = name.into();
        match String::from_utf8(bytes) {
            Ok(contents) => Ok(Self { name, contents }),
            Err(e) => Err(FormError::FileRead {
                reason: e.utf8_error().to_string(),
                name,
            }),
        }
    }
}

/// All three specification inputs. Only the one matching the active
/// [`SpecSource`] is used on submit; the others are kept as entered.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpecInputs {
    pub url: String,
    pub file: Option<SelectedFile>,
    pub paste: String,
}

/// Languages and frameworks the remote service can generate.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguageCatalog {
    pub client: Vec<String>,
    pub server: Vec<String>,
}

impl LanguageCatalog {
    pub fn new(client: Vec<String>, server: Vec<String>) -> Self {
        Self { client, server }
    }

    pub fn languages(&self, mode: Mode) -> &[String] {
        match mode {
            Mode::Client => &self.client,
            Mode::Server => &self.server,
        }
    }

    /// First entry of the list for `mode`, if any.
    pub fn default_language(&self, mode: Mode) -> Option<&str> {
        self.languages(mode).first().map(String::as_str)
    }

    pub fn contains(&self, mode: Mode, language: &str) -> bool {
        self.languages(mode).iter().any(|l| l == language)
    }

    pub fn is_empty(&self) -> bool {
        self.client.is_empty() && self.server.is_empty()
    }
}

/// A validated request ready to be sent to the generation service.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub mode: Mode,
    pub language: String,
    pub spec: serde_json::Value,
}

/// Response of a successful generation call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationResult {
    pub link: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationVariant {
    Info,
    Warning,
    Destructive,
}

/// A transient message shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub title: String,
    pub description: String,
    pub variant: NotificationVariant,
}

impl Notification {
    pub fn info(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            variant: NotificationVariant::Info,
        }
    }

    pub fn warning(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            variant: NotificationVariant::Warning,
        }
    }

    pub fn error(description: impl Into<String>) -> Self {
        Self {
            title: "Error".to_string(),
            description: description.into(),
            variant: NotificationVariant::Destructive,
        }
    }

    pub fn is_error(&self) -> bool {
        self.variant == NotificationVariant::Destructive
    }
}
