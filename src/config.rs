//! Configuration loaded from an optional `config.yaml`.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};

/// Top-level configuration.
///
/// Every field has a default so an absent config file means "all
/// defaults". The API credential is deliberately NOT part of the file;
/// it comes from the `OPENAI_API_KEY` environment variable only.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Address the HTTP server binds to.
    #[serde(default = "default_addr")]
    pub addr: SocketAddr,
    /// Model name sent to the completions API.
    #[serde(default = "default_model")]
    pub model: String,
    /// Directory chat files are stored in. Default: `<home>/chats`.
    #[serde(default)]
    pub chats_dir: Option<PathBuf>,
    /// Directory the chat page is served from.
    #[serde(default = "default_static_dir")]
    pub static_dir: PathBuf,
}

fn default_addr() -> SocketAddr {
    "127.0.0.1:3000".parse().expect("valid default addr")
}

fn default_model() -> String {
    "gpt-4".to_string()
}

fn default_static_dir() -> PathBuf {
    PathBuf::from("static")
}

impl Default for Config {
    fn default() -> Self {
        Self {
            addr: default_addr(),
            model: default_model(),
            chats_dir: None,
            static_dir: default_static_dir(),
        }
    }
}

impl Config {
    /// Load configuration from `path`, falling back to defaults when
    /// the file does not exist.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = match std::fs::read_to_string(path) {
            Ok(s) => s,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => return Err(e).with_context(|| format!("read {}", path.display())),
        };
        serde_yaml_ng::from_str(&raw).with_context(|| format!("parse {}", path.display()))
    }

    /// The chats directory, resolved against the app home when not set
    /// explicitly.
    pub fn chats_dir(&self) -> PathBuf {
        self.chats_dir
            .clone()
            .unwrap_or_else(|| crate::chatlet_home().join("chats"))
    }
}
