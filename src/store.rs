//! Chat persistence: one JSON file per chat id under a chats directory.
//!
//! Each file holds a `{"content": [messages…]}` envelope and is fully
//! overwritten on save. Writes go through a temp file plus rename so a
//! crashed save never leaves a half-written chat behind.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::Context as _;
use serde::{Deserialize, Serialize};
use tokio::fs;
use tracing::debug;

use crate::models::ChatMessage;

/// On-disk envelope wrapping a chat's message list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRecord {
    pub content: Vec<ChatMessage>,
}

/// Validate a chat identifier as a single safe path segment.
///
/// Rejects empty ids, path separators, parent references, and leading
/// dots, so a caller-supplied id can never escape the chats directory.
pub fn validate_chat_id(id: &str) -> anyhow::Result<()> {
    if id.is_empty() {
        anyhow::bail!("chat id must not be empty");
    }
    if id.starts_with('.') {
        anyhow::bail!("chat id must not start with '.'");
    }
    if id
        .chars()
        .any(|c| c == '/' || c == '\\' || c == ':' || c.is_control())
    {
        anyhow::bail!("chat id contains path separators or control characters");
    }
    Ok(())
}

/// File-per-chat store rooted at a single directory.
#[derive(Debug, Clone)]
pub struct ChatStore {
    dir: PathBuf,
}

impl ChatStore {
    /// Create a store handle (does NOT touch the filesystem).
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// The directory chats live in.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Create the chats directory if it does not exist yet.
    pub async fn ensure_dir(&self) -> anyhow::Result<()> {
        fs::create_dir_all(&self.dir)
            .await
            .with_context(|| format!("create chats dir {}", self.dir.display()))
    }

    fn path_for(&self, id: &str) -> PathBuf {
        self.dir.join(format!("{id}.json"))
    }

    /// Write (or overwrite) the chat `id` with `messages`.
    ///
    /// Serialises the envelope to `<id>.json.tmp` and renames it into
    /// place, so concurrent or interrupted saves leave either the old
    /// or the new file, never a torn one.
    pub async fn save(&self, id: &str, messages: &[ChatMessage]) -> anyhow::Result<()> {
        validate_chat_id(id)?;
        self.ensure_dir().await?;

        let record = ChatRecord {
            content: messages.to_vec(),
        };
        let json = serde_json::to_string(&record).context("serialize chat record")?;

        let path = self.path_for(id);
        let tmp = self.dir.join(format!("{id}.json.tmp"));
        fs::write(&tmp, &json)
            .await
            .with_context(|| format!("write {}", tmp.display()))?;
        fs::rename(&tmp, &path)
            .await
            .with_context(|| format!("rename into {}", path.display()))?;

        debug!(path = %path.display(), messages = messages.len(), "chat saved");
        Ok(())
    }

    /// Load the chat `id`, or `None` when no such file exists.
    pub async fn load(&self, id: &str) -> anyhow::Result<Option<Vec<ChatMessage>>> {
        validate_chat_id(id)?;
        let path = self.path_for(id);

        let content = match fs::read_to_string(&path).await {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e).with_context(|| format!("read {}", path.display())),
        };

        let record: ChatRecord =
            serde_json::from_str(&content).with_context(|| format!("parse {}", path.display()))?;
        Ok(Some(record.content))
    }

    /// Enumerate every saved chat, keyed by file stem.
    ///
    /// Files that are not `.json`, fail to parse, or lack the envelope
    /// are skipped rather than failing the whole listing.
    pub async fn list(&self) -> anyhow::Result<BTreeMap<String, Vec<ChatMessage>>> {
        let mut chats = BTreeMap::new();

        let mut rd = match fs::read_dir(&self.dir).await {
            Ok(rd) => rd,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(chats),
            Err(e) => return Err(e).with_context(|| format!("read {}", self.dir.display())),
        };

        while let Some(entry) = rd.next_entry().await? {
            let path = entry.path();
            if path.extension().map(|e| e == "json").unwrap_or(false) {
                let id = path
                    .file_stem()
                    .map(|s| s.to_string_lossy().to_string())
                    .unwrap_or_default();
                let content = match fs::read_to_string(&path).await {
                    Ok(c) => c,
                    Err(_) => continue,
                };
                match serde_json::from_str::<ChatRecord>(&content) {
                    Ok(record) => {
                        chats.insert(id, record.content);
                    }
                    Err(e) => {
                        debug!(path = %path.display(), error = %e, "skipping malformed chat file");
                    }
                }
            }
        }

        Ok(chats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn msg(role: &str, content: &str) -> ChatMessage {
        ChatMessage::new(role, content)
    }

    fn store(dir: &TempDir) -> ChatStore {
        ChatStore::new(dir.path())
    }

    #[tokio::test]
    async fn save_then_load_round_trips() {
        let dir = TempDir::new().unwrap();
        let s = store(&dir);

        let messages = vec![msg("user", "hello"), msg("assistant", "hi there")];
        s.save("chat_1", &messages).await.unwrap();

        let loaded = s.load("chat_1").await.unwrap().unwrap();
        assert_eq!(loaded, messages);
    }

    #[tokio::test]
    async fn save_overwrites_whole_file() {
        let dir = TempDir::new().unwrap();
        let s = store(&dir);

        s.save("c", &[msg("user", "first")]).await.unwrap();
        s.save("c", &[msg("user", "second")]).await.unwrap();

        let loaded = s.load("c").await.unwrap().unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].content, "second");
    }

    #[tokio::test]
    async fn load_missing_returns_none() {
        let dir = TempDir::new().unwrap();
        let s = store(&dir);
        assert!(s.load("nope").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn list_skips_malformed_and_foreign_files() {
        let dir = TempDir::new().unwrap();
        let s = store(&dir);

        s.save("good", &[msg("user", "hi")]).await.unwrap();
        tokio::fs::write(dir.path().join("broken.json"), "{not json")
            .await
            .unwrap();
        tokio::fs::write(dir.path().join("no_envelope.json"), "[1,2,3]")
            .await
            .unwrap();
        tokio::fs::write(dir.path().join("notes.txt"), "ignore me")
            .await
            .unwrap();

        let chats = s.list().await.unwrap();
        assert_eq!(chats.len(), 1);
        assert!(chats.contains_key("good"));
    }

    #[tokio::test]
    async fn list_on_missing_dir_is_empty() {
        let dir = TempDir::new().unwrap();
        let s = ChatStore::new(dir.path().join("does-not-exist"));
        assert!(s.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn no_tmp_file_left_behind() {
        let dir = TempDir::new().unwrap();
        let s = store(&dir);
        s.save("c", &[msg("user", "x")]).await.unwrap();
        assert!(!dir.path().join("c.json.tmp").exists());
    }

    #[test]
    fn chat_id_validation() {
        assert!(validate_chat_id("chat_1700000000").is_ok());
        assert!(validate_chat_id("My Chat 2").is_ok());
        assert!(validate_chat_id("").is_err());
        assert!(validate_chat_id("../escape").is_err());
        assert!(validate_chat_id(".hidden").is_err());
        assert!(validate_chat_id("a/b").is_err());
        assert!(validate_chat_id("a\\b").is_err());
    }

    #[tokio::test]
    async fn traversal_ids_rejected_by_save_and_load() {
        let dir = TempDir::new().unwrap();
        let s = store(&dir);
        assert!(s.save("../evil", &[]).await.is_err());
        assert!(s.load("../evil").await.is_err());
    }
}
