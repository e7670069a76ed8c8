//! Username directory: maps account ids to usernames and back.
//!
//! The core only works with raw ids; this is where they become readable.

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use anyhow::{bail, Context, Result};
use neta_core::NodeId;
use serde::Deserialize;
use tracing::warn;

#[derive(Debug, Clone, Deserialize)]
pub struct User {
    pub id: NodeId,
    pub username: String,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Default)]
pub struct UserDirectory {
    by_id: HashMap<NodeId, User>,
    by_username: HashMap<String, NodeId>,
}

impl UserDirectory {
    pub fn from_users(users: impl IntoIterator<Item = User>) -> Self {
        let mut dir = Self::default();
        for user in users {
            dir.by_username.insert(user.username.to_lowercase(), user.id);
            dir.by_id.insert(user.id, user);
        }
        dir
    }

    /// Read a headered users CSV with at least `id` and `username`
    /// columns. Rows that fail to parse are skipped.
    pub fn read<R: Read>(reader: R) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut users = Vec::new();
        let mut skipped = 0usize;
        for row in reader.deserialize::<User>() {
            match row {
                Ok(user) => users.push(user),
                Err(_) => skipped += 1,
            }
        }
        if skipped > 0 {
            warn!(skipped, "user rows that failed to parse were skipped");
        }
        Ok(Self::from_users(users))
    }

    pub fn read_file(path: &Path) -> Result<Self> {
        let file = File::open(path).with_context(|| format!("cannot open users file {}", path.display()))?;
        Self::read(file).with_context(|| format!("cannot read users file {}", path.display()))
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }

    pub fn user(&self, id: NodeId) -> Option<&User> {
        self.by_id.get(&id)
    }

    pub fn username(&self, id: NodeId) -> Option<&str> {
        self.by_id.get(&id).map(|u| u.username.as_str())
    }

    /// Resolve a command-line node argument: a username (optionally with a
    /// leading `@`, case-insensitive) first, then a numeric id.
    pub fn resolve(&self, token: &str) -> Result<NodeId> {
        let handle = token.trim().trim_start_matches('@');
        if let Some(&id) = self.by_username.get(&handle.to_lowercase()) {
            return Ok(id);
        }
        match handle.parse::<NodeId>() {
            Ok(id) => Ok(id),
            Err(_) => bail!("unknown user '{}': not a known username or numeric id", token),
        }
    }

    pub fn resolve_all(&self, tokens: &[String]) -> Result<Vec<NodeId>> {
        tokens.iter().map(|t| self.resolve(t)).collect()
    }

    /// Username if known, otherwise the raw id.
    pub fn display(&self, id: NodeId) -> String {
        self.username(id)
            .map(str::to_string)
            .unwrap_or_else(|| id.to_string())
    }

    /// `username (id): value`, or `id (info not found): value`.
    pub fn describe(&self, id: NodeId, value: impl std::fmt::Display) -> String {
        match self.username(id) {
            Some(name) => format!("{} ({}): {}", name, id, value),
            None => format!("{} (info not found): {}", id, value),
        }
    }
}
