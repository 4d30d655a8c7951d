// # File State Store
//
// File-based implementation of StateStore.
//
// ## Purpose
//
// Keeps the last known IP across restarts, so a restart with an unchanged IP
// performs no DNS update.
//
// ## File Format
//
// A single IPv4 address, optionally followed by a newline:
//
// ```text
// 198.51.100.9
// ```
//
// ## Crash Safety
//
// - Atomic writes: new content goes to a `.tmp` sibling, then is renamed over the file
// - Unparseable content is treated as "unknown" (logged), never as an error

use async_trait::async_trait;
use std::net::Ipv4Addr;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::Error;
use crate::ipv4::parse_ipv4;
use crate::traits::state_store::StateStore;

/// File-based last-IP store
///
/// # Example
///
/// ```rust,no_run
/// use ddns_core::state::FileStateStore;
/// use ddns_core::traits::StateStore;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let store = FileStateStore::new("/var/lib/ddns/last_ip");
///     store.save_ip("1.2.3.4".parse()?).await?;
///     assert_eq!(store.get_last_ip().await?, Some("1.2.3.4".parse()?));
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct FileStateStore {
    path: PathBuf,
}

impl FileStateStore {
    /// Create a store backed by `path` (the file need not exist yet)
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Get path to temporary file for atomic writes
    fn temp_path(&self) -> PathBuf {
        let mut temp = self.path.clone();
        temp.set_extension("tmp");
        temp
    }
}

#[async_trait]
impl StateStore for FileStateStore {
    async fn get_last_ip(&self) -> Result<Option<Ipv4Addr>, Error> {
        if !self.path.exists() {
            tracing::debug!("Last IP file does not exist: {}", self.path.display());
            return Ok(None);
        }

        let content = fs::read_to_string(&self.path).await.map_err(|e| {
            Error::state_store(format!(
                "Failed to read last IP file {}: {}",
                self.path.display(),
                e
            ))
        })?;

        let content = content.trim();
        match parse_ipv4(content) {
            Some(ip) => Ok(Some(ip)),
            None => {
                tracing::warn!(
                    "Last IP file {} holds an invalid address '{}', treating as unknown",
                    self.path.display(),
                    content
                );
                Ok(None)
            }
        }
    }

    async fn save_ip(&self, ip: Ipv4Addr) -> Result<(), Error> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            fs::create_dir_all(parent).await.map_err(|e| {
                Error::state_store(format!(
                    "Failed to create state directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }

        let temp_path = self.temp_path();
        {
            let mut file = fs::File::create(&temp_path).await.map_err(|e| {
                Error::state_store(format!(
                    "Failed to create temp file {}: {}",
                    temp_path.display(),
                    e
                ))
            })?;

            file.write_all(format!("{ip}\n").as_bytes())
                .await
                .map_err(|e| {
                    Error::state_store(format!(
                        "Failed to write to temp file {}: {}",
                        temp_path.display(),
                        e
                    ))
                })?;

            file.flush().await.map_err(|e| {
                Error::state_store(format!(
                    "Failed to flush temp file {}: {}",
                    temp_path.display(),
                    e
                ))
            })?;
        }

        fs::rename(&temp_path, &self.path).await.map_err(|e| {
            Error::state_store(format!(
                "Failed to rename {} to {}: {}",
                temp_path.display(),
                self.path.display(),
                e
            ))
        })?;

        tracing::trace!("Last IP written to file: {}", self.path.display());
        Ok(())
    }
}
