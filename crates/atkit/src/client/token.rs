use async_trait::async_trait;
use atkit_common::session::{CredentialStore, CredentialStoreError, Credentials};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use std::path::{Path, PathBuf};

/// Bytes kept as-is in credential file names; everything else is escaped.
const FILE_NAME: &AsciiSet = &NON_ALPHANUMERIC.remove(b'.').remove(b'-');

/// File-backed credential store: one JSON file per DID inside a directory.
///
/// Writes go to a temporary file that is then renamed over the old one, so a
/// reader sees either the previous pair or the new one.
///
/// Example
/// ```no_run
/// use std::sync::Arc;
/// use atkit::client::{ClientOptions, FileCredentialStore, SessionManager};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let options = ClientOptions::default();
/// let store = FileCredentialStore::new("/tmp/atkit-credentials");
/// let agent = SessionManager::new(Arc::new(options.http_client()?), Arc::new(store), options)?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct FileCredentialStore {
    dir: PathBuf,
}

impl FileCredentialStore {
    /// Create a store rooted at `dir`. The directory is created on first write.
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    /// `{dir}/{did}.json` with the DID percent-encoded, so distinct DIDs
    /// never share a file.
    fn path_for(&self, did: &str) -> PathBuf {
        let name = utf8_percent_encode(did, FILE_NAME);
        self.dir.join(format!("{name}.json"))
    }
}

#[async_trait]
impl CredentialStore for FileCredentialStore {
    async fn get(&self, did: &str) -> Result<Option<Credentials>, CredentialStoreError> {
        let data = match tokio::fs::read(self.path_for(did)).await {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        Ok(Some(serde_json::from_slice(&data)?))
    }

    async fn set(&self, did: &str, credentials: Credentials) -> Result<(), CredentialStoreError> {
        let buf = serde_json::to_vec_pretty(&credentials)?;
        tokio::fs::create_dir_all(&self.dir).await?;
        let path = self.path_for(did);
        let tmp = path.with_extension("tmp");
        tokio::fs::write(&tmp, &buf).await?;
        tokio::fs::rename(&tmp, &path).await?;
        Ok(())
    }

    async fn del(&self, did: &str) -> Result<(), CredentialStoreError> {
        match tokio::fs::remove_file(self.path_for(did)).await {
            Ok(_) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(CredentialStoreError::from(e)),
        }
    }
}
