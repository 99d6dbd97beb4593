//! Persistence sink: where finished artifacts go.
//!
//! The construction logic never touches the filesystem itself; it hands each
//! named artifact to an [`ArtifactSink`] and propagates any write failure as
//! [`PkiError::IoError`].

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::PkiError;

/// Classes of stored artifacts. The class decides file permissions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    /// World-readable certificate.
    Certificate,
    /// World-readable certificate request.
    CertificateRequest,
    /// Owner-only private key.
    PrivateKey,
}

impl ArtifactKind {
    /// Unix permission bits for this class.
    #[cfg(unix)]
    pub fn mode(&self) -> u32 {
        match self {
            ArtifactKind::Certificate | ArtifactKind::CertificateRequest => 0o644,
            ArtifactKind::PrivateKey => 0o600,
        }
    }
}

/// Durable storage for named artifacts.
pub trait ArtifactSink {
    /// Create-or-truncate `name` with `bytes`, restricting access according
    /// to `kind`.
    fn store(&self, name: &str, kind: ArtifactKind, bytes: &[u8]) -> Result<(), PkiError>;
}

/// Filesystem sink writing artifacts into a single directory.
pub struct DirSink {
    dir: PathBuf,
}

impl DirSink {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }
}

impl ArtifactSink for DirSink {
    fn store(&self, name: &str, kind: ArtifactKind, bytes: &[u8]) -> Result<(), PkiError> {
        let path = self.dir.join(name);
        fs::write(&path, bytes)?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&path, fs::Permissions::from_mode(kind.mode()))?;
        }
        log::debug!("stored {} ({} bytes)", path.display(), bytes.len());
        Ok(())
    }
}
