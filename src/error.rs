use thiserror::Error;

/// Errors produced while bootstrapping the test PKI.
///
/// Every variant is terminal for the run: callers propagate with `?` and the
/// binary exits at the first failure. The taxonomy deliberately separates key
/// generation from signing so tests can assert on which stage failed.
#[derive(Debug, Error, Clone)]
pub enum PkiError {
    /// DER encoding of a template, extension, or OID payload failed.
    #[error("failed to encode data: {0}")]
    EncodingError(String),

    /// DER or PEM decoding of an existing artifact failed.
    #[error("failed to decode data: {0}")]
    DecodingError(String),

    /// A leaf role outside {"server", "client"} was requested.
    #[error("unknown leaf role: {0:?}")]
    InvalidRoleError(String),

    /// RSA key-pair generation failed (e.g. the entropy source).
    #[error("key generation failed: {0}")]
    KeyGenerationError(String),

    /// Signing the TBS body or the CSR info failed.
    #[error("signing failed: {0}")]
    SigningError(String),

    /// The persistence sink could not store an artifact.
    #[error("artifact write failed: {0}")]
    IoError(String),
}

impl From<der::Error> for PkiError {
    fn from(err: der::Error) -> Self {
        PkiError::DecodingError(err.to_string())
    }
}

impl From<rsa::Error> for PkiError {
    fn from(err: rsa::Error) -> Self {
        PkiError::SigningError(err.to_string())
    }
}

impl From<rsa::pkcs1::Error> for PkiError {
    fn from(err: rsa::pkcs1::Error) -> Self {
        PkiError::EncodingError(err.to_string())
    }
}

impl From<std::io::Error> for PkiError {
    fn from(err: std::io::Error) -> Self {
        PkiError::IoError(err.to_string())
    }
}
