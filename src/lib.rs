//! # testpki - Throwaway PKI Bootstrap for TLS Testing
//!
//! testpki creates a minimal, single-run public-key infrastructure built
//! entirely with rustcrypto libraries: a self-signed root CA, one leaf
//! certificate per role (server-auth and client-auth), and an independent
//! certificate signing request carrying a custom critical extension.
//!
//! Every run is independent: each entity gets a freshly generated 4096-bit
//! RSA key pair, nothing is reloaded from disk, and re-running simply
//! overwrites the previous artifacts with new key material. There is no
//! revocation, no intermediate tier, and no CA state across runs; this is
//! deliberately a bootstrap tool for local TLS testing, not a CA.
//!
//! ## Running the whole bootstrap
//!
//! ```rust,no_run
//! use testpki::{flows, profile::BootstrapConfig, sink::DirSink};
//!
//! # fn main() -> Result<(), testpki::error::PkiError> {
//! let config = BootstrapConfig::default();
//! let sink = DirSink::new(".");
//!
//! // csr.pem, ca-cert.pem, ca-key.pem, server-cert.pem, server-key.pem,
//! // client-cert.pem, client-key.pem
//! flows::run(&config, &sink)?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Issuing a single leaf
//!
//! ```rust,no_run
//! use testpki::{
//!     cert::{Certificate, CertificateWithPrivateKey},
//!     key::KeyPair,
//!     profile::{BootstrapConfig, LeafRole},
//! };
//!
//! # fn main() -> Result<(), testpki::error::PkiError> {
//! let config = BootstrapConfig::default();
//!
//! // Self-signed root.
//! let ca_key = KeyPair::generate(config.rsa_bits)?;
//! let ca_cert = Certificate::new_self_signed(
//!     &config.ca_params(ca_key.public_key()),
//!     &ca_key,
//!     config.validity(),
//! )?;
//! let ca = CertificateWithPrivateKey {
//!     cert: ca_cert,
//!     key: ca_key,
//! };
//!
//! // Server leaf signed by the root.
//! use testpki::issuer::Issuer;
//! let leaf_key = KeyPair::generate(config.rsa_bits)?;
//! let leaf = ca.issue(
//!     &config.leaf_params(LeafRole::Server, leaf_key.public_key()),
//!     config.validity(),
//! )?;
//! println!("{}", leaf.to_pem()?);
//! # Ok(())
//! # }
//! ```
//!
//! ## Error Handling
//!
//! Every failure is terminal for the run and mapped to one
//! [`error::PkiError`] variant; key-generation and signing failures are
//! separate variants so a caller (or test) can tell which stage failed.
//! Unknown leaf roles are rejected at the string boundary, before any key
//! material exists:
//!
//! ```rust
//! use testpki::{error::PkiError, profile::LeafRole};
//!
//! let err = "peer".parse::<LeafRole>().unwrap_err();
//! assert!(matches!(err, PkiError::InvalidRoleError(_)));
//! ```
//!
//! ## Module Organization
//!
//! - [`key`]: RSA key-pair generation, signing, and PKCS#1 serialization
//! - [`cert`]: certificate templates, typed extensions, encoding/decoding
//! - [`csr`]: certificate signing requests with requested extensions
//! - [`issuer`]: the signing step shared by self-signing and leaf issuance
//! - [`profile`]: role definitions and the fixed bootstrap configuration
//! - [`flows`]: the three orchestrated pipelines
//! - [`sink`]: the persistence collaborator storing finished artifacts
//! - [`error`]: the error taxonomy
//! - [`tbs_certificate`]: low-level certificate body manipulation
//! - [`pem_utils`]: PEM containers and block labels

pub mod cert;
pub mod csr;
pub mod error;
pub mod flows;
pub mod issuer;
pub mod key;
pub mod pem_utils;
pub mod profile;
pub mod sink;
pub mod tbs_certificate;
