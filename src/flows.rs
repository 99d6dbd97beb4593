//! The three bootstrap flows.
//!
//! Each flow is a linear pipeline: build a template, generate a fresh key
//! pair, sign, encode to PEM, hand the artifacts to the sink. No state is
//! shared between flows except the CA bundle passed from
//! [`bootstrap_ca`] into [`issue_leaf`]. Every error short-circuits the run.

use log::info;

use crate::cert::params::CertificateParams;
use crate::cert::{Certificate, CertificateWithPrivateKey};
use crate::csr::CertificateRequest;
use crate::error::PkiError;
use crate::issuer::Issuer;
use crate::key::KeyPair;
use crate::profile::{BootstrapConfig, LeafRole};
use crate::sink::{ArtifactKind, ArtifactSink};

/// Builds, signs, and stores the certificate signing request.
///
/// The custom critical extension is encoded before any key is generated, so
/// an encoder failure aborts without burning entropy.
pub fn run_csr_flow(config: &BootstrapConfig, sink: &dyn ArtifactSink) -> Result<(), PkiError> {
    info!("building certificate signing request");
    let marker = config.csr_marker_extension()?;

    let key = KeyPair::generate(config.rsa_bits)?;
    let csr = CertificateRequest::new_self_attested(
        &config.csr_subject(),
        std::slice::from_ref(&config.csr_email),
        vec![marker],
        &key,
    )?;

    sink.store(
        "csr.pem",
        ArtifactKind::CertificateRequest,
        csr.to_pem()?.as_bytes(),
    )?;
    info!("stored certificate signing request");
    Ok(())
}

/// Creates the self-signed root CA and stores its certificate and key.
///
/// The returned bundle is the only state carried into leaf issuance; it is
/// never reloaded from the sink on a later run.
pub fn bootstrap_ca(
    config: &BootstrapConfig,
    sink: &dyn ArtifactSink,
) -> Result<CertificateWithPrivateKey, PkiError> {
    info!("generating {}-bit root CA key", config.rsa_bits);
    let key = KeyPair::generate(config.rsa_bits)?;

    let cert_params = config.ca_params(key.public_key());
    let cert = Certificate::new_self_signed(&cert_params, &key, config.validity())?;

    sink.store(
        "ca-cert.pem",
        ArtifactKind::Certificate,
        cert.to_pem()?.as_bytes(),
    )?;
    sink.store(
        "ca-key.pem",
        ArtifactKind::PrivateKey,
        key.to_pkcs1_pem()?.as_bytes(),
    )?;
    info!("stored root CA certificate and key");

    Ok(CertificateWithPrivateKey { cert, key })
}

/// Issues one leaf certificate for `role`, signed by the CA, and stores the
/// certificate and its fresh private key.
pub fn issue_leaf(
    config: &BootstrapConfig,
    ca: &CertificateWithPrivateKey,
    role: LeafRole,
    sink: &dyn ArtifactSink,
) -> Result<Certificate, PkiError> {
    info!("issuing {role} leaf certificate");
    let key = KeyPair::generate(config.rsa_bits)?;

    let cert_params: CertificateParams = config.leaf_params(role, key.public_key());
    let cert = ca.issue(&cert_params, config.validity())?;

    sink.store(
        &format!("{role}-cert.pem"),
        ArtifactKind::Certificate,
        cert.to_pem()?.as_bytes(),
    )?;
    sink.store(
        &format!("{role}-key.pem"),
        ArtifactKind::PrivateKey,
        key.to_pkcs1_pem()?.as_bytes(),
    )?;
    info!("stored {role} certificate and key");

    Ok(cert)
}

/// Runs the whole bootstrap: CSR flow, CA bootstrap, then one leaf per role.
///
/// Fail-fast: the first error ends the run, so a failure issuing the server
/// leaf leaves the client leaf unattempted. Callers wanting per-role
/// independence can invoke [`issue_leaf`] themselves.
pub fn run(config: &BootstrapConfig, sink: &dyn ArtifactSink) -> Result<(), PkiError> {
    run_csr_flow(config, sink)?;
    let ca = bootstrap_ca(config, sink)?;
    issue_leaf(config, &ca, LeafRole::Server, sink)?;
    issue_leaf(config, &ca, LeafRole::Client, sink)?;
    Ok(())
}
