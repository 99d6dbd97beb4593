mod util;

use testpki::cert::Certificate;
use testpki::csr::CertificateRequest;
use testpki::error::PkiError;
use testpki::flows;
use testpki::key::KeyPair;
use testpki::pem_utils::{RSA_PRIVATE_KEY_LABEL, pem_to_der};
use testpki::profile::LeafRole;
use testpki::sink::{ArtifactKind, ArtifactSink, DirSink};

#[test]
fn end_to_end_bootstrap_produces_verifiable_artifacts() {
    let config = util::test_config();
    let dir = tempfile::tempdir().unwrap();
    let sink = DirSink::new(dir.path());

    flows::run(&config, &sink).unwrap();

    for name in [
        "csr.pem",
        "ca-cert.pem",
        "ca-key.pem",
        "server-cert.pem",
        "server-key.pem",
        "client-cert.pem",
        "client-key.pem",
    ] {
        assert!(dir.path().join(name).exists(), "missing artifact {name}");
    }

    let ca_cert =
        Certificate::from_pem(&std::fs::read_to_string(dir.path().join("ca-cert.pem")).unwrap())
            .unwrap();
    let server_cert = Certificate::from_pem(
        &std::fs::read_to_string(dir.path().join("server-cert.pem")).unwrap(),
    )
    .unwrap();

    // The server certificate chains to the stored CA and to nothing else.
    let ca_public = ca_cert.public_key().unwrap();
    server_cert.verify_signed_by(&ca_public).unwrap();
    let unrelated = KeyPair::generate(config.rsa_bits).unwrap();
    assert!(server_cert.verify_signed_by(&unrelated.public_key()).is_err());

    // The stored CSR parses and remains self-attested.
    let csr = CertificateRequest::from_pem(
        &std::fs::read_to_string(dir.path().join("csr.pem")).unwrap(),
    )
    .unwrap();
    csr.verify_self_attested().unwrap();

    // Private keys carry the PKCS#1 label.
    let key_pem = std::fs::read_to_string(dir.path().join("ca-key.pem")).unwrap();
    pem_to_der(&key_pem, RSA_PRIVATE_KEY_LABEL).unwrap();
}

#[cfg(unix)]
#[test]
fn private_keys_are_owner_only() {
    use std::os::unix::fs::PermissionsExt;

    let config = util::test_config();
    let dir = tempfile::tempdir().unwrap();
    let sink = DirSink::new(dir.path());

    let ca = util::generate_ca(&config);
    // Store through the sink the way the CA bootstrap does.
    sink.store(
        "ca-cert.pem",
        ArtifactKind::Certificate,
        ca.cert.to_pem().unwrap().as_bytes(),
    )
    .unwrap();
    sink.store(
        "ca-key.pem",
        ArtifactKind::PrivateKey,
        ca.key.to_pkcs1_pem().unwrap().as_bytes(),
    )
    .unwrap();

    let cert_mode = std::fs::metadata(dir.path().join("ca-cert.pem"))
        .unwrap()
        .permissions()
        .mode();
    let key_mode = std::fs::metadata(dir.path().join("ca-key.pem"))
        .unwrap()
        .permissions()
        .mode();
    assert_eq!(cert_mode & 0o777, 0o644);
    assert_eq!(key_mode & 0o777, 0o600);
}

#[test]
fn leaf_issuance_is_retryable_per_role() {
    let config = util::test_config();
    let dir = tempfile::tempdir().unwrap();
    let sink = DirSink::new(dir.path());

    let ca = util::generate_ca(&config);

    // Issuing one role does not depend on the other having run.
    flows::issue_leaf(&config, &ca, LeafRole::Client, &sink).unwrap();
    assert!(dir.path().join("client-cert.pem").exists());
    assert!(!dir.path().join("server-cert.pem").exists());

    flows::issue_leaf(&config, &ca, LeafRole::Server, &sink).unwrap();
    assert!(dir.path().join("server-cert.pem").exists());
}

struct FailingSink;

impl ArtifactSink for FailingSink {
    fn store(&self, _name: &str, _kind: ArtifactKind, _bytes: &[u8]) -> Result<(), PkiError> {
        Err(PkiError::IoError("no space left on device".to_string()))
    }
}

#[test]
fn sink_failure_surfaces_as_io_error() {
    let config = util::test_config();

    // The run halts at the first store and the failure keeps its identity:
    // an IoError, not a signing or encoding error.
    let err = flows::run(&config, &FailingSink).unwrap_err();
    assert!(matches!(err, PkiError::IoError(_)));
}
