mod util;

use testpki::cert::Certificate;
use testpki::cert::extensions::{
    BasicConstraints, ExtendedKeyUsage, ExtendedKeyUsageOption, KeyUsage, KeyUsages, SanEntry,
    SubjectAltName, SubjectKeyId, ToAndFromX509Extension, decode_oid_sequence,
};
use testpki::cert::params::Validity;
use testpki::csr::CertificateRequest;
use testpki::error::PkiError;
use testpki::issuer::Issuer;
use testpki::key::KeyPair;
use testpki::profile::{CSR_MARKER_OID, LeafRole};

#[test]
fn root_ca_is_self_signed() {
    let config = util::test_config();
    let ca = util::generate_ca(&config);

    assert_eq!(ca.cert.subject(), ca.cert.issuer());
    ca.cert
        .verify_signed_by(&ca.cert.public_key().unwrap())
        .unwrap();

    let bc: BasicConstraints = ca
        .cert
        .extension(BasicConstraints::OID)
        .unwrap()
        .to_extension()
        .unwrap();
    assert!(bc.is_ca);

    let ku: KeyUsage = ca
        .cert
        .extension(KeyUsage::OID)
        .unwrap()
        .to_extension()
        .unwrap();
    assert!(ku.0.contains(KeyUsages::DigitalSignature));
    assert!(ku.0.contains(KeyUsages::KeyCertSign));

    let eku: ExtendedKeyUsage = ca
        .cert
        .extension(ExtendedKeyUsage::OID)
        .unwrap()
        .to_extension()
        .unwrap();
    assert_eq!(eku.usage, vec![ExtendedKeyUsageOption::CodeSigning]);
}

#[test]
fn server_leaf_verifies_under_ca_only() {
    let config = util::test_config();
    let ca = util::generate_ca(&config);

    let leaf_key = KeyPair::generate(config.rsa_bits).unwrap();
    let leaf = ca
        .issue(
            &config.leaf_params(LeafRole::Server, leaf_key.public_key()),
            config.validity(),
        )
        .unwrap();

    assert_eq!(leaf.issuer(), ca.cert.subject());
    leaf.verify_signed_by(&ca.cert.public_key().unwrap()).unwrap();

    // An unrelated key must not verify the leaf.
    let unrelated = KeyPair::generate(config.rsa_bits).unwrap();
    assert!(leaf.verify_signed_by(&unrelated.public_key()).is_err());

    let eku: ExtendedKeyUsage = leaf
        .extension(ExtendedKeyUsage::OID)
        .unwrap()
        .to_extension()
        .unwrap();
    assert_eq!(eku.usage, vec![ExtendedKeyUsageOption::ServerAuth]);

    let san: SubjectAltName = leaf
        .extension(SubjectAltName::OID)
        .unwrap()
        .to_extension()
        .unwrap();
    assert!(san
        .entries
        .contains(&SanEntry::Dns("server.example.com".to_string())));
    assert!(san
        .entries
        .contains(&SanEntry::Email("server@example.com".to_string())));
    assert!(san
        .entries
        .contains(&SanEntry::Ip("127.0.0.1".parse().unwrap())));
    assert!(san.entries.contains(&SanEntry::Ip("::1".parse().unwrap())));

    let ski: SubjectKeyId = leaf
        .extension(SubjectKeyId::OID)
        .unwrap()
        .to_extension()
        .unwrap();
    assert_eq!(ski.key_id, vec![1, 2, 3, 4, 6]);

    // Leaves are not CAs: no basic-constraints extension is emitted.
    assert!(leaf.extension(BasicConstraints::OID).is_none());
    assert_eq!(
        leaf.inner.tbs_certificate.serial_number.as_bytes(),
        &[0x06, 0x7A]
    );
}

#[test]
fn client_leaf_carries_client_profile() {
    let config = util::test_config();
    let ca = util::generate_ca(&config);

    let leaf_key = KeyPair::generate(config.rsa_bits).unwrap();
    let leaf = ca
        .issue(
            &config.leaf_params(LeafRole::Client, leaf_key.public_key()),
            config.validity(),
        )
        .unwrap();

    leaf.verify_signed_by(&ca.cert.public_key().unwrap()).unwrap();

    let eku: ExtendedKeyUsage = leaf
        .extension(ExtendedKeyUsage::OID)
        .unwrap()
        .to_extension()
        .unwrap();
    assert_eq!(eku.usage, vec![ExtendedKeyUsageOption::ClientAuth]);

    let san: SubjectAltName = leaf
        .extension(SubjectAltName::OID)
        .unwrap()
        .to_extension()
        .unwrap();
    assert!(san
        .entries
        .contains(&SanEntry::Dns("client.example.com".to_string())));
}

#[test]
fn unknown_role_fails_before_key_generation() {
    let err = "gateway".parse::<LeafRole>().unwrap_err();
    assert!(matches!(err, PkiError::InvalidRoleError(ref s) if s == "gateway"));
}

#[test]
fn csr_carries_critical_marker_extension() {
    let config = util::test_config();
    let key = KeyPair::generate(config.rsa_bits).unwrap();
    let csr = CertificateRequest::new_self_attested(
        &config.csr_subject(),
        &[config.csr_email.clone()],
        vec![config.csr_marker_extension().unwrap()],
        &key,
    )
    .unwrap();

    csr.verify_self_attested().unwrap();
    assert_eq!(
        csr.subject().organization.as_deref(),
        Some("example.com")
    );

    let requested = csr.requested_extensions().unwrap();

    let marker = requested
        .iter()
        .find(|ext| ext.oid == ExtendedKeyUsage::OID)
        .expect("marker extension present");
    assert!(marker.critical);
    assert_eq!(
        decode_oid_sequence(&marker.value).unwrap(),
        vec![CSR_MARKER_OID]
    );

    let san = requested
        .iter()
        .find(|ext| ext.oid == SubjectAltName::OID)
        .expect("SAN extension present");
    let san: SubjectAltName = SubjectAltName::from_x509_extension_value(&san.value).unwrap();
    assert_eq!(
        san.entries,
        vec![SanEntry::Email("test@example.com".to_string())]
    );

    // PEM round-trip with the CERTIFICATE REQUEST label.
    let pem = csr.to_pem().unwrap();
    assert!(pem.starts_with("-----BEGIN CERTIFICATE REQUEST-----"));
    let decoded = CertificateRequest::from_pem(&pem).unwrap();
    assert_eq!(decoded.inner, csr.inner);
}

#[test]
fn certificate_pem_round_trip_is_structural_identity() {
    let config = util::test_config();
    let ca = util::generate_ca(&config);

    let pem = ca.cert.to_pem().unwrap();
    assert!(pem.starts_with("-----BEGIN CERTIFICATE-----"));
    let decoded = Certificate::from_pem(&pem).unwrap();
    assert_eq!(decoded.inner, ca.cert.inner);
}

#[test]
fn independent_runs_share_structure_but_not_keys() {
    let config = util::test_config();

    // Pin the validity window so both "runs" get identical timestamps.
    let not_before = time::OffsetDateTime::from_unix_timestamp(1_700_000_000).unwrap();
    let validity = Validity {
        not_before,
        not_after: not_before + time::Duration::days(config.validity_days),
    };

    let mut certs = Vec::new();
    for _ in 0..2 {
        let key = KeyPair::generate(config.rsa_bits).unwrap();
        let cert =
            Certificate::new_self_signed(&config.ca_params(key.public_key()), &key, validity.clone())
                .unwrap();
        certs.push(cert);
    }
    let (a, b) = (&certs[0], &certs[1]);

    assert_eq!(a.subject(), b.subject());
    assert_eq!(
        a.inner.tbs_certificate.serial_number,
        b.inner.tbs_certificate.serial_number
    );
    assert_eq!(a.inner.tbs_certificate.validity, b.inner.tbs_certificate.validity);
    assert_ne!(
        a.inner.tbs_certificate.subject_public_key_info,
        b.inner.tbs_certificate.subject_public_key_info
    );
    assert_ne!(a.inner.signature, b.inner.signature);
}
