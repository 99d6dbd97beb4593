pub mod extensions;
pub mod params;

use crate::error::PkiError;
pub type Result<T> = std::result::Result<T, PkiError>;
use const_oid::ObjectIdentifier;
use der::{Decode, Encode};
use params::{CertificateParams, DistinguishedName, ExtensionParam, Validity};
use x509_cert::certificate::CertificateInner;

use crate::issuer::Issuer;
use crate::key::{KeyPair, PublicKey};
use crate::pem_utils::{CERTIFICATE_LABEL, der_to_pem, pem_to_der};

/// Signature algorithms this bootstrap can apply.
///
/// The design fixes RSA signing keys, so there is a single member; the enum
/// keeps the OID mapping in one place.
#[derive(Debug, Clone)]
pub enum SignatureAlgorithm {
    /// SHA-256 with RSA encryption (PKCS#1 v1.5).
    Sha256WithRsa,
}

impl From<SignatureAlgorithm> for x509_cert::spki::AlgorithmIdentifierOwned {
    fn from(value: SignatureAlgorithm) -> Self {
        match value {
            SignatureAlgorithm::Sha256WithRsa => x509_cert::spki::AlgorithmIdentifierOwned {
                oid: const_oid::db::rfc5912::SHA_256_WITH_RSA_ENCRYPTION,
                parameters: None,
            },
        }
    }
}

/// A signed X.509 certificate.
#[derive(Debug, Clone)]
pub struct Certificate {
    /// The inner representation of the certificate.
    pub inner: CertificateInner,
}

impl Certificate {
    /// Encodes the certificate into DER format.
    pub fn to_der(&self) -> Result<Vec<u8>> {
        self.inner
            .to_der()
            .map_err(|e| PkiError::EncodingError(e.to_string()))
    }

    /// Encodes the certificate into PEM format with the `CERTIFICATE` label.
    pub fn to_pem(&self) -> Result<String> {
        Ok(der_to_pem(&self.to_der()?, CERTIFICATE_LABEL))
    }

    /// Decodes a certificate from DER bytes.
    pub fn from_der(der_bytes: &[u8]) -> Result<Self> {
        let inner = CertificateInner::from_der(der_bytes)
            .map_err(|e| PkiError::DecodingError(e.to_string()))?;
        Ok(Self { inner })
    }

    /// Decodes a certificate from a PEM string, checking the block label.
    pub fn from_pem(pem_str: &str) -> Result<Self> {
        Self::from_der(&pem_to_der(pem_str, CERTIFICATE_LABEL)?)
    }

    /// The subject distinguished name.
    pub fn subject(&self) -> DistinguishedName {
        DistinguishedName::from_x509_name(&self.inner.tbs_certificate.subject)
    }

    /// The issuer distinguished name.
    pub fn issuer(&self) -> DistinguishedName {
        DistinguishedName::from_x509_name(&self.inner.tbs_certificate.issuer)
    }

    /// The subject's public key.
    pub fn public_key(&self) -> Result<PublicKey> {
        PublicKey::from_x509spki(&self.inner.tbs_certificate.subject_public_key_info)
    }

    /// Looks up an extension by OID.
    pub fn extension(&self, oid: ObjectIdentifier) -> Option<ExtensionParam> {
        self.inner
            .tbs_certificate
            .extensions
            .as_ref()?
            .iter()
            .find(|ext| ext.extn_id == oid)
            .map(|ext| ExtensionParam {
                oid: ext.extn_id,
                critical: ext.critical,
                value: ext.extn_value.as_bytes().to_vec(),
            })
    }

    /// Verifies this certificate's signature against an issuer public key.
    ///
    /// For a self-signed root the issuer key is the certificate's own
    /// embedded key.
    pub fn verify_signed_by(&self, issuer_key: &PublicKey) -> Result<()> {
        let tbs_der = self
            .inner
            .tbs_certificate
            .to_der()
            .map_err(|e| PkiError::EncodingError(e.to_string()))?;
        let signature = self
            .inner
            .signature
            .as_bytes()
            .ok_or_else(|| PkiError::DecodingError("signature bit string has unused bits".into()))?;
        issuer_key.verify(&tbs_der, signature)
    }

    /// Creates a self-signed certificate: the issuer is the template's own
    /// subject and the signing key is the subject's own pair.
    pub fn new_self_signed(
        cert_params: &CertificateParams,
        key: &KeyPair,
        validity: Validity,
    ) -> Result<Self> {
        let self_issuer = SelfIssuer {
            name: cert_params.subject.clone(),
            key,
        };
        self_issuer.issue(cert_params, validity)
    }
}

// Helper issuer for the self-signed root: issuer name == subject name.
struct SelfIssuer<'a> {
    name: DistinguishedName,
    key: &'a KeyPair,
}

impl Issuer for SelfIssuer<'_> {
    fn issuer_name(&self) -> DistinguishedName {
        self.name.clone()
    }

    fn signing_key(&self) -> &KeyPair {
        self.key
    }
}

/// A certificate together with its private key, as produced by the CA
/// bootstrap. Implements [`Issuer`] so it can sign leaf certificates.
pub struct CertificateWithPrivateKey {
    pub cert: Certificate,
    pub key: KeyPair,
}

impl Issuer for CertificateWithPrivateKey {
    fn issuer_name(&self) -> DistinguishedName {
        // The issuer name of anything we sign is this certificate's subject.
        self.cert.subject()
    }

    fn signing_key(&self) -> &KeyPair {
        &self.key
    }
}
