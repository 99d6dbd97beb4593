use der::Encode;
use x509_cert::certificate::CertificateInner;

use crate::cert::Certificate;
use crate::cert::SignatureAlgorithm;
use crate::cert::extensions::{BasicConstraints, ExtendedKeyUsage, KeyUsage, SubjectAltName, SubjectKeyId};
use crate::cert::params::Validity;
use crate::cert::params::{CertificateParams, DistinguishedName, ExtensionParam};
use crate::error::PkiError;
use crate::key::KeyPair;
use crate::tbs_certificate::TbsCertificate;

/// An entity capable of signing certificates: the self-signing root during
/// bootstrap, or the CA when issuing leaves.
pub trait Issuer {
    /// The distinguished name recorded as the issuer of anything signed.
    fn issuer_name(&self) -> DistinguishedName;

    /// The private key used to sign.
    fn signing_key(&self) -> &KeyPair;

    /// Signs a certificate from the given template.
    ///
    /// Assembles the extension list from the template (basic constraints for
    /// CAs, key usage, extended key usage, subject alternative names,
    /// subject key identifier, then any extra extensions verbatim), encodes
    /// the TBS body, and signs it with SHA-256/RSA. Encoding and signing
    /// failures are distinct error variants and abort issuance.
    fn issue(
        &self,
        cert_params: &CertificateParams,
        validity: Validity,
    ) -> Result<Certificate, PkiError> {
        let mut extensions: Vec<ExtensionParam> = Vec::new();

        if cert_params.is_ca {
            let basic_constraints = BasicConstraints {
                is_ca: true,
                max_path_length: None,
            };
            extensions.push(ExtensionParam::from_extension(basic_constraints, true)?);
        }

        if !cert_params.key_usages.is_empty() {
            let key_usage = KeyUsage(cert_params.key_usages);
            extensions.push(ExtensionParam::from_extension(key_usage, true)?);
        }

        if !cert_params.usages.is_empty() {
            let extended_key_usage = ExtendedKeyUsage {
                usage: cert_params.usages.clone(),
            };
            extensions.push(ExtensionParam::from_extension(extended_key_usage, false)?);
        }

        if !cert_params.subject_alt_names.is_empty() {
            let san = SubjectAltName {
                entries: cert_params.subject_alt_names.clone(),
            };
            extensions.push(ExtensionParam::from_extension(san, false)?);
        }

        if let Some(key_id) = &cert_params.subject_key_id {
            let ski = SubjectKeyId {
                key_id: key_id.clone(),
            };
            extensions.push(ExtensionParam::from_extension(ski, false)?);
        }

        extensions.extend(cert_params.extensions.iter().cloned());

        let signature_algo = SignatureAlgorithm::Sha256WithRsa;
        let tbs_cert = TbsCertificate {
            serial_number: cert_params.serial_number.clone(),
            signature_algorithm: signature_algo.clone(),
            issuer: self.issuer_name(),
            not_before: validity.not_before,
            not_after: validity.not_after,
            subject: cert_params.subject.clone(),
            subject_public_key: cert_params.subject_public_key.clone(),
            extensions,
        };

        let tbs_cert_inner = tbs_cert.to_tbs_certificate_inner()?;
        let tbs_der = tbs_cert_inner
            .to_der()
            .map_err(|e| PkiError::EncodingError(e.to_string()))?;

        let signature = self.signing_key().sign_data(&tbs_der)?;

        let cert_inner = CertificateInner {
            tbs_certificate: tbs_cert_inner,
            signature_algorithm: signature_algo.into(),
            signature: der::asn1::BitString::from_bytes(&signature)
                .map_err(|e| PkiError::EncodingError(e.to_string()))?,
        };

        Ok(Certificate { inner: cert_inner })
    }
}
