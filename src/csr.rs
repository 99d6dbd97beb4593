//! Certificate signing requests.
//!
//! A request is self-attested: the subject's own key signs the request body,
//! no CA is involved. Requested extensions travel in the PKCS#9
//! `extensionRequest` attribute, which is where this bootstrap places both
//! the email subject-alternative-name and its custom critical extension.

use const_oid::AssociatedOid;
use der::asn1::{BitString, OctetString, SetOfVec};
use der::{Decode, Encode};
use x509_cert::attr::Attribute;
use x509_cert::request::{CertReq, CertReqInfo, ExtensionReq, Version};

use crate::cert::SignatureAlgorithm;
use crate::cert::extensions::{SanEntry, SubjectAltName};
use crate::cert::params::{DistinguishedName, ExtensionParam};
use crate::error::PkiError;
use crate::key::KeyPair;
use crate::pem_utils::{CERTIFICATE_REQUEST_LABEL, der_to_pem, pem_to_der};

/// A signed certificate request.
#[derive(Debug, Clone)]
pub struct CertificateRequest {
    /// The inner representation of the request.
    pub inner: CertReq,
}

impl CertificateRequest {
    /// Builds and signs a request with the subject's own key.
    ///
    /// `emails` become rfc822 entries of a subject-alternative-name
    /// extension inside the extension-request attribute;
    /// `extra_extensions` are appended after it verbatim.
    pub fn new_self_attested(
        subject: &DistinguishedName,
        emails: &[String],
        extra_extensions: Vec<ExtensionParam>,
        key: &KeyPair,
    ) -> Result<Self, PkiError> {
        let mut requested: Vec<ExtensionParam> = Vec::new();

        if !emails.is_empty() {
            let san = SubjectAltName {
                entries: emails
                    .iter()
                    .map(|addr| SanEntry::Email(addr.clone()))
                    .collect(),
            };
            requested.push(ExtensionParam::from_extension(san, false)?);
        }
        requested.extend(extra_extensions);

        let extension_req = ExtensionReq(
            requested
                .iter()
                .map(|ext| {
                    Ok(x509_cert::ext::Extension {
                        extn_id: ext.oid,
                        critical: ext.critical,
                        extn_value: OctetString::new(ext.value.clone())
                            .map_err(|e| PkiError::EncodingError(e.to_string()))?,
                    })
                })
                .collect::<Result<Vec<_>, PkiError>>()?,
        );

        let attribute = Attribute::try_from(extension_req)
            .map_err(|e| PkiError::EncodingError(e.to_string()))?;
        let attributes = SetOfVec::try_from(vec![attribute])
            .map_err(|e| PkiError::EncodingError(e.to_string()))?;

        let info = CertReqInfo {
            version: Version::V1,
            subject: subject.as_x509_name()?,
            public_key: key.as_spki()?,
            attributes,
        };

        let info_der = info
            .to_der()
            .map_err(|e| PkiError::EncodingError(e.to_string()))?;
        let signature = key.sign_data(&info_der)?;

        let inner = CertReq {
            info,
            algorithm: SignatureAlgorithm::Sha256WithRsa.into(),
            signature: BitString::from_bytes(&signature)
                .map_err(|e| PkiError::EncodingError(e.to_string()))?,
        };

        Ok(Self { inner })
    }

    /// Encodes the request into DER format.
    pub fn to_der(&self) -> Result<Vec<u8>, PkiError> {
        self.inner
            .to_der()
            .map_err(|e| PkiError::EncodingError(e.to_string()))
    }

    /// Encodes the request into PEM format with the `CERTIFICATE REQUEST`
    /// label.
    pub fn to_pem(&self) -> Result<String, PkiError> {
        Ok(der_to_pem(&self.to_der()?, CERTIFICATE_REQUEST_LABEL))
    }

    /// Decodes a request from a PEM string, checking the block label.
    pub fn from_pem(pem_str: &str) -> Result<Self, PkiError> {
        Self::from_der(&pem_to_der(pem_str, CERTIFICATE_REQUEST_LABEL)?)
    }

    /// Decodes a request from DER bytes.
    pub fn from_der(der_bytes: &[u8]) -> Result<Self, PkiError> {
        let inner =
            CertReq::from_der(der_bytes).map_err(|e| PkiError::DecodingError(e.to_string()))?;
        Ok(Self { inner })
    }

    /// The subject distinguished name.
    pub fn subject(&self) -> DistinguishedName {
        DistinguishedName::from_x509_name(&self.inner.info.subject)
    }

    /// The extensions carried by the extension-request attribute.
    pub fn requested_extensions(&self) -> Result<Vec<ExtensionParam>, PkiError> {
        let mut requested = Vec::new();
        for attribute in self.inner.info.attributes.iter() {
            if attribute.oid != ExtensionReq::OID {
                continue;
            }
            for value in attribute.values.iter() {
                let extension_req = value
                    .decode_as::<ExtensionReq>()
                    .map_err(|e| PkiError::DecodingError(e.to_string()))?;
                requested.extend(extension_req.0.iter().map(|ext| ExtensionParam {
                    oid: ext.extn_id,
                    critical: ext.critical,
                    value: ext.extn_value.as_bytes().to_vec(),
                }));
            }
        }
        Ok(requested)
    }

    /// Verifies the self-attested signature against the embedded public key.
    pub fn verify_self_attested(&self) -> Result<(), PkiError> {
        let info_der = self
            .inner
            .info
            .to_der()
            .map_err(|e| PkiError::EncodingError(e.to_string()))?;
        let signature = self
            .inner
            .signature
            .as_bytes()
            .ok_or_else(|| PkiError::DecodingError("signature bit string has unused bits".into()))?;
        let public_key = crate::key::PublicKey::from_x509spki(&self.inner.info.public_key)?;
        public_key.verify(&info_der, signature)
    }
}
