use der::Encode;
use der::asn1::OctetString;
use x509_cert::Version;
use x509_cert::certificate::TbsCertificateInner;
use x509_cert::serial_number::SerialNumber;

use crate::cert::SignatureAlgorithm;
use crate::cert::params::{DistinguishedName, ExtensionParam};
use crate::error::PkiError;
use crate::key::PublicKey;

/// The "To Be Signed" (TBS) portion of an X.509 certificate: everything the
/// issuer's signature covers.
pub struct TbsCertificate {
    /// Certificate serial number, big-endian bytes
    pub serial_number: Vec<u8>,
    /// Signature algorithm the issuer will apply
    pub signature_algorithm: SignatureAlgorithm,
    /// Issuer distinguished name
    pub issuer: DistinguishedName,
    /// Start of the validity window
    pub not_before: time::OffsetDateTime,
    /// End of the validity window
    pub not_after: time::OffsetDateTime,
    /// Subject distinguished name
    pub subject: DistinguishedName,
    /// Subject's public key
    pub subject_public_key: PublicKey,
    /// Certificate extensions
    pub extensions: Vec<ExtensionParam>,
}

impl TbsCertificate {
    /// Converts into x509-cert's `TbsCertificateInner` for DER encoding.
    pub fn to_tbs_certificate_inner(&self) -> Result<TbsCertificateInner, PkiError> {
        let algorithm_id: x509_cert::spki::AlgorithmIdentifierOwned =
            self.signature_algorithm.clone().into();

        let extensions = self
            .extensions
            .iter()
            .map(|ext| {
                Ok(x509_cert::ext::Extension {
                    extn_id: ext.oid,
                    critical: ext.critical,
                    extn_value: OctetString::new(ext.value.clone())
                        .map_err(|e| PkiError::EncodingError(e.to_string()))?,
                })
            })
            .collect::<Result<Vec<_>, PkiError>>()?;

        let not_before = x509_cert::time::Time::UtcTime(
            der::asn1::UtcTime::from_system_time(self.not_before.into())
                .map_err(|e| PkiError::EncodingError(e.to_string()))?,
        );
        let not_after = x509_cert::time::Time::UtcTime(
            der::asn1::UtcTime::from_system_time(self.not_after.into())
                .map_err(|e| PkiError::EncodingError(e.to_string()))?,
        );

        let validity = x509_cert::time::Validity {
            not_before,
            not_after,
        };

        let serial_number = SerialNumber::new(self.serial_number.as_slice())
            .map_err(|e| PkiError::EncodingError(e.to_string()))?;

        Ok(TbsCertificateInner {
            version: Version::V3,
            serial_number,
            signature: algorithm_id,
            issuer: self.issuer.as_x509_name()?,
            validity,
            subject: self.subject.as_x509_name()?,
            subject_public_key_info: self.subject_public_key.as_spki()?,
            issuer_unique_id: None,
            subject_unique_id: None,
            extensions: Some(extensions),
        })
    }

    /// Recovers a `TbsCertificate` from a decoded certificate body.
    pub fn from_tbs_certificate_inner(inner: TbsCertificateInner) -> Result<Self, PkiError> {
        let issuer = DistinguishedName::from_x509_name(&inner.issuer);
        let subject = DistinguishedName::from_x509_name(&inner.subject);
        let subject_public_key = PublicKey::from_x509spki(&inner.subject_public_key_info)?;

        let extensions = inner
            .extensions
            .unwrap_or_default()
            .iter()
            .map(|ext| ExtensionParam {
                oid: ext.extn_id,
                critical: ext.critical,
                value: ext.extn_value.as_bytes().to_vec(),
            })
            .collect::<Vec<_>>();

        let not_before = match inner.validity.not_before {
            x509_cert::time::Time::UtcTime(ut) => time::OffsetDateTime::from(ut.to_system_time()),
            x509_cert::time::Time::GeneralTime(gt) => {
                time::OffsetDateTime::from(gt.to_system_time())
            }
        };

        let not_after = match inner.validity.not_after {
            x509_cert::time::Time::UtcTime(ut) => time::OffsetDateTime::from(ut.to_system_time()),
            x509_cert::time::Time::GeneralTime(gt) => {
                time::OffsetDateTime::from(gt.to_system_time())
            }
        };

        let signature_algorithm = match inner.signature.oid {
            const_oid::db::rfc5912::SHA_256_WITH_RSA_ENCRYPTION => {
                SignatureAlgorithm::Sha256WithRsa
            }
            _ => {
                return Err(PkiError::DecodingError(
                    "unsupported signature algorithm".to_string(),
                ));
            }
        };

        Ok(Self {
            serial_number: inner.serial_number.as_bytes().into(),
            signature_algorithm,
            issuer,
            not_before,
            not_after,
            subject,
            subject_public_key,
            extensions,
        })
    }

    /// DER encoding of the TBS body, the exact bytes the signature covers.
    pub fn to_der(&self) -> Result<Vec<u8>, PkiError> {
        self.to_tbs_certificate_inner()?
            .to_der()
            .map_err(|e| PkiError::EncodingError(e.to_string()))
    }
}
