use std::net::IpAddr;

use const_oid::AssociatedOid;
use der::{
    Decode, Encode,
    asn1::{Ia5String, OctetString},
    oid::ObjectIdentifier,
};
use x509_cert::ext::pkix::name::GeneralName;

use crate::error::PkiError;

/// Trait for converting typed extensions to and from raw X.509 values.
pub trait ToAndFromX509Extension {
    /// The Object Identifier (OID) for the extension.
    const OID: ObjectIdentifier;

    /// Encodes the extension into a DER-encoded byte vector.
    fn to_x509_extension_value(&self) -> Result<Vec<u8>, PkiError>;

    /// Decodes the extension from a DER-encoded byte slice.
    fn from_x509_extension_value(extension: &[u8]) -> Result<Self, PkiError>
    where
        Self: Sized;
}

/// Encode an ordered sequence of OIDs as a DER `SEQUENCE OF OBJECT
/// IDENTIFIER`.
///
/// This is the payload format of the extended-key-usage extension and of the
/// custom critical extension the CSR flow attaches. A malformed component
/// surfaces as [`PkiError::EncodingError`] and aborts the run.
pub fn encode_oid_sequence(oids: &[ObjectIdentifier]) -> Result<Vec<u8>, PkiError> {
    oids.to_vec()
        .to_der()
        .map_err(|e| PkiError::EncodingError(e.to_string()))
}

/// Decode a DER `SEQUENCE OF OBJECT IDENTIFIER`.
pub fn decode_oid_sequence(der_bytes: &[u8]) -> Result<Vec<ObjectIdentifier>, PkiError> {
    Vec::<ObjectIdentifier>::from_der(der_bytes)
        .map_err(|e| PkiError::DecodingError(e.to_string()))
}

/// One entry of the Subject Alternative Name extension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SanEntry {
    Dns(String),
    Ip(IpAddr),
    Email(String),
}

/// The Subject Alternative Name (SAN) extension.
///
/// Carries the leaf identities of this bootstrap: the loopback addresses, a
/// per-role DNS name, and a per-role email address.
#[derive(Debug, Clone, Default)]
pub struct SubjectAltName {
    pub entries: Vec<SanEntry>,
}

impl SubjectAltName {
    fn entry_to_general_name(entry: &SanEntry) -> Result<GeneralName, PkiError> {
        match entry {
            SanEntry::Dns(name) => Ia5String::try_from(name.clone())
                .map(GeneralName::DnsName)
                .map_err(|e| PkiError::EncodingError(e.to_string())),
            SanEntry::Email(addr) => Ia5String::try_from(addr.clone())
                .map(GeneralName::Rfc822Name)
                .map_err(|e| PkiError::EncodingError(e.to_string())),
            SanEntry::Ip(addr) => {
                let octets = match addr {
                    IpAddr::V4(v4) => v4.octets().to_vec(),
                    IpAddr::V6(v6) => v6.octets().to_vec(),
                };
                OctetString::new(octets)
                    .map(GeneralName::IpAddress)
                    .map_err(|e| PkiError::EncodingError(e.to_string()))
            }
        }
    }

    fn general_name_to_entry(name: &GeneralName) -> Result<SanEntry, PkiError> {
        match name {
            GeneralName::DnsName(dns) => Ok(SanEntry::Dns(dns.to_string())),
            GeneralName::Rfc822Name(email) => Ok(SanEntry::Email(email.to_string())),
            GeneralName::IpAddress(octets) => match octets.as_bytes() {
                bytes if bytes.len() == 4 => {
                    let mut v4 = [0u8; 4];
                    v4.copy_from_slice(bytes);
                    Ok(SanEntry::Ip(IpAddr::from(v4)))
                }
                bytes if bytes.len() == 16 => {
                    let mut v6 = [0u8; 16];
                    v6.copy_from_slice(bytes);
                    Ok(SanEntry::Ip(IpAddr::from(v6)))
                }
                bytes => Err(PkiError::DecodingError(format!(
                    "IP address general name of length {}",
                    bytes.len()
                ))),
            },
            _ => Err(PkiError::DecodingError(
                "unsupported general name type".to_string(),
            )),
        }
    }
}

impl ToAndFromX509Extension for SubjectAltName {
    const OID: ObjectIdentifier = x509_cert::ext::pkix::SubjectAltName::OID;

    fn to_x509_extension_value(&self) -> Result<Vec<u8>, PkiError> {
        let san = x509_cert::ext::pkix::SubjectAltName(
            self.entries
                .iter()
                .map(Self::entry_to_general_name)
                .collect::<Result<Vec<_>, _>>()?,
        );
        san.to_der()
            .map_err(|e| PkiError::EncodingError(e.to_string()))
    }

    fn from_x509_extension_value(extension: &[u8]) -> Result<Self, PkiError> {
        let san = x509_cert::ext::pkix::SubjectAltName::from_der(extension)?;
        let entries = san
            .0
            .iter()
            .map(Self::general_name_to_entry)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { entries })
    }
}

/// The Basic Constraints extension: CA flag and optional path length.
#[derive(Debug, Clone, Default)]
pub struct BasicConstraints {
    pub is_ca: bool,
    pub max_path_length: Option<u32>,
}

impl ToAndFromX509Extension for BasicConstraints {
    const OID: ObjectIdentifier = x509_cert::ext::pkix::BasicConstraints::OID;

    fn to_x509_extension_value(&self) -> Result<Vec<u8>, PkiError> {
        let bc = x509_cert::ext::pkix::BasicConstraints {
            ca: self.is_ca,
            path_len_constraint: self.max_path_length.map(|v| v as u8),
        };
        bc.to_der()
            .map_err(|e| PkiError::EncodingError(e.to_string()))
    }

    fn from_x509_extension_value(der_bytes: &[u8]) -> Result<Self, PkiError> {
        let bc = x509_cert::ext::pkix::BasicConstraints::from_der(der_bytes)?;
        Ok(Self {
            is_ca: bc.ca,
            max_path_length: bc.path_len_constraint.map(|v| v as u32),
        })
    }
}

pub use der::flagset::FlagSet;
use x509_cert::ext::pkix::KeyUsage as X509KeyUsage;
pub use x509_cert::ext::pkix::KeyUsages;

/// The Key Usage extension: the purpose bit set of the certified key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyUsage(pub FlagSet<KeyUsages>);

impl ToAndFromX509Extension for KeyUsage {
    const OID: ObjectIdentifier = <X509KeyUsage as AssociatedOid>::OID;

    fn to_x509_extension_value(&self) -> Result<Vec<u8>, PkiError> {
        let ku = X509KeyUsage::from(self.0);
        ku.to_der()
            .map_err(|e| PkiError::EncodingError(e.to_string()))
    }

    fn from_x509_extension_value(extension: &[u8]) -> Result<Self, PkiError> {
        let ku = X509KeyUsage::from_der(extension)?;
        Ok(Self(ku.0))
    }
}

/// The Extended Key Usage extension.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtendedKeyUsage {
    pub usage: Vec<ExtendedKeyUsageOption>,
}

impl ToAndFromX509Extension for ExtendedKeyUsage {
    const OID: ObjectIdentifier = x509_cert::ext::pkix::ExtendedKeyUsage::OID;

    fn to_x509_extension_value(&self) -> Result<Vec<u8>, PkiError> {
        let oids: Vec<ObjectIdentifier> = self.usage.iter().map(|v| (*v).into()).collect();
        encode_oid_sequence(&oids)
    }

    fn from_x509_extension_value(extension: &[u8]) -> Result<Self, PkiError> {
        let usage = decode_oid_sequence(extension)?
            .iter()
            .map(|v| match *v {
                const_oid::db::rfc5912::ID_KP_SERVER_AUTH => Ok(ExtendedKeyUsageOption::ServerAuth),
                const_oid::db::rfc5912::ID_KP_CLIENT_AUTH => Ok(ExtendedKeyUsageOption::ClientAuth),
                const_oid::db::rfc5912::ID_KP_CODE_SIGNING => {
                    Ok(ExtendedKeyUsageOption::CodeSigning)
                }
                const_oid::db::rfc5912::ID_KP_TIME_STAMPING => {
                    Ok(ExtendedKeyUsageOption::TimeStamping)
                }
                _ => Err(PkiError::DecodingError(
                    "unsupported extended key usage option".to_string(),
                )),
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { usage })
    }
}

/// A purpose for the Extended Key Usage extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtendedKeyUsageOption {
    ServerAuth,
    ClientAuth,
    CodeSigning,
    TimeStamping,
}

impl From<ExtendedKeyUsageOption> for ObjectIdentifier {
    fn from(value: ExtendedKeyUsageOption) -> Self {
        match value {
            ExtendedKeyUsageOption::ServerAuth => const_oid::db::rfc5912::ID_KP_SERVER_AUTH,
            ExtendedKeyUsageOption::ClientAuth => const_oid::db::rfc5912::ID_KP_CLIENT_AUTH,
            ExtendedKeyUsageOption::CodeSigning => const_oid::db::rfc5912::ID_KP_CODE_SIGNING,
            ExtendedKeyUsageOption::TimeStamping => const_oid::db::rfc5912::ID_KP_TIME_STAMPING,
        }
    }
}

/// The Subject Key Identifier extension.
///
/// In this bootstrap the identifier is an opaque fixed tag, not a digest of
/// the public key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubjectKeyId {
    pub key_id: Vec<u8>,
}

impl ToAndFromX509Extension for SubjectKeyId {
    const OID: ObjectIdentifier = x509_cert::ext::pkix::SubjectKeyIdentifier::OID;

    fn to_x509_extension_value(&self) -> Result<Vec<u8>, PkiError> {
        let octets = OctetString::new(self.key_id.as_slice())
            .map_err(|e| PkiError::EncodingError(e.to_string()))?;
        let ski = x509_cert::ext::pkix::SubjectKeyIdentifier(octets);
        ski.to_der()
            .map_err(|e| PkiError::EncodingError(e.to_string()))
    }

    fn from_x509_extension_value(extension: &[u8]) -> Result<Self, PkiError> {
        let ski = x509_cert::ext::pkix::SubjectKeyIdentifier::from_der(extension)?;
        Ok(Self {
            key_id: ski.0.as_bytes().to_vec(),
        })
    }
}
