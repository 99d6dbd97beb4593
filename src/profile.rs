//! Certificate profiles: the fixed templates this bootstrap issues.
//!
//! All constants of the tool (serial numbers, key size, validity window,
//! the subject-key-identifier tag, the distinguished-name fields) live in
//! [`BootstrapConfig`] so tests can vary them without touching signing
//! logic.

use std::fmt;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::str::FromStr;

use bon::Builder;
use const_oid::ObjectIdentifier;

use crate::cert::extensions::{
    ExtendedKeyUsage, ExtendedKeyUsageOption, KeyUsages, SanEntry, ToAndFromX509Extension,
    encode_oid_sequence,
};
use crate::cert::params::{CertificateParams, DistinguishedName, ExtensionParam, Validity};
use crate::error::PkiError;
use crate::key::PublicKey;

/// The OID carried inside the CSR's custom critical extension
/// (id-kp-timeStamping).
pub const CSR_MARKER_OID: ObjectIdentifier = const_oid::db::rfc5912::ID_KP_TIME_STAMPING;

/// The roles a leaf certificate can be issued for.
///
/// A closed set: role strings are checked at this boundary, before any key
/// generation, and everything past it matches exhaustively.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeafRole {
    Server,
    Client,
}

impl LeafRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            LeafRole::Server => "server",
            LeafRole::Client => "client",
        }
    }

    /// DNS name placed in the leaf's subject alternative names.
    pub fn dns_name(&self) -> String {
        format!("{}.example.com", self.as_str())
    }

    /// Email address placed in the leaf's subject alternative names.
    pub fn email(&self) -> String {
        format!("{}@example.com", self.as_str())
    }

    /// The extended-key-usage purpose for this role.
    pub fn usage(&self) -> ExtendedKeyUsageOption {
        match self {
            LeafRole::Server => ExtendedKeyUsageOption::ServerAuth,
            LeafRole::Client => ExtendedKeyUsageOption::ClientAuth,
        }
    }
}

impl fmt::Display for LeafRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LeafRole {
    type Err = PkiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "server" => Ok(LeafRole::Server),
            "client" => Ok(LeafRole::Client),
            other => Err(PkiError::InvalidRoleError(other.to_string())),
        }
    }
}

/// Configuration of the bootstrap run.
///
/// The defaults reproduce the historical constants of the tool; none of them
/// need to be unique across runs since every run is independent.
#[derive(Clone, Debug, Builder)]
pub struct BootstrapConfig {
    #[builder(default = "Company, INC.".to_string())]
    pub organization: String,
    #[builder(default = "US".to_string())]
    pub country: String,
    #[builder(default = "San Francisco".to_string())]
    pub locality: String,
    #[builder(default = "Golden Gate Bridge".to_string())]
    pub street_address: String,
    #[builder(default = "94016".to_string())]
    pub postal_code: String,
    /// Root CA serial number.
    #[builder(default = 2019)]
    pub ca_serial: u64,
    /// Serial number shared by both leaf certificates.
    #[builder(default = 1658)]
    pub leaf_serial: u64,
    /// RSA modulus size for every generated key.
    #[builder(default = 4096)]
    pub rsa_bits: usize,
    /// Validity window length, applied to the CA and to leaves.
    #[builder(default = 3650)]
    pub validity_days: i64,
    /// Opaque subject-key-identifier tag stamped on leaf certificates.
    #[builder(default = vec![1, 2, 3, 4, 6])]
    pub subject_key_id: Vec<u8>,
    /// Organization of the CSR flow's minimal subject.
    #[builder(default = "example.com".to_string())]
    pub csr_organization: String,
    /// Email address requested by the CSR flow.
    #[builder(default = "test@example.com".to_string())]
    pub csr_email: String,
}

impl Default for BootstrapConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl BootstrapConfig {
    /// The distinguished name shared by the CA and every leaf.
    pub fn subject(&self) -> DistinguishedName {
        DistinguishedName::builder()
            .organization(self.organization.clone())
            .country(self.country.clone())
            .locality(self.locality.clone())
            .street_address(self.street_address.clone())
            .postal_code(self.postal_code.clone())
            .build()
    }

    /// The organization-only subject of the CSR flow.
    pub fn csr_subject(&self) -> DistinguishedName {
        DistinguishedName::builder()
            .organization(self.csr_organization.clone())
            .build()
    }

    /// A fresh validity window starting now.
    pub fn validity(&self) -> Validity {
        Validity::for_days(self.validity_days)
    }

    /// The root CA template: CA flag set, digital-signature and cert-sign
    /// key usage, code-signing purpose.
    pub fn ca_params(&self, public_key: PublicKey) -> CertificateParams {
        CertificateParams::builder()
            .serial_number(serial_bytes(self.ca_serial))
            .subject(self.subject())
            .subject_public_key(public_key)
            .key_usages(KeyUsages::DigitalSignature | KeyUsages::KeyCertSign)
            .usages(vec![ExtendedKeyUsageOption::CodeSigning])
            .is_ca(true)
            .build()
    }

    /// A leaf template for the given role: loopback addresses plus the
    /// role's DNS name and email address, the role's auth purpose, and the
    /// fixed subject-key-identifier tag.
    pub fn leaf_params(&self, role: LeafRole, public_key: PublicKey) -> CertificateParams {
        CertificateParams::builder()
            .serial_number(serial_bytes(self.leaf_serial))
            .subject(self.subject())
            .subject_public_key(public_key)
            .key_usages(KeyUsages::DigitalSignature.into())
            .usages(vec![role.usage()])
            .subject_alt_names(vec![
                SanEntry::Ip(IpAddr::V4(Ipv4Addr::LOCALHOST)),
                SanEntry::Ip(IpAddr::V6(Ipv6Addr::LOCALHOST)),
                SanEntry::Dns(role.dns_name()),
                SanEntry::Email(role.email()),
            ])
            .subject_key_id(self.subject_key_id.clone())
            .build()
    }

    /// The custom critical extension the CSR flow requests: OID 2.5.29.37
    /// with a one-element OID sequence payload.
    pub fn csr_marker_extension(&self) -> Result<ExtensionParam, PkiError> {
        Ok(ExtensionParam {
            oid: ExtendedKeyUsage::OID,
            critical: true,
            value: encode_oid_sequence(&[CSR_MARKER_OID])?,
        })
    }
}

/// Big-endian serial bytes with leading zeros stripped (DER INTEGERs are
/// minimally encoded).
pub fn serial_bytes(serial: u64) -> Vec<u8> {
    let bytes = serial.to_be_bytes();
    let first = bytes.iter().position(|b| *b != 0).unwrap_or(7);
    bytes[first..].to_vec()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_strings_parse() {
        assert_eq!("server".parse::<LeafRole>().unwrap(), LeafRole::Server);
        assert_eq!("client".parse::<LeafRole>().unwrap(), LeafRole::Client);
    }

    #[test]
    fn unknown_role_is_rejected() {
        let err = "peer".parse::<LeafRole>().unwrap_err();
        assert!(matches!(err, PkiError::InvalidRoleError(ref s) if s == "peer"));
    }

    #[test]
    fn serial_bytes_are_minimal() {
        assert_eq!(serial_bytes(2019), vec![0x07, 0xE3]);
        assert_eq!(serial_bytes(1658), vec![0x06, 0x7A]);
        assert_eq!(serial_bytes(0), vec![0]);
        assert_eq!(serial_bytes(1), vec![1]);
    }

    #[test]
    fn csr_marker_extension_is_critical() {
        let ext = BootstrapConfig::default().csr_marker_extension().unwrap();
        assert!(ext.critical);
        assert_eq!(ext.oid.to_string(), "2.5.29.37");
    }
}
