use bon::Builder;
use const_oid::ObjectIdentifier;
use der::Any;
use der::asn1::SetOfVec;
use time::Duration;
use time::OffsetDateTime;
use x509_cert::attr::AttributeTypeAndValue;
use x509_cert::name::{RdnSequence, RelativeDistinguishedName};

use super::extensions::ToAndFromX509Extension;
pub use crate::cert::extensions::ExtendedKeyUsage;
pub use crate::cert::extensions::ExtendedKeyUsageOption;
pub use crate::cert::extensions::KeyUsages;
use crate::cert::extensions::SanEntry;
use crate::error::PkiError;
use crate::key::PublicKey;
use der::flagset::FlagSet;

const OID_COUNTRY: ObjectIdentifier = ObjectIdentifier::new_unwrap("2.5.4.6");
const OID_LOCALITY: ObjectIdentifier = ObjectIdentifier::new_unwrap("2.5.4.7");
const OID_STATE: ObjectIdentifier = ObjectIdentifier::new_unwrap("2.5.4.8");
const OID_STREET: ObjectIdentifier = ObjectIdentifier::new_unwrap("2.5.4.9");
const OID_ORGANIZATION: ObjectIdentifier = ObjectIdentifier::new_unwrap("2.5.4.10");
const OID_POSTAL_CODE: ObjectIdentifier = ObjectIdentifier::new_unwrap("2.5.4.17");

/// Distinguished name used for both the CA and the leaves.
///
/// All fields are optional free text; absent fields produce no RDN. The same
/// identity record serves every certificate in this design, while the CSR
/// flow uses an organization-only subject.
#[derive(Clone, Debug, Builder, Default, PartialEq, Eq)]
pub struct DistinguishedName {
    pub organization: Option<String>,
    pub country: Option<String>,
    pub state: Option<String>,
    pub locality: Option<String>,
    pub street_address: Option<String>,
    pub postal_code: Option<String>,
}

impl DistinguishedName {
    /// Convert to an X.509 RDN sequence.
    ///
    /// RDNs are emitted in a fixed order (C, O, L, ST, STREET, postalCode)
    /// with UTF8String values, so two conversions of equal names are
    /// byte-identical. Self-signed certificates rely on this: issuer and
    /// subject must encode the same.
    pub fn as_x509_name(&self) -> Result<x509_cert::name::Name, PkiError> {
        let fields = [
            (OID_COUNTRY, &self.country),
            (OID_ORGANIZATION, &self.organization),
            (OID_LOCALITY, &self.locality),
            (OID_STATE, &self.state),
            (OID_STREET, &self.street_address),
            (OID_POSTAL_CODE, &self.postal_code),
        ];

        let mut rdns = Vec::new();
        for (oid, value) in fields {
            let Some(value) = value else { continue };
            let atv = AttributeTypeAndValue {
                oid,
                value: Any::encode_from(value)
                    .map_err(|e| PkiError::EncodingError(e.to_string()))?,
            };
            let set = SetOfVec::try_from(vec![atv])
                .map_err(|e| PkiError::EncodingError(e.to_string()))?;
            rdns.push(RelativeDistinguishedName(set));
        }
        Ok(RdnSequence(rdns))
    }

    /// Recover a `DistinguishedName` from a decoded certificate name.
    ///
    /// Attributes this crate does not emit are ignored.
    pub fn from_x509_name(x509dn: &x509_cert::name::Name) -> Self {
        let mut dn = DistinguishedName::default();
        for rdn in x509dn.0.iter() {
            for attr in rdn.0.iter() {
                let Ok(value) = attr.value.decode_as::<String>() else {
                    continue;
                };
                match attr.oid {
                    OID_COUNTRY => dn.country = Some(value),
                    OID_ORGANIZATION => dn.organization = Some(value),
                    OID_LOCALITY => dn.locality = Some(value),
                    OID_STATE => dn.state = Some(value),
                    OID_STREET => dn.street_address = Some(value),
                    OID_POSTAL_CODE => dn.postal_code = Some(value),
                    _ => {}
                }
            }
        }
        dn
    }
}

/// Certificate validity period (`notBefore` .. `notAfter`).
#[derive(Clone, Debug)]
pub struct Validity {
    pub not_before: OffsetDateTime,
    pub not_after: OffsetDateTime,
}

impl Validity {
    /// A validity period starting now for the given number of days.
    pub fn for_days(days: i64) -> Self {
        let now = OffsetDateTime::now_utc();
        Self {
            not_before: now,
            not_after: now + Duration::days(days),
        }
    }
}

/// Parameters for building an X.509 certificate: the unsigned template of
/// the bootstrap, assembled per entity and handed to an
/// [`Issuer`](crate::issuer::Issuer).
#[derive(Clone, Debug, Builder)]
pub struct CertificateParams {
    /// Serial number bytes, big-endian. Fixed per run by design; uniqueness
    /// across runs is not required for a throwaway PKI.
    #[builder(default = vec![1])]
    pub serial_number: Vec<u8>,
    pub subject: DistinguishedName,
    pub subject_public_key: PublicKey,
    /// Key-usage bits (empty set emits no extension).
    #[builder(default)]
    pub key_usages: FlagSet<KeyUsages>,
    /// Extended key usage purposes (empty list emits no extension).
    #[builder(default)]
    pub usages: Vec<ExtendedKeyUsageOption>,
    #[builder(default)]
    pub is_ca: bool,
    #[builder(default)]
    pub subject_alt_names: Vec<SanEntry>,
    /// Opaque subject-key-identifier tag. Not derived from the key in this
    /// design; the bootstrap uses a fixed byte tag.
    pub subject_key_id: Option<Vec<u8>>,
    /// Extra extensions appended verbatim after the assembled ones.
    #[builder(default)]
    pub extensions: Vec<ExtensionParam>,
}

/// A raw X.509 extension: OID, criticality, DER-encoded value.
#[derive(Clone, Debug)]
pub struct ExtensionParam {
    pub oid: ObjectIdentifier,
    pub critical: bool,
    /// DER-encoded extension value
    pub value: Vec<u8>,
}

impl ExtensionParam {
    /// Encode a typed extension into its raw form.
    ///
    /// Encoder failures surface as [`PkiError::EncodingError`]; an extension
    /// is never silently emitted with a truncated or empty value.
    pub fn from_extension<E: ToAndFromX509Extension>(
        extension: E,
        critical: bool,
    ) -> Result<Self, PkiError> {
        let value = extension.to_x509_extension_value()?;
        Ok(Self {
            oid: E::OID,
            critical,
            value,
        })
    }

    /// Decode the raw value back into a typed extension.
    pub fn to_extension<E: ToAndFromX509Extension>(&self) -> Result<E, PkiError> {
        E::from_x509_extension_value(&self.value)
    }
}
