//! PEM textual containers for the three artifact types.

use crate::error::PkiError;

/// Block label for certificates.
pub const CERTIFICATE_LABEL: &str = "CERTIFICATE";
/// Block label for certificate signing requests.
pub const CERTIFICATE_REQUEST_LABEL: &str = "CERTIFICATE REQUEST";
/// Block label for PKCS#1 private keys.
pub const RSA_PRIVATE_KEY_LABEL: &str = "RSA PRIVATE KEY";

/// Convert DER-encoded data into a PEM-encoded string with the provided label.
pub fn der_to_pem(der: &[u8], label: &str) -> String {
    let pem = pem::Pem::new(label, der);
    pem::encode_config(
        &pem,
        pem::EncodeConfig::new().set_line_ending(pem::LineEnding::LF),
    )
}

/// Convert a PEM-encoded string back to DER bytes, checking the block label.
pub fn pem_to_der(pem_str: &str, expected_label: &str) -> Result<Vec<u8>, PkiError> {
    let pem = pem::parse(pem_str).map_err(|e| PkiError::DecodingError(e.to_string()))?;
    if pem.tag() != expected_label {
        return Err(PkiError::DecodingError(format!(
            "expected a {expected_label} block, found {}",
            pem.tag()
        )));
    }
    Ok(pem.contents().to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_round_trip() {
        let der = vec![0x30, 0x03, 0x02, 0x01, 0x01];
        let pem = der_to_pem(&der, CERTIFICATE_LABEL);
        assert!(pem.starts_with("-----BEGIN CERTIFICATE-----"));
        assert_eq!(pem_to_der(&pem, CERTIFICATE_LABEL).unwrap(), der);
    }

    #[test]
    fn wrong_label_is_rejected() {
        let pem = der_to_pem(&[0x01], CERTIFICATE_LABEL);
        let err = pem_to_der(&pem, CERTIFICATE_REQUEST_LABEL).unwrap_err();
        assert!(matches!(err, PkiError::DecodingError(_)));
    }
}
