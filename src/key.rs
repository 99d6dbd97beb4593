use pkcs8::LineEnding;
use rsa::pkcs1::{DecodeRsaPublicKey, EncodeRsaPrivateKey};
use rsa::pkcs1v15::{Signature, SigningKey, VerifyingKey};
use rsa::signature::{SignatureEncoding, Signer, Verifier};
use rsa::{RsaPrivateKey, RsaPublicKey};
use sha2::Sha256;
use x509_cert::spki::SubjectPublicKeyInfoOwned;

use crate::error::PkiError;

/// An RSA key pair owned by exactly one flow.
///
/// Every entity in the bootstrap (the CA, each leaf, the CSR subject) gets a
/// freshly generated pair; nothing is ever reloaded from disk.
pub struct KeyPair {
    private: Box<RsaPrivateKey>,
    public: RsaPublicKey,
}

impl KeyPair {
    /// Generate an RSA key pair with the specified number of bits.
    ///
    /// Failures here are [`PkiError::KeyGenerationError`], distinct from
    /// signing failures so callers can tell which stage gave up.
    pub fn generate(bits: usize) -> Result<Self, PkiError> {
        let mut rng = rand_core::OsRng;
        let private = RsaPrivateKey::new(&mut rng, bits)
            .map_err(|e| PkiError::KeyGenerationError(e.to_string()))?;
        let public = RsaPublicKey::from(&private);
        Ok(KeyPair {
            private: Box::new(private),
            public,
        })
    }

    /// The public half, detached from the signing material.
    pub fn public_key(&self) -> PublicKey {
        PublicKey(self.public.clone())
    }

    /// Sign `data` with PKCS#1 v1.5 over SHA-256.
    pub fn sign_data(&self, data: &[u8]) -> Result<Vec<u8>, PkiError> {
        let signing_key: SigningKey<Sha256> = SigningKey::new(*self.private.clone());
        let signature = signing_key
            .try_sign(data)
            .map_err(|e| PkiError::SigningError(e.to_string()))?;
        Ok(signature.to_vec())
    }

    /// SubjectPublicKeyInfo for embedding in a certificate or request.
    pub fn as_spki(&self) -> Result<SubjectPublicKeyInfoOwned, PkiError> {
        SubjectPublicKeyInfoOwned::from_key(self.public.clone())
            .map_err(|e| PkiError::EncodingError(e.to_string()))
    }

    /// Serialize the private half as a PKCS#1 `RSA PRIVATE KEY` PEM block.
    pub fn to_pkcs1_pem(&self) -> Result<String, PkiError> {
        let pem = self.private.to_pkcs1_pem(LineEnding::LF)?;
        Ok(pem.to_string())
    }
}

/// The public half of a [`KeyPair`], as carried by certificate templates and
/// used by verification.
#[derive(Debug, Clone)]
pub struct PublicKey(pub RsaPublicKey);

impl PublicKey {
    pub fn from_key_pair(key_pair: &KeyPair) -> Self {
        key_pair.public_key()
    }

    /// Recover the key from an SPKI embedded in a decoded certificate.
    pub fn from_x509spki(spki: &SubjectPublicKeyInfoOwned) -> Result<Self, PkiError> {
        let raw = spki
            .subject_public_key
            .as_bytes()
            .ok_or_else(|| PkiError::DecodingError("SPKI bit string has unused bits".into()))?;
        let public = RsaPublicKey::from_pkcs1_der(raw)
            .map_err(|e| PkiError::DecodingError(e.to_string()))?;
        Ok(PublicKey(public))
    }

    pub fn as_spki(&self) -> Result<SubjectPublicKeyInfoOwned, PkiError> {
        SubjectPublicKeyInfoOwned::from_key(self.0.clone())
            .map_err(|e| PkiError::EncodingError(e.to_string()))
    }

    /// Verify a PKCS#1 v1.5 / SHA-256 signature over `data`.
    pub fn verify(&self, data: &[u8], signature: &[u8]) -> Result<(), PkiError> {
        let verifying_key: VerifyingKey<Sha256> = VerifyingKey::new(self.0.clone());
        let signature = Signature::try_from(signature)
            .map_err(|e| PkiError::DecodingError(e.to_string()))?;
        verifying_key
            .verify(data, &signature)
            .map_err(|e| PkiError::SigningError(e.to_string()))
    }
}
