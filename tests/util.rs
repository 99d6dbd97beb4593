use testpki::cert::{Certificate, CertificateWithPrivateKey};
use testpki::key::KeyPair;
use testpki::profile::BootstrapConfig;

/// Bootstrap configuration with a smaller key size so tests stay fast.
pub fn test_config() -> BootstrapConfig {
    BootstrapConfig::builder().rsa_bits(2048).build()
}

pub fn generate_ca(config: &BootstrapConfig) -> CertificateWithPrivateKey {
    let key = KeyPair::generate(config.rsa_bits).unwrap();
    let cert = Certificate::new_self_signed(
        &config.ca_params(key.public_key()),
        &key,
        config.validity(),
    )
    .unwrap();
    CertificateWithPrivateKey { cert, key }
}
