//! Client TLS material assembly.
//!
//! Turns the configured [`Auth`] variant into a client identity the transport
//! can present during the TLS handshake. Branches are tried in a fixed order:
//! inline PEM, PEM files, inline PKCS12, PKCS12 file. Token auth and no auth
//! produce no identity.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use p12_keystore::KeyStore;
use rustls::pki_types::{
    CertificateDer, PrivateKeyDer, PrivatePkcs1KeyDer, PrivatePkcs8KeyDer, PrivateSec1KeyDer,
};
use rustls::sign::CertifiedKey;
use rustls_pemfile::{certs, private_key};
use tracing::debug;

use crate::config::{Auth, ClientConfig};
use crate::error::ConfigError;

/// TLS settings derived from a [`ClientConfig`].
#[derive(Debug, Clone)]
pub struct TlsMaterial {
    /// Client identity, when certificate authentication is configured.
    pub identity: Option<ClientIdentity>,
    /// Skip server certificate verification.
    pub insecure: bool,
}

impl TlsMaterial {
    /// Apply the material to a transport builder.
    pub(crate) fn apply(
        self,
        mut builder: reqwest::ClientBuilder,
    ) -> Result<reqwest::ClientBuilder, ConfigError> {
        if let Some(identity) = self.identity {
            let identity = reqwest::Identity::from_pem(&identity.to_pem())
                .map_err(|e| ConfigError::InvalidCertificate(e.to_string()))?;
            builder = builder.identity(identity);
        }
        Ok(builder.danger_accept_invalid_certs(self.insecure))
    }
}

/// A certificate chain and its private key, DER encoded.
#[derive(Clone)]
pub struct ClientIdentity {
    /// Leaf certificate first, then any intermediates.
    pub cert_chain: Vec<Vec<u8>>,
    /// PKCS#1, SEC1 or PKCS#8 private key.
    pub key: PrivateKey,
}

impl std::fmt::Debug for ClientIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientIdentity")
            .field("certificates", &self.cert_chain.len())
            .field("key", &"<redacted>")
            .finish()
    }
}

/// Private key bytes tagged with their encoding.
#[derive(Clone)]
pub enum PrivateKey {
    /// PKCS#1 RSA key.
    Pkcs1(Vec<u8>),
    /// SEC1 EC key.
    Sec1(Vec<u8>),
    /// PKCS#8 key.
    Pkcs8(Vec<u8>),
}

impl PrivateKey {
    fn pem_label(&self) -> &'static str {
        match self {
            Self::Pkcs1(_) => "RSA PRIVATE KEY",
            Self::Sec1(_) => "EC PRIVATE KEY",
            Self::Pkcs8(_) => "PRIVATE KEY",
        }
    }

    fn der(&self) -> &[u8] {
        match self {
            Self::Pkcs1(der) | Self::Sec1(der) | Self::Pkcs8(der) => der,
        }
    }

    fn to_rustls(&self) -> PrivateKeyDer<'static> {
        match self {
            Self::Pkcs1(der) => PrivatePkcs1KeyDer::from(der.clone()).into(),
            Self::Sec1(der) => PrivateSec1KeyDer::from(der.clone()).into(),
            Self::Pkcs8(der) => PrivatePkcs8KeyDer::from(der.clone()).into(),
        }
    }
}

impl ClientIdentity {
    /// Leaf certificate, DER encoded.
    pub fn leaf(&self) -> Option<&[u8]> {
        self.cert_chain.first().map(Vec::as_slice)
    }

    /// Check that the private key belongs to the leaf certificate.
    ///
    /// Keys whose public half cannot be derived are accepted.
    pub fn verify_key_pair(&self) -> Result<(), String> {
        let chain = self
            .cert_chain
            .iter()
            .map(|cert| CertificateDer::from(cert.clone()))
            .collect();
        CertifiedKey::from_der(
            chain,
            self.key.to_rustls(),
            &rustls::crypto::ring::default_provider(),
        )
        .map(|_| ())
        .map_err(|e| format!("private key does not match certificate: {}", e))
    }

    /// Re-encode as a single PEM document: certificates then key.
    pub fn to_pem(&self) -> Vec<u8> {
        let mut pem = String::new();
        for cert in &self.cert_chain {
            push_pem_block(&mut pem, "CERTIFICATE", cert);
        }
        push_pem_block(&mut pem, self.key.pem_label(), self.key.der());
        pem.into_bytes()
    }
}

fn push_pem_block(out: &mut String, label: &str, der: &[u8]) {
    let encoded = STANDARD.encode(der);
    out.push_str("-----BEGIN ");
    out.push_str(label);
    out.push_str("-----\n");
    for line in encoded.as_bytes().chunks(64) {
        // base64 output is ASCII
        out.push_str(std::str::from_utf8(line).unwrap_or_default());
        out.push('\n');
    }
    out.push_str("-----END ");
    out.push_str(label);
    out.push_str("-----\n");
}

/// Build TLS material from the client configuration.
///
/// Picks the first matching branch; exclusivity is the caller's concern.
pub fn build_tls_config(config: &ClientConfig) -> Result<TlsMaterial, ConfigError> {
    let identity = match &config.auth {
        Auth::Pem { cert, key } => Some(
            identity_from_pem(cert.as_bytes(), key.as_bytes())
                .map_err(ConfigError::InvalidCertificate)?,
        ),
        Auth::PemFiles {
            cert_path,
            key_path,
        } => Some(identity_from_pem_files(cert_path, key_path)?),
        Auth::Pkcs12 { bundle, password } => {
            let der = STANDARD
                .decode(bundle.trim())
                .map_err(|e| ConfigError::InvalidPkcs12(format!("invalid base64: {}", e)))?;
            Some(identity_from_pkcs12(&der, password)?)
        }
        Auth::Pkcs12File { path, password } => {
            let der = std::fs::read(path).map_err(|e| ConfigError::FileReadFailure {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?;
            Some(identity_from_pkcs12(&der, password)?)
        }
        Auth::Token { .. } | Auth::None => None,
    };

    debug!(
        auth = config.auth.kind(),
        client_certificate = identity.is_some(),
        insecure = config.insecure,
        "assembled TLS material"
    );

    Ok(TlsMaterial {
        identity,
        insecure: config.insecure,
    })
}

/// Parse an identity from PEM certificate and key bytes.
fn identity_from_pem(cert_pem: &[u8], key_pem: &[u8]) -> Result<ClientIdentity, String> {
    let cert_chain = parse_certs(&mut BufReader::new(cert_pem))?;
    let key = parse_private_key(&mut BufReader::new(key_pem))?;

    let identity = ClientIdentity { cert_chain, key };
    identity.verify_key_pair()?;
    Ok(identity)
}

/// Load an identity from PEM certificate and key files.
fn identity_from_pem_files(cert_path: &Path, key_path: &Path) -> Result<ClientIdentity, ConfigError> {
    let file_error = |path: &Path, reason: String| ConfigError::FileReadFailure {
        path: path.display().to_string(),
        reason,
    };

    let cert_file = File::open(cert_path).map_err(|e| file_error(cert_path, e.to_string()))?;
    let cert_chain =
        parse_certs(&mut BufReader::new(cert_file)).map_err(|e| file_error(cert_path, e))?;

    let key_file = File::open(key_path).map_err(|e| file_error(key_path, e.to_string()))?;
    let key = parse_private_key(&mut BufReader::new(key_file)).map_err(|e| file_error(key_path, e))?;

    let identity = ClientIdentity { cert_chain, key };
    identity
        .verify_key_pair()
        .map_err(|e| file_error(key_path, e))?;
    Ok(identity)
}

/// Decode a PKCS12 bundle into its leaf certificate chain and private key.
fn identity_from_pkcs12(der: &[u8], password: &str) -> Result<ClientIdentity, ConfigError> {
    let keystore = KeyStore::from_pkcs12(der, password)
        .map_err(|e| ConfigError::InvalidPkcs12(e.to_string()))?;

    let (alias, chain) = keystore
        .private_key_chain()
        .ok_or_else(|| ConfigError::InvalidPkcs12("no private key in bundle".to_string()))?;

    if chain.chain().is_empty() {
        return Err(ConfigError::InvalidPkcs12(format!(
            "no certificate for key '{}'",
            alias
        )));
    }

    let identity = ClientIdentity {
        cert_chain: chain.chain().iter().map(|c| c.as_der().to_vec()).collect(),
        key: PrivateKey::Pkcs8(chain.key().to_vec()),
    };
    identity.verify_key_pair().map_err(ConfigError::InvalidPkcs12)?;
    Ok(identity)
}

/// Parse certificates from a PEM reader.
fn parse_certs(reader: &mut dyn std::io::BufRead) -> Result<Vec<Vec<u8>>, String> {
    let chain = certs(reader)
        .map(|cert| cert.map(|c| c.as_ref().to_vec()))
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| format!("failed to parse certificates: {}", e))?;

    if chain.is_empty() {
        return Err("no certificate found".to_string());
    }
    Ok(chain)
}

/// Parse a private key from a PEM reader.
fn parse_private_key(reader: &mut dyn std::io::BufRead) -> Result<PrivateKey, String> {
    let key = private_key(reader)
        .map_err(|e| format!("failed to read private key: {}", e))?
        .ok_or_else(|| "no private key found".to_string())?;

    match key {
        PrivateKeyDer::Pkcs1(k) => Ok(PrivateKey::Pkcs1(k.secret_pkcs1_der().to_vec())),
        PrivateKeyDer::Sec1(k) => Ok(PrivateKey::Sec1(k.secret_sec1_der().to_vec())),
        PrivateKeyDer::Pkcs8(k) => Ok(PrivateKey::Pkcs8(k.secret_pkcs8_der().to_vec())),
        _ => Err("unsupported private key type".to_string()),
    }
}
