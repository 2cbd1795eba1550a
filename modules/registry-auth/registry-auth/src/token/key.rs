//! Token signing key.
//!
//! Keys are loaded once from PEM and every derived form (JWT encoding and
//! decoding keys, public JWK, key id) is computed up front, so issuance
//! never has to touch raw key material again.

use std::fmt;
use std::path::Path;

use base64::Engine as _;
use base64::engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD};
use data_encoding::BASE32;
use jsonwebtoken::jwk::{
    AlgorithmParameters, CommonParameters, EllipticCurve, EllipticCurveKeyParameters,
    EllipticCurveKeyType, Jwk, RSAKeyParameters, RSAKeyType,
};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header};
use p256::elliptic_curve::sec1::ToEncodedPoint;
use p256::pkcs8::{DecodePrivateKey as _, EncodePrivateKey as _, EncodePublicKey as _};
use registry_auth_sdk::RegistryAuthError;
use rsa::RsaPrivateKey;
use rsa::pkcs1::{DecodeRsaPrivateKey as _, EncodeRsaPrivateKey as _};
use rsa::pkcs8::PrivateKeyInfo;
use rsa::traits::PublicKeyParts;
use rustls_pki_types::pem::PemObject;
use rustls_pki_types::{CertificateDer, PrivateKeyDer};
use sha2::{Digest, Sha256};

const OID_RSA_ENCRYPTION: &str = "1.2.840.113549.1.1.1";
const OID_EC_PUBLIC_KEY: &str = "1.2.840.10045.2.1";
const OID_ED25519: &str = "1.3.101.112";
const OID_X25519: &str = "1.3.101.110";

/// A private key used to sign access and refresh tokens.
///
/// RSA keys sign with `RS256`, P-256 EC keys with `ES256`. Keys of other
/// types can be loaded, but every signing attempt fails with
/// [`RegistryAuthError::UnsupportedKeyType`].
#[derive(Clone)]
pub struct SigningKey {
    key_type: String,
    keys: Option<KeyPair>,
    cert_chain: Option<Vec<String>>,
}

#[derive(Clone)]
struct KeyPair {
    algorithm: Algorithm,
    encoding: EncodingKey,
    decoding: DecodingKey,
    jwk: Jwk,
}

impl SigningKey {
    /// Load a private key from PEM.
    ///
    /// Accepts PKCS#1 RSA keys, SEC1 EC keys and PKCS#8 keys.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryAuthError::Key`] if the PEM or the key inside it is malformed.
    pub fn from_pem(pem: &[u8]) -> Result<Self, RegistryAuthError> {
        let der = PrivateKeyDer::from_pem_slice(pem)
            .map_err(|_| RegistryAuthError::Key("failed to read private key PEM".to_owned()))?;

        match der {
            PrivateKeyDer::Pkcs1(key) => {
                let key = RsaPrivateKey::from_pkcs1_der(key.secret_pkcs1_der())
                    .map_err(|e| RegistryAuthError::Key(format!("invalid RSA private key: {e}")))?;
                Self::from_rsa(&key)
            }
            PrivateKeyDer::Sec1(key) => {
                let key = p256::SecretKey::from_sec1_der(key.secret_sec1_der())
                    .map_err(|e| RegistryAuthError::Key(format!("invalid EC private key: {e}")))?;
                Self::from_ec(&key)
            }
            PrivateKeyDer::Pkcs8(key) => Self::from_pkcs8_der(key.secret_pkcs8_der()),
            _ => Err(RegistryAuthError::Key(
                "unsupported private key encoding".to_owned(),
            )),
        }
    }

    /// Load a private key from a PEM file.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryAuthError::Key`] if the file cannot be read or parsed.
    pub fn from_pem_file(path: impl AsRef<Path>) -> Result<Self, RegistryAuthError> {
        let path = path.as_ref();
        let pem = std::fs::read(path).map_err(|e| {
            RegistryAuthError::Key(format!("failed to read {}: {e}", path.display()))
        })?;
        Self::from_pem(&pem)
    }

    fn from_pkcs8_der(der: &[u8]) -> Result<Self, RegistryAuthError> {
        let info = PrivateKeyInfo::try_from(der)
            .map_err(|e| RegistryAuthError::Key(format!("invalid PKCS#8 private key: {e}")))?;

        match info.algorithm.oid.to_string().as_str() {
            OID_RSA_ENCRYPTION => {
                let key = RsaPrivateKey::from_pkcs8_der(der)
                    .map_err(|e| RegistryAuthError::Key(format!("invalid RSA private key: {e}")))?;
                Self::from_rsa(&key)
            }
            OID_EC_PUBLIC_KEY => {
                let key = p256::SecretKey::from_pkcs8_der(der).map_err(|e| {
                    RegistryAuthError::Key(format!("invalid or non P-256 EC private key: {e}"))
                })?;
                Self::from_ec(&key)
            }
            OID_ED25519 | OID_X25519 => Ok(Self::unsupported("OKP")),
            oid => Ok(Self::unsupported(oid)),
        }
    }

    fn from_rsa(key: &RsaPrivateKey) -> Result<Self, RegistryAuthError> {
        let public = key.to_public_key();
        let pkix = public
            .to_public_key_der()
            .map_err(|e| RegistryAuthError::Key(format!("failed to encode public key: {e}")))?;
        let pkcs1 = key
            .to_pkcs1_der()
            .map_err(|e| RegistryAuthError::Key(format!("failed to encode private key: {e}")))?;

        let jwk = Jwk {
            common: CommonParameters {
                key_id: Some(libtrust_key_id(pkix.as_bytes())),
                ..CommonParameters::default()
            },
            algorithm: AlgorithmParameters::RSA(RSAKeyParameters {
                key_type: RSAKeyType::RSA,
                n: URL_SAFE_NO_PAD.encode(public.n().to_bytes_be()),
                e: URL_SAFE_NO_PAD.encode(public.e().to_bytes_be()),
            }),
        };

        Self::from_parts(
            "RSA",
            Algorithm::RS256,
            EncodingKey::from_rsa_der(pkcs1.as_bytes()),
            jwk,
        )
    }

    fn from_ec(key: &p256::SecretKey) -> Result<Self, RegistryAuthError> {
        let public = key.public_key();
        let pkix = public
            .to_public_key_der()
            .map_err(|e| RegistryAuthError::Key(format!("failed to encode public key: {e}")))?;
        let pkcs8 = key
            .to_pkcs8_der()
            .map_err(|e| RegistryAuthError::Key(format!("failed to encode private key: {e}")))?;

        let point = public.to_encoded_point(false);
        let (Some(x), Some(y)) = (point.x(), point.y()) else {
            return Err(RegistryAuthError::Key(
                "EC public key is not an affine point".to_owned(),
            ));
        };

        let jwk = Jwk {
            common: CommonParameters {
                key_id: Some(libtrust_key_id(pkix.as_bytes())),
                ..CommonParameters::default()
            },
            algorithm: AlgorithmParameters::EllipticCurve(EllipticCurveKeyParameters {
                key_type: EllipticCurveKeyType::EC,
                curve: EllipticCurve::P256,
                x: URL_SAFE_NO_PAD.encode(x),
                y: URL_SAFE_NO_PAD.encode(y),
            }),
        };

        Self::from_parts(
            "EC",
            Algorithm::ES256,
            EncodingKey::from_ec_der(pkcs8.as_bytes()),
            jwk,
        )
    }

    fn from_parts(
        key_type: &str,
        algorithm: Algorithm,
        encoding: EncodingKey,
        jwk: Jwk,
    ) -> Result<Self, RegistryAuthError> {
        let decoding = DecodingKey::from_jwk(&jwk)
            .map_err(|e| RegistryAuthError::Key(format!("failed to build verification key: {e}")))?;

        Ok(Self {
            key_type: key_type.to_owned(),
            keys: Some(KeyPair {
                algorithm,
                encoding,
                decoding,
                jwk,
            }),
            cert_chain: None,
        })
    }

    fn unsupported(key_type: &str) -> Self {
        Self {
            key_type: key_type.to_owned(),
            keys: None,
            cert_chain: None,
        }
    }

    /// Attach a certificate chain, embedded as the `x5c` header of access tokens.
    ///
    /// Entries are standard base64 encoded DER certificates, leaf first.
    #[must_use]
    pub fn with_cert_chain(mut self, chain: Vec<String>) -> Self {
        self.cert_chain = Some(chain);
        self
    }

    /// Attach a certificate chain read from PEM certificates, leaf first.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryAuthError::Key`] if the PEM is malformed or holds no certificate.
    pub fn with_cert_chain_pem(self, pem: &[u8]) -> Result<Self, RegistryAuthError> {
        let chain = CertificateDer::pem_slice_iter(pem)
            .map(|cert| {
                cert.map(|der| STANDARD.encode(der.as_ref()))
                    .map_err(|_| RegistryAuthError::Key("failed to read certificate PEM".to_owned()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        if chain.is_empty() {
            return Err(RegistryAuthError::Key(
                "certificate chain is empty".to_owned(),
            ));
        }

        Ok(self.with_cert_chain(chain))
    }

    /// Key type: `RSA`, `EC`, or the name of an unsupported type.
    #[must_use]
    pub fn key_type(&self) -> &str {
        &self.key_type
    }

    /// libtrust-compatible key id of the public key, if the key type is supported.
    #[must_use]
    pub fn key_id(&self) -> Option<&str> {
        self.keys
            .as_ref()
            .and_then(|keys| keys.jwk.common.key_id.as_deref())
    }

    /// The certificate chain embedded in access tokens, if any.
    #[must_use]
    pub fn cert_chain(&self) -> Option<&[String]> {
        self.cert_chain.as_deref()
    }

    fn keys(&self) -> Result<&KeyPair, RegistryAuthError> {
        self.keys
            .as_ref()
            .ok_or_else(|| RegistryAuthError::UnsupportedKeyType(self.key_type.clone()))
    }

    /// Signing algorithm derived from the key type.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryAuthError::UnsupportedKeyType`] for keys that cannot sign.
    pub fn algorithm(&self) -> Result<Algorithm, RegistryAuthError> {
        self.keys().map(|keys| keys.algorithm)
    }

    /// Public key as a JWK.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryAuthError::UnsupportedKeyType`] for keys that cannot sign.
    pub fn public_jwk(&self) -> Result<&Jwk, RegistryAuthError> {
        self.keys().map(|keys| &keys.jwk)
    }

    pub(crate) fn encoding_key(&self) -> Result<&EncodingKey, RegistryAuthError> {
        self.keys().map(|keys| &keys.encoding)
    }

    pub(crate) fn decoding_key(&self) -> Result<&DecodingKey, RegistryAuthError> {
        self.keys().map(|keys| &keys.decoding)
    }

    /// JOSE header for access tokens: the certificate chain when one is
    /// attached, the public JWK otherwise.
    pub(crate) fn access_token_header(&self) -> Result<Header, RegistryAuthError> {
        let keys = self.keys()?;
        let mut header = Header::new(keys.algorithm);

        match &self.cert_chain {
            Some(chain) => header.x5c = Some(chain.clone()),
            None => header.jwk = Some(keys.jwk.clone()),
        }

        Ok(header)
    }
}

impl fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SigningKey")
            .field("key_type", &self.key_type)
            .field("key_id", &self.key_id())
            .field("cert_chain_len", &self.cert_chain.as_ref().map(Vec::len))
            .finish_non_exhaustive()
    }
}

/// Key id in the libtrust format: the first 240 bits of the SHA-256 of the
/// PKIX public key, base32 encoded, in groups of four separated by `:`.
fn libtrust_key_id(pkix_der: &[u8]) -> String {
    let digest = Sha256::digest(pkix_der);
    let encoded = BASE32.encode(&digest[..30]);

    encoded
        .as_bytes()
        .chunks(4)
        .map(String::from_utf8_lossy)
        .collect::<Vec<_>>()
        .join(":")
}
