//! Signature-verification backend.
//!
//! The verifier talks to cryptography through the narrow functions in this
//! module: one per signature family, each taking already-materialized key
//! objects and raw message/signature bytes and answering a plain yes/no. Any
//! correct backend would do; this one is built on the RustCrypto stack.

use hmac::{Hmac, Mac};
use rsa::RsaPublicKey;
use sha2::{Sha256, Sha384, Sha512};
use signature::Verifier;

/// An ECDSA verification key on one of the supported NIST curves.
///
/// JOSE names the curve through the token algorithm (`ES256` → P-256 and so
/// on), so the verifier dispatches on this tag rather than on generics.
#[derive(Clone)]
pub enum EcKey {
    /// P-256 (secp256r1), serving ES256.
    P256(p256::ecdsa::VerifyingKey),
    /// P-384 (secp384r1), serving ES384.
    P384(p384::ecdsa::VerifyingKey),
    /// P-521 (secp521r1), serving ES512.
    P521(p521::ecdsa::VerifyingKey),
}

impl std::fmt::Debug for EcKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple(self.curve()).finish()
    }
}

impl EcKey {
    /// The JOSE curve name for this key.
    pub fn curve(&self) -> &'static str {
        match self {
            EcKey::P256(_) => "P-256",
            EcKey::P384(_) => "P-384",
            EcKey::P521(_) => "P-521",
        }
    }

    /// Build a key from big-endian affine coordinates.
    ///
    /// Coordinates may carry leading zero bytes; they are normalized to the
    /// curve's field width. Returns `None` for an unknown curve name, for
    /// oversized coordinates, or when `(x, y)` is not a point on the curve.
    pub(crate) fn from_affine_coordinates(crv: &str, x: &[u8], y: &[u8]) -> Option<EcKey> {
        let field_size = match crv {
            "P-256" => 32,
            "P-384" => 48,
            "P-521" => 66,
            _ => return None,
        };
        let x = fit_to_field(x, field_size)?;
        let y = fit_to_field(y, field_size)?;
        match crv {
            "P-256" => {
                let point = p256::EncodedPoint::from_affine_coordinates(
                    p256::FieldBytes::from_slice(&x),
                    p256::FieldBytes::from_slice(&y),
                    false,
                );
                p256::ecdsa::VerifyingKey::from_encoded_point(&point).ok().map(EcKey::P256)
            }
            "P-384" => {
                let point = p384::EncodedPoint::from_affine_coordinates(
                    p384::FieldBytes::from_slice(&x),
                    p384::FieldBytes::from_slice(&y),
                    false,
                );
                p384::ecdsa::VerifyingKey::from_encoded_point(&point).ok().map(EcKey::P384)
            }
            "P-521" => {
                let point = p521::EncodedPoint::from_affine_coordinates(
                    p521::FieldBytes::from_slice(&x),
                    p521::FieldBytes::from_slice(&y),
                    false,
                );
                p521::ecdsa::VerifyingKey::from_encoded_point(&point).ok().map(EcKey::P521)
            }
            _ => None,
        }
    }

    /// Build a key from a SEC1-encoded point (as found in an X.509 or
    /// SubjectPublicKeyInfo bit string), given the curve's OID-resolved name.
    pub(crate) fn from_sec1_bytes(crv: &str, bytes: &[u8]) -> Option<EcKey> {
        match crv {
            "P-256" => p256::ecdsa::VerifyingKey::from_sec1_bytes(bytes).ok().map(EcKey::P256),
            "P-384" => p384::ecdsa::VerifyingKey::from_sec1_bytes(bytes).ok().map(EcKey::P384),
            "P-521" => p521::ecdsa::VerifyingKey::from_sec1_bytes(bytes).ok().map(EcKey::P521),
            _ => None,
        }
    }
}

/// Left-pad a big-endian coordinate to the field width.
///
/// Leading zeros are stripped first so an over-long but numerically in-range
/// encoding still fits; a value wider than the field is rejected.
fn fit_to_field(bytes: &[u8], field_size: usize) -> Option<Vec<u8>> {
    let significant = match bytes.iter().position(|b| *b != 0) {
        Some(i) => &bytes[i..],
        None => &[],
    };
    if significant.len() > field_size {
        return None;
    }
    let mut out = vec![0u8; field_size];
    out[field_size - significant.len()..].copy_from_slice(significant);
    Some(out)
}

/// RSASSA-PKCS1-v1_5 verification for RS256/RS384/RS512.
pub(crate) fn rsa_pkcs1_verify(key: &RsaPublicKey, alg: &str, msg: &[u8], sig: &[u8]) -> bool {
    use rsa::pkcs1v15::{Signature, VerifyingKey};
    let Ok(signature) = Signature::try_from(sig) else {
        return false;
    };
    match alg {
        "RS256" => VerifyingKey::<Sha256>::new(key.clone()).verify(msg, &signature).is_ok(),
        "RS384" => VerifyingKey::<Sha384>::new(key.clone()).verify(msg, &signature).is_ok(),
        "RS512" => VerifyingKey::<Sha512>::new(key.clone()).verify(msg, &signature).is_ok(),
        _ => false,
    }
}

/// RSASSA-PSS verification for PS256/PS384/PS512.
///
/// MGF1 uses the same hash as the message digest and the salt length equals
/// the digest length, per RFC 7518 §3.5.
pub(crate) fn rsa_pss_verify(key: &RsaPublicKey, alg: &str, msg: &[u8], sig: &[u8]) -> bool {
    use rsa::pss::{Signature, VerifyingKey};
    let Ok(signature) = Signature::try_from(sig) else {
        return false;
    };
    match alg {
        "PS256" => VerifyingKey::<Sha256>::new(key.clone()).verify(msg, &signature).is_ok(),
        "PS384" => VerifyingKey::<Sha384>::new(key.clone()).verify(msg, &signature).is_ok(),
        "PS512" => VerifyingKey::<Sha512>::new(key.clone()).verify(msg, &signature).is_ok(),
        _ => false,
    }
}

/// ECDSA verification over a JOSE fixed-width `R || S` signature.
///
/// A signature whose length does not match the key's curve fails
/// verification; it is not a parse error.
pub(crate) fn ecdsa_verify(key: &EcKey, msg: &[u8], sig: &[u8]) -> bool {
    match key {
        EcKey::P256(vk) => p256::ecdsa::Signature::from_slice(sig)
            .map(|s| vk.verify(msg, &s).is_ok())
            .unwrap_or(false),
        EcKey::P384(vk) => p384::ecdsa::Signature::from_slice(sig)
            .map(|s| vk.verify(msg, &s).is_ok())
            .unwrap_or(false),
        EcKey::P521(vk) => p521::ecdsa::Signature::from_slice(sig)
            .map(|s| vk.verify(msg, &s).is_ok())
            .unwrap_or(false),
    }
}

/// Ed25519 verification. The caller has already checked the 64-byte length.
pub(crate) fn ed25519_verify(key: &ed25519_dalek::VerifyingKey, msg: &[u8], sig: &[u8]) -> bool {
    let Ok(sig_bytes) = <[u8; 64]>::try_from(sig) else {
        return false;
    };
    let signature = ed25519_dalek::Signature::from_bytes(&sig_bytes);
    key.verify(msg, &signature).is_ok()
}

type HmacSha256 = Hmac<Sha256>;
type HmacSha384 = Hmac<Sha384>;
type HmacSha512 = Hmac<Sha512>;

/// HMAC verification for HS256/HS384/HS512.
///
/// `Mac::verify_slice` performs the comparison in constant time.
pub(crate) fn hmac_verify(secret: &[u8], alg: &str, msg: &[u8], sig: &[u8]) -> bool {
    match alg {
        "HS256" => match HmacSha256::new_from_slice(secret) {
            Ok(mut mac) => {
                mac.update(msg);
                mac.verify_slice(sig).is_ok()
            }
            Err(_) => false,
        },
        "HS384" => match HmacSha384::new_from_slice(secret) {
            Ok(mut mac) => {
                mac.update(msg);
                mac.verify_slice(sig).is_ok()
            }
            Err(_) => false,
        },
        "HS512" => match HmacSha512::new_from_slice(secret) {
            Ok(mut mac) => {
                mac.update(msg);
                mac.verify_slice(sig).is_ok()
            }
            Err(_) => false,
        },
        _ => false,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn test_fit_to_field() {
        assert_eq!(fit_to_field(&[1, 2], 4).unwrap(), vec![0, 0, 1, 2]);
        assert_eq!(fit_to_field(&[0, 0, 1, 2], 2).unwrap(), vec![1, 2]);
        assert_eq!(fit_to_field(&[], 2).unwrap(), vec![0, 0]);
        assert!(fit_to_field(&[1, 2, 3], 2).is_none());
    }

    #[test]
    fn test_hmac_round_trip() {
        let secret = b"shared-secret";
        let msg = b"header.payload";
        let mut mac = Hmac::<Sha256>::new_from_slice(secret).unwrap();
        mac.update(msg);
        let tag = mac.finalize().into_bytes();

        assert!(hmac_verify(secret, "HS256", msg, &tag));
        assert!(!hmac_verify(secret, "HS384", msg, &tag));
        assert!(!hmac_verify(b"other-secret", "HS256", msg, &tag));

        let mut flipped = tag.to_vec();
        flipped[0] ^= 1;
        assert!(!hmac_verify(secret, "HS256", msg, &flipped));
    }

    #[test]
    fn test_ecdsa_rejects_wrong_length_signature() {
        use p256::ecdsa::SigningKey;
        use rand_core::OsRng;

        let sk = SigningKey::random(&mut OsRng);
        let key = EcKey::P256(*sk.verifying_key());
        assert!(!ecdsa_verify(&key, b"msg", &[0u8; 63]));
        assert!(!ecdsa_verify(&key, b"msg", &[]));
    }

    #[test]
    fn test_ec_point_must_be_on_curve() {
        // (1, 1) is not on P-256.
        assert!(EcKey::from_affine_coordinates("P-256", &[1], &[1]).is_none());
        assert!(EcKey::from_affine_coordinates("P-512", &[1], &[1]).is_none());
    }
}
