//! Token verification: validity window, key selection, signature check, and
//! issuer/audience policy.
//!
//! Verification is a pure function of `(jwt, jwks, now)`: no I/O, no internal
//! state, deterministic iteration over the key set in construction order.
//! Callers that enforce an issuer or audience policy layer
//! [`check_issuers`] / [`check_audiences`] on top of the signature check.

use chrono::Utc;

use crate::{
    crypto,
    jwks::{Jwks, KeyMaterial, Pubkey},
    jwt::Jwt,
    status::Status,
};

/// Verify `jwt` against `jwks` using the system wall clock.
///
/// # Errors
///
/// See [`verify_jwt_at`].
pub fn verify_jwt(jwt: &Jwt, jwks: &Jwks) -> Result<(), Status> {
    verify_jwt_at(jwt, jwks, Utc::now().timestamp())
}

/// Verify `jwt` against `jwks` at a caller-supplied time (seconds since the
/// Unix epoch).
///
/// The validity window is checked first: a non-zero `nbf` must not be in the
/// future and a non-zero `exp` must be in the future (`exp == 0` means the
/// token carries no expiry). Keys are then tried in key-set order; a key is
/// a candidate when it passes the kid/alg filter and its material kind can
/// serve the token's algorithm. The first candidate with a valid signature
/// wins.
///
/// # Errors
///
/// - [`Status::NotYetValid`] / [`Status::Expired`] for window violations;
/// - [`Status::Ed25519SignatureWrongLength`] for an EdDSA token whose
///   signature is not 64 bytes;
/// - [`Status::KidAlgMismatch`] when no key is a candidate;
/// - [`Status::VerificationFail`] when candidates exist but none verifies.
pub fn verify_jwt_at(jwt: &Jwt, jwks: &Jwks, now: i64) -> Result<(), Status> {
    if jwt.nbf != 0 && now < jwt.nbf {
        return Err(Status::NotYetValid);
    }
    if jwt.exp != 0 && now >= jwt.exp {
        return Err(Status::Expired);
    }

    if jwt.alg == "EdDSA" && jwt.signature.len() != 64 {
        return Err(Status::Ed25519SignatureWrongLength);
    }

    let signing_input = jwt.signing_input();
    let mut candidate_seen = false;
    for key in jwks.keys() {
        if !selectable(jwt, key) || !material_fits_alg(key, &jwt.alg) {
            continue;
        }
        candidate_seen = true;
        if signature_valid(key, &jwt.alg, &signing_input, &jwt.signature) {
            tracing::debug!(alg = %jwt.alg, kid = %key.kid, "Jwt signature verified");
            return Ok(());
        }
    }

    if candidate_seen {
        Err(Status::VerificationFail)
    } else {
        Err(Status::KidAlgMismatch)
    }
}

/// Check the token's audiences against an allowed set.
///
/// An empty allowed set means any audience is acceptable.
///
/// # Errors
///
/// [`Status::AudienceNotAllowed`] when the allowed set is non-empty and
/// shares no element with `jwt.audiences`. Comparison is case-sensitive and
/// performs no URI normalization.
pub fn check_audiences<A: AsRef<str>>(jwt: &Jwt, allowed: &[A]) -> Result<(), Status> {
    if allowed.is_empty() {
        return Ok(());
    }
    let permitted = jwt
        .audiences
        .iter()
        .any(|aud| allowed.iter().any(|a| a.as_ref() == aud));
    if permitted { Ok(()) } else { Err(Status::AudienceNotAllowed) }
}

/// Check the token's issuer against an allowed set.
///
/// An empty allowed set means any issuer is acceptable.
///
/// # Errors
///
/// [`Status::UnknownIssuer`] when the allowed set is non-empty and does not
/// contain `jwt.iss`.
pub fn check_issuers<I: AsRef<str>>(jwt: &Jwt, allowed: &[I]) -> Result<(), Status> {
    if allowed.is_empty() {
        return Ok(());
    }
    if allowed.iter().any(|iss| iss.as_ref() == jwt.iss) {
        Ok(())
    } else {
        Err(Status::UnknownIssuer)
    }
}

/// The kid/alg selection filter. PEM-sourced keys are wildcards.
fn selectable(jwt: &Jwt, key: &Pubkey) -> bool {
    if key.pem_format {
        return true;
    }
    let kid_matches = jwt.kid.is_empty() || !key.kid_specified || key.kid == jwt.kid;
    let alg_matches = !key.alg_specified || key.alg == jwt.alg;
    kid_matches && alg_matches
}

/// Whether the key's material kind (and curve, for EC) can serve `alg`.
fn material_fits_alg(key: &Pubkey, alg: &str) -> bool {
    match &key.material {
        KeyMaterial::Rsa(_) => alg.starts_with("RS") || alg.starts_with("PS"),
        KeyMaterial::Ec(point) => match alg {
            "ES256" => point.curve() == "P-256",
            "ES384" => point.curve() == "P-384",
            "ES512" => point.curve() == "P-521",
            _ => false,
        },
        KeyMaterial::Hmac(_) => alg.starts_with("HS"),
        KeyMaterial::Okp(_) => alg == "EdDSA",
    }
}

fn signature_valid(key: &Pubkey, alg: &str, msg: &[u8], sig: &[u8]) -> bool {
    match &key.material {
        KeyMaterial::Rsa(public) => {
            if alg.starts_with("RS") {
                crypto::rsa_pkcs1_verify(public, alg, msg, sig)
            } else {
                crypto::rsa_pss_verify(public, alg, msg, sig)
            }
        }
        KeyMaterial::Ec(point) => crypto::ecdsa_verify(point, msg, sig),
        KeyMaterial::Hmac(secret) => crypto::hmac_verify(secret, alg, msg, sig),
        KeyMaterial::Okp(public) => crypto::ed25519_verify(public, msg, sig),
    }
}
