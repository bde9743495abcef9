//! Verification outcome taxonomy.
//!
//! Every public operation in this crate reports failure through a single
//! enumerated [`Status`]. Each variant names exactly one well-defined failure
//! mode, and its [`Display`](std::fmt::Display) text is a stable short string
//! suitable for logs and assertions. Telemetry and security audits depend on
//! a single-cause explanation for every rejection, so decoding and
//! verification stop at the first error and surface it unchanged.

use thiserror::Error;

/// Outcome of a JWT decode, JWKS construction, or verification step.
///
/// Variants are grouped by the stage that produces them: token structure,
/// verification policy, JWKS document shape, per-key-kind field errors, and
/// PEM/PKCS#8/X.509 inputs. A few slots (`Missed`, `MultipleTokens`,
/// `FetchFail`, `JwksBioAllocError`) are reserved for embedding code (token
/// extraction, remote key fetching) and are never produced by this crate
/// itself.
///
/// # Non-exhaustive
///
/// This enum is marked `#[non_exhaustive]` — new variants may be added in
/// future minor releases without a semver-breaking change. Downstream match
/// expressions must include a wildcard arm (`_ =>`).
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum Status {
    // ---- Token extraction (caller slots) ----
    /// No token was supplied where one was required.
    #[error("Jwt is missing")]
    Missed,

    /// More than one token was found where exactly one was required.
    #[error("Found multiple Jwt tokens")]
    MultipleTokens,

    // ---- JWT structure ----
    /// The input is not `header.payload.signature` with exactly two dots and
    /// three non-empty sections.
    #[error("Jwt is not in the form of Header.Payload.Signature with two dots and 3 sections")]
    BadFormat,

    /// The header section is not valid base64url.
    #[error("Jwt header is an invalid Base64url encoded")]
    HeaderBadBase64,

    /// The decoded header is not a JSON object.
    #[error("Jwt header is an invalid JSON")]
    HeaderBadJson,

    /// The header `alg` field is missing or not a string.
    #[error("Jwt header [alg] field is required and must be a string")]
    HeaderBadAlg,

    /// The header `alg` value is not in the implemented set.
    #[error("Jwt header [alg] is not supported")]
    HeaderNotImplementedAlg,

    /// The header `kid` field is present but not a string.
    #[error("Jwt header [kid] field is not a string")]
    HeaderBadKid,

    /// The payload section is not valid base64url.
    #[error("Jwt payload is an invalid Base64url encoded")]
    PayloadBadBase64,

    /// The decoded payload is not a JSON object.
    #[error("Jwt payload is an invalid JSON")]
    PayloadBadJson,

    /// The payload `iss` claim is present but not a string.
    #[error("Jwt payload [iss] field is not a string")]
    PayloadIssNotString,

    /// The payload `sub` claim is present but not a string.
    #[error("Jwt payload [sub] field is not a string")]
    PayloadSubNotString,

    /// The payload `iat` claim is present but not a number.
    #[error("Jwt payload [iat] field is not an integer")]
    PayloadIatNotInteger,

    /// The payload `iat` claim is numeric but negative or out of range.
    #[error("Jwt payload [iat] field is not a positive integer")]
    PayloadIatNotPositive,

    /// The payload `nbf` claim is present but not a number.
    #[error("Jwt payload [nbf] field is not an integer")]
    PayloadNbfNotInteger,

    /// The payload `nbf` claim is numeric but negative or out of range.
    #[error("Jwt payload [nbf] field is not a positive integer")]
    PayloadNbfNotPositive,

    /// The payload `exp` claim is present but not a number.
    #[error("Jwt payload [exp] field is not an integer")]
    PayloadExpNotInteger,

    /// The payload `exp` claim is numeric but negative or out of range.
    #[error("Jwt payload [exp] field is not a positive integer")]
    PayloadExpNotPositive,

    /// The payload `jti` claim is present but not a string.
    #[error("Jwt payload [jti] field is not a string")]
    PayloadJtiNotString,

    /// The payload `aud` claim is neither a string nor a list of strings.
    #[error("Jwt payload [aud] field is not a string or string list")]
    PayloadAudNotString,

    /// The signature section is not valid base64url.
    #[error("Jwt signature is an invalid Base64url encoded")]
    SignatureBadBase64,

    /// An EdDSA token's signature is not exactly 64 bytes.
    #[error("Jwt ED25519 signature is wrong length")]
    Ed25519SignatureWrongLength,

    // ---- Verification policy ----
    /// The token's `nbf` is in the future.
    #[error("Jwt not yet valid")]
    NotYetValid,

    /// The token's `exp` has passed.
    #[error("Jwt is expired")]
    Expired,

    /// The token's issuer is not in the allowed set.
    #[error("Jwt issuer is not configured")]
    UnknownIssuer,

    /// None of the token's audiences is in the allowed set.
    #[error("Audiences in Jwt are not allowed")]
    AudienceNotAllowed,

    /// A key was selected but no candidate produced a valid signature.
    #[error("Jwt verification fails")]
    VerificationFail,

    // ---- JWKS document ----
    /// The key-set document is not valid JSON.
    #[error("Jwks is an invalid JSON")]
    ParseError,

    /// The document has no `keys` member and is not an X.509 bundle.
    #[error("Jwks does not have [keys] field")]
    NoKeys,

    /// The `keys` member is not an array.
    #[error("[keys] in Jwks is not an array")]
    BadKeys,

    /// No key in the document survived extraction.
    #[error("Jwks doesn't have any valid public key")]
    NoValidKeys,

    /// No key in the set can serve the token's `kid`/`alg` pair.
    #[error("Jwks doesn't have key to match kid or alg from Jwt")]
    KidAlgMismatch,

    /// A JWK has no `kty` field.
    #[error("[kty] is missing in [keys]")]
    MissingKty,

    /// A JWK `kty` field is not a string.
    #[error("[kty] is bad in [keys]")]
    BadKty,

    /// A JWK `kty` value is not one of RSA, EC, oct, OKP.
    #[error("[kty] is not supported in [keys]")]
    NotImplementedKty,

    // ---- RSA keys ----
    /// An RSA key advertises an `alg` outside the RS*/PS* families.
    #[error("[alg] is not started with [RS] or [PS] for an RSA key")]
    RsaKeyBadAlg,

    /// An RSA key has no `n` field.
    #[error("[n] field is missing for a RSA key")]
    RsaKeyMissingN,

    /// An RSA key `n` field is not a string.
    #[error("[n] field is not string for a RSA key")]
    RsaKeyBadN,

    /// An RSA key has no `e` field.
    #[error("[e] field is missing for a RSA key")]
    RsaKeyMissingE,

    /// An RSA key `e` field is not a string.
    #[error("[e] field is not string for a RSA key")]
    RsaKeyBadE,

    /// RSA `n`/`e` material failed to decode or produce an acceptable key.
    #[error("Jwks RSA [n] or [e] field is missing or has a parse error")]
    RsaParseError,

    // ---- EC keys ----
    /// An EC key advertises an `alg` outside the ES* family.
    #[error("[alg] is not started with [ES] for an EC key")]
    EcKeyBadAlg,

    /// An EC key `crv` field is not a string.
    #[error("[crv] field is not string for an EC key")]
    EcKeyBadCrv,

    /// An EC key `alg` or `crv` value is recognized by neither table.
    #[error("[crv] or [alg] field is not supported for an EC key")]
    EcKeyAlgOrCrvUnsupported,

    /// An EC key's `alg` and `crv` disagree (e.g. ES256 with P-384).
    #[error("[crv] field specified is not compatible with [alg] for an EC key")]
    AlgNotCompatibleWithCrv,

    /// An EC key has no `x` field.
    #[error("[x] field is missing for an EC key")]
    EcKeyMissingX,

    /// An EC key `x` field is not a string.
    #[error("[x] field is not string for an EC key")]
    EcKeyBadX,

    /// An EC key has no `y` field.
    #[error("[y] field is missing for an EC key")]
    EcKeyMissingY,

    /// An EC key `y` field is not a string.
    #[error("[y] field is not string for an EC key")]
    EcKeyBadY,

    /// An EC key `x` or `y` field is not valid base64url.
    #[error("Jwks EC [x] or [y] field is an invalid Base64.")]
    EcXorYBadBase64,

    /// EC coordinates do not form a point on the declared curve.
    #[error("Jwks EC [x] and [y] fields have a parse error.")]
    EcParseError,

    // ---- HMAC (oct) keys ----
    /// An oct key advertises an `alg` outside the HS* family.
    #[error("[alg] does not start with [HS] for an HMAC key")]
    HmacKeyBadAlg,

    /// An oct key has no `k` field.
    #[error("[k] field is missing for an HMAC key")]
    HmacKeyMissingK,

    /// An oct key `k` field is not a string.
    #[error("[k] field is not string for an HMAC key")]
    HmacKeyBadK,

    /// An oct key `k` field is not valid base64url or decodes to nothing.
    #[error("Jwks Oct key is an invalid Base64")]
    OctBadBase64,

    // ---- OKP keys ----
    /// An OKP key advertises an `alg` other than EdDSA.
    #[error("[alg] is not [EdDSA] for an OKP key")]
    OkpKeyBadAlg,

    /// An OKP key has no `crv` field (caller slot; this crate defaults the
    /// curve to Ed25519 instead).
    #[error("[crv] field is missing for an OKP key")]
    OkpKeyMissingCrv,

    /// An OKP key `crv` field is not a string.
    #[error("[crv] field is not string for an OKP key")]
    OkpKeyBadCrv,

    /// An OKP key `crv` value is not Ed25519.
    #[error("[crv] field is not supported for an OKP key")]
    OkpKeyCrvUnsupported,

    /// An OKP key has no `x` field.
    #[error("[x] field is missing for an OKP key")]
    OkpKeyMissingX,

    /// An OKP key `x` field is not a string.
    #[error("[x] field is not string for an OKP key")]
    OkpKeyBadX,

    /// An OKP key `x` field is not valid base64url.
    #[error("Jwks OKP [x] field is an invalid Base64.")]
    OkpXBadBase64,

    /// An OKP key `x` field does not decode to a usable 32-byte point.
    #[error("Jwks OKP [x] field is wrong length.")]
    OkpXWrongLength,

    // ---- PEM / PKCS#8 / X.509 inputs ----
    /// A bare-PEM input is not valid base64 or decodes to nothing.
    #[error("PEM pubkey parse fails")]
    PemBadBase64,

    /// A bare-PEM input decoded but is not an RSA PKCS#1 public key.
    #[error("PEM pubkey is an invalid RSA public key")]
    PemParseError,

    /// A bare-PEM input holds a key kind this library does not accept.
    #[error("PEM Key type is not supported")]
    PemNotImplementedKty,

    /// A PKCS#8 input failed PEM-armor or SubjectPublicKeyInfo parsing.
    #[error("PKCS8 pubkey parse fails")]
    Pkcs8ParseError,

    /// A PKCS#8 SubjectPublicKeyInfo carries an unsupported algorithm.
    #[error("PKCS8 Key type is not supported")]
    Pkcs8NotImplementedKty,

    /// An X.509 certificate failed to parse.
    #[error("X509 parse pubkey fails")]
    X509ParseError,

    /// An X.509 certificate parsed but its subject public key is unusable.
    #[error("X509 parse pubkey internal fails: get pubkey")]
    X509GetPubkeyError,

    // ---- Environment slots ----
    /// Memory allocation failed inside a crypto adapter (caller slot).
    #[error("Failed to create BIO due to memory allocation failure")]
    JwksBioAllocError,

    /// Remote key-set fetch failed (caller slot).
    #[error("Jwks remote fetch is failed")]
    FetchFail,
}

/// Records the first failure seen during a multi-step construction.
///
/// Later failures do not overwrite an already-recorded one, so the stored
/// status always names the earliest problem even when construction continues
/// for best-effort diagnostics.
#[derive(Debug, Default)]
pub(crate) struct FirstFailure(Option<Status>);

impl FirstFailure {
    /// Record `status` unless a failure was already recorded.
    pub(crate) fn record(&mut self, status: Status) {
        if self.0.is_none() {
            self.0 = Some(status);
        }
    }

    /// The first recorded failure, if any.
    pub(crate) fn get(&self) -> Option<Status> {
        self.0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn test_display_strings_are_stable() {
        assert_eq!(
            Status::BadFormat.to_string(),
            "Jwt is not in the form of Header.Payload.Signature with two dots and 3 sections"
        );
        assert_eq!(Status::Expired.to_string(), "Jwt is expired");
        assert_eq!(Status::NotYetValid.to_string(), "Jwt not yet valid");
        assert_eq!(
            Status::KidAlgMismatch.to_string(),
            "Jwks doesn't have key to match kid or alg from Jwt"
        );
        assert_eq!(
            Status::Ed25519SignatureWrongLength.to_string(),
            "Jwt ED25519 signature is wrong length"
        );
        assert_eq!(
            Status::HmacKeyBadAlg.to_string(),
            "[alg] does not start with [HS] for an HMAC key"
        );
    }

    #[test]
    fn test_status_is_copy_and_eq() {
        let a = Status::VerificationFail;
        let b = a;
        assert_eq!(a, b);
        assert_ne!(a, Status::Expired);
    }

    #[test]
    fn test_first_failure_keeps_earliest() {
        let mut acc = FirstFailure::default();
        assert_eq!(acc.get(), None);

        acc.record(Status::RsaKeyMissingN);
        acc.record(Status::NoValidKeys);
        assert_eq!(acc.get(), Some(Status::RsaKeyMissingN));
    }
}
