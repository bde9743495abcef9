//! JWT compact-serialization decoding.
//!
//! [`Jwt::decode`] is a strict parser: every malformed token is rejected with
//! a single, specific [`Status`], and structural failures are reported before
//! semantic ones. A decoded [`Jwt`] carries the raw and base64url forms of
//! each section (so the original token can be reproduced byte-for-byte) plus
//! the registered claims consulted during verification.
//!
//! # Example
//!
//! ```
//! use jwt_verify::{Jwt, base64};
//!
//! # fn main() -> Result<(), jwt_verify::Status> {
//! let token = format!(
//!     "{}.{}.{}",
//!     base64::encode_url(r#"{"alg":"HS256","typ":"JWT"}"#),
//!     base64::encode_url(r#"{"iss":"https://issuer.example","exp":2000000000}"#),
//!     base64::encode_url(b"signature-bytes"),
//! );
//! let jwt = Jwt::decode(&token)?;
//! assert_eq!(jwt.alg, "HS256");
//! assert_eq!(jwt.iss, "https://issuer.example");
//! assert_eq!(jwt.exp, 2000000000);
//! # Ok(())
//! # }
//! ```

use std::str::FromStr;

use serde_json::{Map, Value};

use crate::{
    base64,
    json::{FindError, ObjectReader},
    status::Status,
};

/// Signing algorithms this library implements end-to-end.
///
/// A token whose header `alg` is not in this set is rejected at decode time
/// with [`Status::HeaderNotImplementedAlg`], per RFC 8725 §3.1: a verifier
/// must not accept an algorithm it cannot fully check.
pub const IMPLEMENTED_ALGS: &[&str] = &[
    "RS256", "RS384", "RS512", "PS256", "PS384", "PS512", "ES256", "ES384", "ES512", "HS256",
    "HS384", "HS512", "EdDSA",
];

/// A decoded JWT.
///
/// Produced only by [`Jwt::decode`]; immutable afterwards. String claims use
/// the empty string for "absent" and integer claims use 0; an `exp` of 0
/// means the token carries no expiry constraint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Jwt {
    /// The original compact serialization.
    pub raw: String,
    /// The header section as it appeared in the token.
    pub header_b64url: String,
    /// Decoded header JSON text.
    pub header_bytes: Vec<u8>,
    /// Parsed header object.
    pub header: Map<String, Value>,
    /// The payload section as it appeared in the token.
    pub payload_b64url: String,
    /// Decoded payload JSON text.
    pub payload_bytes: Vec<u8>,
    /// Parsed payload object.
    pub payload: Map<String, Value>,
    /// The signature section as it appeared in the token.
    pub signature_b64url: String,
    /// Decoded signature bytes. Length is validated per algorithm at
    /// verification time, not here.
    pub signature: Vec<u8>,
    /// Header `alg`, always set and always in [`IMPLEMENTED_ALGS`].
    pub alg: String,
    /// Header `kid`, empty when absent.
    pub kid: String,
    /// Payload `iss`, empty when absent.
    pub iss: String,
    /// Payload `sub`, empty when absent.
    pub sub: String,
    /// Payload `jti`, empty when absent.
    pub jti: String,
    /// Payload `iat` in seconds since epoch, 0 when absent.
    pub iat: i64,
    /// Payload `nbf` in seconds since epoch, 0 when absent.
    pub nbf: i64,
    /// Payload `exp` in seconds since epoch, 0 when absent (no expiry).
    pub exp: i64,
    /// Payload `aud`: one element for a string claim, the elements in order
    /// for an array claim, empty when absent.
    pub audiences: Vec<String>,
}

impl Jwt {
    /// Parse a compact-serialized token.
    ///
    /// The procedure is strictly ordered so every rejection has exactly one
    /// cause: structure, then header base64/JSON/fields, then payload
    /// base64/JSON/claims, then signature base64.
    ///
    /// # Errors
    ///
    /// Returns the [`Status`] naming the first failure; see the variant docs
    /// for the full taxonomy.
    pub fn decode(token: &str) -> Result<Jwt, Status> {
        if token.bytes().filter(|b| *b == b'.').count() != 2 {
            return Err(Status::BadFormat);
        }
        let mut sections = token.split('.');
        let header_b64url = sections.next().unwrap_or_default();
        let payload_b64url = sections.next().unwrap_or_default();
        let signature_b64url = sections.next().unwrap_or_default();
        if header_b64url.is_empty() || payload_b64url.is_empty() || signature_b64url.is_empty() {
            return Err(Status::BadFormat);
        }

        let header_bytes =
            base64::decode_url(header_b64url).map_err(|_| Status::HeaderBadBase64)?;
        let header: Map<String, Value> =
            serde_json::from_slice(&header_bytes).map_err(|_| Status::HeaderBadJson)?;

        let header_reader = ObjectReader::new(&header);
        let alg = header_reader
            .get_string("alg")
            .map_err(|_| Status::HeaderBadAlg)?
            .to_owned();
        if !IMPLEMENTED_ALGS.contains(&alg.as_str()) {
            return Err(Status::HeaderNotImplementedAlg);
        }
        let kid = optional_string(&header_reader, "kid", Status::HeaderBadKid)?;

        let payload_bytes =
            base64::decode_url(payload_b64url).map_err(|_| Status::PayloadBadBase64)?;
        let payload: Map<String, Value> =
            serde_json::from_slice(&payload_bytes).map_err(|_| Status::PayloadBadJson)?;

        let payload_reader = ObjectReader::new(&payload);
        let iss = optional_string(&payload_reader, "iss", Status::PayloadIssNotString)?;
        let sub = optional_string(&payload_reader, "sub", Status::PayloadSubNotString)?;
        let iat = optional_time(
            &payload_reader,
            "iat",
            Status::PayloadIatNotInteger,
            Status::PayloadIatNotPositive,
        )?;
        let nbf = optional_time(
            &payload_reader,
            "nbf",
            Status::PayloadNbfNotInteger,
            Status::PayloadNbfNotPositive,
        )?;
        let exp = optional_time(
            &payload_reader,
            "exp",
            Status::PayloadExpNotInteger,
            Status::PayloadExpNotPositive,
        )?;
        let jti = optional_string(&payload_reader, "jti", Status::PayloadJtiNotString)?;
        let audiences = match payload_reader.get_string_list("aud") {
            Ok(list) => list,
            Err(FindError::Missing) => Vec::new(),
            Err(_) => return Err(Status::PayloadAudNotString),
        };

        let signature =
            base64::decode_url(signature_b64url).map_err(|_| Status::SignatureBadBase64)?;

        Ok(Jwt {
            raw: token.to_owned(),
            header_b64url: header_b64url.to_owned(),
            header_bytes,
            header,
            payload_b64url: payload_b64url.to_owned(),
            payload_bytes,
            payload,
            signature_b64url: signature_b64url.to_owned(),
            signature,
            alg,
            kid,
            iss,
            sub,
            jti,
            iat,
            nbf,
            exp,
            audiences,
        })
    }

    /// The bytes the signature covers: `header_b64url.payload_b64url`.
    pub fn signing_input(&self) -> Vec<u8> {
        let mut input =
            Vec::with_capacity(self.header_b64url.len() + 1 + self.payload_b64url.len());
        input.extend_from_slice(self.header_b64url.as_bytes());
        input.push(b'.');
        input.extend_from_slice(self.payload_b64url.as_bytes());
        input
    }

    /// Typed accessor over the parsed payload, for custom-claim lookup with
    /// dotted paths.
    pub fn payload_reader(&self) -> ObjectReader<'_> {
        ObjectReader::new(&self.payload)
    }

    /// Typed accessor over the parsed header.
    pub fn header_reader(&self) -> ObjectReader<'_> {
        ObjectReader::new(&self.header)
    }
}

impl FromStr for Jwt {
    type Err = Status;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Jwt::decode(s)
    }
}

/// Read an optional string field; absence yields the empty string.
fn optional_string(
    reader: &ObjectReader<'_>,
    name: &str,
    wrong_type: Status,
) -> Result<String, Status> {
    match reader.get_string(name) {
        Ok(s) => Ok(s.to_owned()),
        Err(FindError::Missing) => Ok(String::new()),
        Err(_) => Err(wrong_type),
    }
}

/// Read an optional time claim; absence yields 0.
fn optional_time(
    reader: &ObjectReader<'_>,
    name: &str,
    not_integer: Status,
    not_positive: Status,
) -> Result<i64, Status> {
    match reader.get_u64(name) {
        Ok(v) if v <= i64::MAX as u64 => Ok(v as i64),
        Ok(_) => Err(not_positive),
        Err(FindError::Missing) => Ok(0),
        Err(FindError::WrongType) => Err(not_integer),
        Err(FindError::OutOfRange) => Err(not_positive),
    }
}
