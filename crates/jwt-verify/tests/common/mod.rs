//! Shared helpers for the verification test suites.
#![allow(dead_code)]

use jwt_verify::{Jwt, base64::encode_url};
use serde_json::Value;

/// Build a compact token from header/payload JSON and a signing closure that
/// receives the signing input (`header_b64url.payload_b64url`).
pub fn signed_token(header: &Value, payload: &Value, sign: impl FnOnce(&[u8]) -> Vec<u8>) -> String {
    let signing_input = format!(
        "{}.{}",
        encode_url(serde_json::to_vec(header).expect("header json")),
        encode_url(serde_json::to_vec(payload).expect("payload json")),
    );
    let signature = sign(signing_input.as_bytes());
    format!("{signing_input}.{}", encode_url(signature))
}

/// Run `check` against every single-bit flip and every truncation of the
/// token's signature. The closure must treat each mutated token as invalid.
pub fn fuzz_jwt_signature(jwt: &Jwt, check: impl Fn(&Jwt)) {
    for byte in 0..jwt.signature.len() {
        for bit in 0..8 {
            let mut mutated = jwt.clone();
            mutated.signature[byte] ^= 1 << bit;
            check(&mutated);
        }
    }
    for len in 0..jwt.signature.len() {
        let mut mutated = jwt.clone();
        mutated.signature.truncate(len);
        check(&mutated);
    }
}
