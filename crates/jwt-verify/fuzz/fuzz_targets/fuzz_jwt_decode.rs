//! Fuzz target for JWT decoding.
//!
//! Feeds arbitrary byte strings to the compact-serialization parser. Every
//! input must produce either a decoded token or a `Status`, never a panic,
//! and a decoded token must survive the accessors without panicking.

#![no_main]

use libfuzzer_sys::fuzz_target;

use jwt_verify::Jwt;

fuzz_target!(|data: &[u8]| {
    // Tokens are always UTF-8 strings; skip anything else.
    let Ok(token) = std::str::from_utf8(data) else {
        return;
    };

    let Ok(jwt) = Jwt::decode(token) else {
        return;
    };

    // Accessors must be total on any successfully decoded token.
    let _ = jwt.payload_reader().get_string("iss");
    let _ = jwt.payload_reader().get_i64("exp");
    let _ = jwt.payload_reader().get_string_list("aud");
    let _ = jwt.header_reader().get_string("typ");
    let _ = jwt.signing_input();

    // Re-encoding the preserved sections must reproduce the input.
    let rebuilt = format!(
        "{}.{}.{}",
        jwt.header_b64url, jwt.payload_b64url, jwt.signature_b64url
    );
    assert_eq!(rebuilt, token);
});
