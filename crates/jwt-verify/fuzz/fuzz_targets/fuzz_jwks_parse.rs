//! Fuzz target for key-set decoding.
//!
//! All three input formats must be total: any input yields a `Jwks` whose
//! status explains the failure, never a panic. A key set that reports Ok
//! must hold at least one key.

#![no_main]

use libfuzzer_sys::fuzz_target;

use jwt_verify::{Jwks, KeyFormat};

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };

    for format in [KeyFormat::Jwks, KeyFormat::Pem, KeyFormat::Pkcs8] {
        let jwks = Jwks::create_from(text, format);
        if jwks.is_ok() {
            assert!(!jwks.keys().is_empty());
        }
    }
});
