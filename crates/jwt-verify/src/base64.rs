//! Strict base64 codecs for the two alphabets this crate consumes.
//!
//! JWT sections use the URL-safe alphabet (RFC 4648 §5) without padding;
//! PEM bodies use the standard alphabet (RFC 4648 §4) with mandatory
//! canonical padding. Both decoders reject anything outside the alphabet,
//! inputs whose length is 1 mod 4, mis-aligned padding, and encodings whose
//! residual bits are non-zero (`"Zh=="` carries a trailing 1 bit and is not
//! a canonical encoding of any byte sequence).
//!
//! The [`base64`] crate's `general_purpose` engines enforce exactly these
//! rules, so this module is a thin veneer that fixes the two configurations
//! the rest of the crate is allowed to use.

use base64::{
    Engine,
    engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD},
};

pub use base64::DecodeError;

/// Encode bytes with the standard alphabet and padding.
pub fn encode(data: impl AsRef<[u8]>) -> String {
    STANDARD.encode(data)
}

/// Decode a standard-alphabet string with mandatory canonical padding.
///
/// # Errors
///
/// Returns a [`DecodeError`] for non-alphabet characters, bad padding,
/// impossible lengths, or non-zero residual bits.
pub fn decode(input: impl AsRef<[u8]>) -> Result<Vec<u8>, DecodeError> {
    STANDARD.decode(input)
}

/// Encode bytes with the URL-safe alphabet, without padding.
pub fn encode_url(data: impl AsRef<[u8]>) -> String {
    URL_SAFE_NO_PAD.encode(data)
}

/// Decode a URL-safe string. Padding must be omitted.
///
/// # Errors
///
/// Returns a [`DecodeError`] for non-alphabet characters (including `.` and
/// `=`), impossible lengths, or non-zero residual bits.
pub fn decode_url(input: impl AsRef<[u8]>) -> Result<Vec<u8>, DecodeError> {
    URL_SAFE_NO_PAD.decode(input)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_round_trip() {
        assert_eq!(encode(b"f"), "Zg==");
        assert_eq!(encode(b"fo"), "Zm8=");
        assert_eq!(encode(b"foo"), "Zm9v");
        assert_eq!(decode("Zg==").unwrap(), b"f");
        assert_eq!(decode("Zm8=").unwrap(), b"fo");
        assert_eq!(decode("Zm9v").unwrap(), b"foo");
    }

    #[test]
    fn test_empty_decodes_to_empty() {
        assert_eq!(decode("").unwrap(), Vec::<u8>::new());
        assert_eq!(decode_url("").unwrap(), Vec::<u8>::new());
    }

    #[test]
    fn test_residual_bits_must_be_zero() {
        // 4n+2 inputs leave 4 residual bits, 4n+3 inputs leave 2; both must
        // be zero for the encoding to be canonical.
        assert!(decode("Zh==").is_err());
        assert!(decode("Zm9=").is_err());
        assert_eq!(decode("Zg==").unwrap(), b"f");

        assert!(decode_url("Zh").is_err());
        assert!(decode_url("Zm9").is_err());
        assert_eq!(decode_url("Zg").unwrap(), b"f");
    }

    #[test]
    fn test_length_one_mod_four_rejected() {
        assert!(decode("A").is_err());
        assert!(decode("AAAAB").is_err());
        assert!(decode_url("A").is_err());
        assert!(decode_url("AAAAB").is_err());
    }

    #[test]
    fn test_non_alphabet_characters_rejected() {
        assert!(decode("Zm9v.A==").is_err());
        assert!(decode("Zm9v-A==").is_err());
        assert!(decode_url("Zm9v.").is_err());
        assert!(decode_url("Zm+v").is_err());
        assert!(decode_url("Zm/v").is_err());
    }

    #[test]
    fn test_url_safe_rejects_padding() {
        assert!(decode_url("Zg==").is_err());
        assert!(decode_url("Zm8=").is_err());
    }

    #[test]
    fn test_standard_requires_padding() {
        assert!(decode("Zg").is_err());
        assert!(decode("Zm8").is_err());
    }

    #[test]
    fn test_alphabet_substitution() {
        // 0xfb 0xef forces characters from the alphabet-specific range.
        let bytes = [0xfbu8, 0xef, 0xbe];
        assert_eq!(encode(bytes), "++++");
        assert_eq!(encode_url(bytes), "----");
        assert_eq!(decode_url("----").unwrap(), bytes);
        assert_eq!(decode_url("__--").unwrap(), [0xffu8, 0xff, 0xbe]);
    }

    mod proptests {
        use proptest::prelude::*;

        use super::*;

        proptest! {
            /// Decoding an encoding must reproduce the input bytes, for both
            /// alphabets.
            #[test]
            fn round_trip(bytes in proptest::collection::vec(any::<u8>(), 0..256)) {
                prop_assert_eq!(decode(encode(&bytes)).unwrap(), bytes.clone());
                prop_assert_eq!(decode_url(encode_url(&bytes)).unwrap(), bytes);
            }

            /// Every valid encoding is the canonical one: re-encoding the
            /// decoded bytes reproduces the original string.
            #[test]
            fn canonical_re_encode(bytes in proptest::collection::vec(any::<u8>(), 0..256)) {
                let s = encode_url(&bytes);
                prop_assert_eq!(encode_url(decode_url(&s).unwrap()), s);
            }

            /// The URL-safe decoder never panics on arbitrary input.
            #[test]
            fn decode_total(s in ".*") {
                let _ = decode_url(&s);
                let _ = decode(&s);
            }
        }
    }
}
