//! ES256/ES384/ES512 verification with generated keys on all three curves.
//!
//! ECDSA signatures ride in JOSE fixed-width `R || S` form (64/96/132 bytes);
//! the tests cover kid-scoped selection between same-curve keys, curve/alg
//! compatibility, and signature malleation.

mod common;

use common::{fuzz_jwt_signature, signed_token};
use jwt_verify::{Jwks, Jwt, KeyFormat, Status, base64::encode_url, verify_jwt_at};
use rand_core::OsRng;
use serde_json::{Value, json};
use signature::Signer;

/// One generated EC key pair exposed as a JWK object.
struct EcFixture {
    jwk: Value,
    sign: Box<dyn Fn(&[u8]) -> Vec<u8>>,
}

fn p256_fixture(kid: &str) -> EcFixture {
    let sk = p256::ecdsa::SigningKey::random(&mut OsRng);
    let point = sk.verifying_key().to_encoded_point(false);
    let jwk = json!({
        "kty": "EC",
        "alg": "ES256",
        "crv": "P-256",
        "kid": kid,
        "x": encode_url(point.x().expect("x")),
        "y": encode_url(point.y().expect("y")),
    });
    EcFixture {
        jwk,
        sign: Box::new(move |msg| {
            let sig: p256::ecdsa::Signature = sk.sign(msg);
            sig.to_bytes().to_vec()
        }),
    }
}

fn p384_fixture(kid: &str) -> EcFixture {
    let sk = p384::ecdsa::SigningKey::random(&mut OsRng);
    let point = sk.verifying_key().to_encoded_point(false);
    let jwk = json!({
        "kty": "EC",
        "alg": "ES384",
        "crv": "P-384",
        "kid": kid,
        "x": encode_url(point.x().expect("x")),
        "y": encode_url(point.y().expect("y")),
    });
    EcFixture {
        jwk,
        sign: Box::new(move |msg| {
            let sig: p384::ecdsa::Signature = sk.sign(msg);
            sig.to_bytes().to_vec()
        }),
    }
}

fn p521_fixture(kid: &str) -> EcFixture {
    let sk = p521::ecdsa::SigningKey::random(&mut OsRng);
    let point = p521::ecdsa::VerifyingKey::from(&sk).to_encoded_point(false);
    let jwk = json!({
        "kty": "EC",
        "alg": "ES512",
        "crv": "P-521",
        "kid": kid,
        "x": encode_url(point.x().expect("x")),
        "y": encode_url(point.y().expect("y")),
    });
    EcFixture {
        jwk,
        sign: Box::new(move |msg| {
            let sig: p521::ecdsa::Signature = sk.sign(msg);
            sig.to_bytes().to_vec()
        }),
    }
}

fn jwks_of(fixtures: &[&EcFixture]) -> Jwks {
    let keys: Vec<&Value> = fixtures.iter().map(|f| &f.jwk).collect();
    let jwks = Jwks::create_from(&json!({ "keys": keys }).to_string(), KeyFormat::Jwks);
    assert!(jwks.is_ok(), "status: {:?}", jwks.status());
    jwks
}

#[test]
fn all_curves_verify() {
    for (alg, fixture, sig_len) in [
        ("ES256", p256_fixture("k"), 64),
        ("ES384", p384_fixture("k"), 96),
        ("ES512", p521_fixture("k"), 132),
    ] {
        let token = signed_token(
            &json!({"alg": alg, "kid": "k"}),
            &json!({"iss": "https://example.com", "exp": 1501281058}),
            &*fixture.sign,
        );
        let jwt = Jwt::decode(&token).expect("decode");
        assert_eq!(jwt.signature.len(), sig_len, "alg={alg}");
        let jwks = jwks_of(&[&fixture]);
        assert_eq!(verify_jwt_at(&jwt, &jwks, 1), Ok(()), "alg={alg}");
    }
}

#[test]
fn kid_selects_between_same_curve_keys() {
    let abc = p256_fixture("abc");
    let xyz = p256_fixture("xyz");
    let jwks = jwks_of(&[&xyz, &abc]);

    let token = signed_token(
        &json!({"alg": "ES256", "kid": "abc"}),
        &json!({"iss": "https://example.com"}),
        &*abc.sign,
    );
    let jwt = Jwt::decode(&token).expect("decode");
    assert_eq!(verify_jwt_at(&jwt, &jwks, 1), Ok(()));

    // Claiming the other key's kid selects that key, whose material does
    // not verify this signature.
    let token = signed_token(
        &json!({"alg": "ES256", "kid": "xyz"}),
        &json!({"iss": "https://example.com"}),
        &*abc.sign,
    );
    let jwt = Jwt::decode(&token).expect("decode");
    assert_eq!(verify_jwt_at(&jwt, &jwks, 1), Err(Status::VerificationFail));
}

#[test]
fn curve_must_match_token_alg() {
    // An ES384 token finds no candidate among P-256 keys.
    let p256 = p256_fixture("k");
    let p384 = p384_fixture("k2");
    let token = signed_token(
        &json!({"alg": "ES384", "kid": "k2"}),
        &json!({"iss": "https://example.com"}),
        &*p384.sign,
    );
    let jwt = Jwt::decode(&token).expect("decode");

    let jwks = jwks_of(&[&p256]);
    assert_eq!(verify_jwt_at(&jwt, &jwks, 1), Err(Status::KidAlgMismatch));

    let jwks = jwks_of(&[&p256, &p384]);
    assert_eq!(verify_jwt_at(&jwt, &jwks, 1), Ok(()));
}

#[test]
fn es256_signature_fuzz() {
    let fixture = p256_fixture("k");
    let token = signed_token(
        &json!({"alg": "ES256", "kid": "k"}),
        &json!({"iss": "https://example.com"}),
        &*fixture.sign,
    );
    let jwt = Jwt::decode(&token).expect("decode");
    let jwks = jwks_of(&[&fixture]);
    assert_eq!(verify_jwt_at(&jwt, &jwks, 1), Ok(()));

    fuzz_jwt_signature(&jwt, |mutated| {
        assert_eq!(verify_jwt_at(mutated, &jwks, 1), Err(Status::VerificationFail));
    });
}

#[test]
fn key_without_alg_serves_by_curve() {
    let mut fixture = p256_fixture("k");
    fixture.jwk.as_object_mut().expect("object").remove("alg");
    let token = signed_token(
        &json!({"alg": "ES256", "kid": "k"}),
        &json!({"iss": "https://example.com"}),
        &*fixture.sign,
    );
    let jwt = Jwt::decode(&token).expect("decode");
    let jwks = jwks_of(&[&fixture]);
    assert_eq!(verify_jwt_at(&jwt, &jwks, 1), Ok(()));
}
