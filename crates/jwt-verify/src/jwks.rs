//! Verification key-set decoding.
//!
//! [`Jwks::create_from`] turns one of three caller-selected input shapes into
//! a list of typed public keys:
//!
//! - [`KeyFormat::Jwks`]: an RFC 7517 document (`{"keys": [...]}`), or an
//!   X.509 bundle (`{kid: PEM-certificate, ...}`) when there is no `keys`
//!   member;
//! - [`KeyFormat::Pem`]: a bare base64 body (no armor) holding an RSA
//!   PKCS#1 public key;
//! - [`KeyFormat::Pkcs8`]: a PEM-armored SubjectPublicKeyInfo, RSA or EC.
//!
//! Construction records the *first* failure it encounters and keeps any keys
//! extracted before it, so callers get both a terminal status and
//! best-effort diagnostics. A [`Jwks`] with a recorded status must not be
//! used for verification.

use rsa::{BigUint, RsaPublicKey, pkcs1::DecodeRsaPublicKey};
use serde_json::{Map, Value};

use crate::{
    base64,
    crypto::EcKey,
    json::{FindError, ObjectReader},
    status::{FirstFailure, Status},
};

const CERT_PREFIX: &str = "-----BEGIN CERTIFICATE-----\n";
const CERT_SUFFIX: &str = "\n-----END CERTIFICATE-----\n";

/// The shape of a key-set input, selected by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyFormat {
    /// JSON text: an RFC 7517 key set or an X.509 certificate bundle.
    Jwks,
    /// A bare base64 body containing an RSA PKCS#1 public key.
    Pem,
    /// A PEM-armored SubjectPublicKeyInfo (RSA or EC).
    Pkcs8,
}

/// Materialized key of one concrete kind; the verifier dispatches on this tag.
#[derive(Debug, Clone)]
pub enum KeyMaterial {
    /// An RSA public key, serving RS* and PS* tokens.
    Rsa(RsaPublicKey),
    /// An ECDSA public key on a specific curve, serving ES* tokens.
    Ec(EcKey),
    /// A raw symmetric secret, serving HS* tokens.
    Hmac(Vec<u8>),
    /// An Ed25519 public key, serving EdDSA tokens.
    Okp(ed25519_dalek::VerifyingKey),
}

/// One verification key extracted from a key-set input.
#[derive(Debug, Clone)]
pub struct Pubkey {
    /// Key type: `RSA`, `EC`, `oct`, or `OKP`. X.509-imported keys record
    /// the synthetic `RSA`.
    pub kty: String,
    /// Key identifier, empty when not specified.
    pub kid: String,
    /// Whether the input carried a `kid`.
    pub kid_specified: bool,
    /// Advertised algorithm, empty when not specified. When present it
    /// constrains which token `alg` values this key may verify.
    pub alg: String,
    /// Whether the input carried an `alg`.
    pub alg_specified: bool,
    /// Curve name for EC (`P-256`/`P-384`/`P-521`) and OKP (`Ed25519`) keys,
    /// empty otherwise.
    pub crv: String,
    /// True for keys built from a bare PEM input; such keys bypass kid/alg
    /// filtering during key selection.
    pub pem_format: bool,
    /// The concrete key material.
    pub material: KeyMaterial,
}

/// An ordered set of verification keys plus the first construction failure.
#[derive(Debug, Clone, Default)]
pub struct Jwks {
    keys: Vec<Pubkey>,
    status: Option<Status>,
}

impl Jwks {
    /// Build a key set from `data` interpreted per `format`.
    ///
    /// Never panics; all failures are recorded in [`status`](Self::status).
    pub fn create_from(data: &str, format: KeyFormat) -> Jwks {
        let jwks = match format {
            KeyFormat::Jwks => Self::create_from_jwks(data),
            KeyFormat::Pem => Self::create_from_pem(data),
            KeyFormat::Pkcs8 => Self::create_from_pkcs8(data),
        };
        if let Some(status) = jwks.status {
            tracing::warn!(%status, ?format, "key set construction failed");
        }
        jwks
    }

    /// The extracted keys, in input order.
    pub fn keys(&self) -> &[Pubkey] {
        &self.keys
    }

    /// The first failure recorded during construction, if any.
    pub fn status(&self) -> Option<Status> {
        self.status
    }

    /// True when construction recorded no failure.
    pub fn is_ok(&self) -> bool {
        self.status.is_none()
    }

    fn create_from_jwks(data: &str) -> Jwks {
        let mut failure = FirstFailure::default();
        let mut keys = Vec::new();

        let parsed: Result<Value, _> = serde_json::from_str(data);
        match parsed.as_ref().map(Value::as_object) {
            Ok(Some(root)) => match root.get("keys") {
                None => match extract_x509_bundle(root) {
                    Ok(bundle) => keys = bundle,
                    Err(status) => failure.record(status),
                },
                Some(Value::Array(items)) => {
                    for item in items {
                        // Non-object entries are skipped, matching RFC 7517's
                        // instruction to ignore unrecognized members.
                        let Some(object) = item.as_object() else {
                            continue;
                        };
                        match extract_jwk(object) {
                            Ok(key) => keys.push(key),
                            Err(status) => {
                                failure.record(status);
                                break;
                            }
                        }
                    }
                }
                Some(_) => failure.record(Status::BadKeys),
            },
            _ => failure.record(Status::ParseError),
        }

        if keys.is_empty() {
            failure.record(Status::NoValidKeys);
        }
        Jwks { keys, status: failure.get() }
    }

    fn create_from_pem(data: &str) -> Jwks {
        let mut failure = FirstFailure::default();
        let mut keys = Vec::new();

        match pubkey_from_bare_pem(data) {
            Ok(key) => keys.push(key),
            Err(status) => failure.record(status),
        }
        Jwks { keys, status: failure.get() }
    }

    fn create_from_pkcs8(data: &str) -> Jwks {
        let mut failure = FirstFailure::default();
        let mut keys = Vec::new();

        match pubkey_from_pkcs8_pem(data) {
            Ok(key) => keys.push(key),
            Err(status) => failure.record(status),
        }
        Jwks { keys, status: failure.get() }
    }
}

/// Extract one key from a JWK object, dispatching on `kty`.
fn extract_jwk(object: &Map<String, Value>) -> Result<Pubkey, Status> {
    let reader = ObjectReader::new(object);

    let kty = match reader.get_string("kty") {
        Ok(s) => s.to_owned(),
        Err(FindError::Missing) => return Err(Status::MissingKty),
        Err(_) => return Err(Status::BadKty),
    };
    // kid and alg are optional; a present-but-non-string value is ignored
    // rather than rejected, and only a successful read sets the flag.
    let (kid, kid_specified) = match reader.get_string("kid") {
        Ok(s) => (s.to_owned(), true),
        Err(_) => (String::new(), false),
    };
    let (alg, alg_specified) = match reader.get_string("alg") {
        Ok(s) => (s.to_owned(), true),
        Err(_) => (String::new(), false),
    };

    let mut key = Pubkey {
        kty,
        kid,
        kid_specified,
        alg,
        alg_specified,
        crv: String::new(),
        pem_format: false,
        material: KeyMaterial::Hmac(Vec::new()),
    };

    match key.kty.as_str() {
        "RSA" => extract_rsa_jwk(&reader, &mut key)?,
        "EC" => extract_ec_jwk(&reader, &mut key)?,
        "oct" => extract_oct_jwk(&reader, &mut key)?,
        "OKP" => extract_okp_jwk(&reader, &mut key)?,
        _ => return Err(Status::NotImplementedKty),
    }
    Ok(key)
}

fn extract_rsa_jwk(reader: &ObjectReader<'_>, key: &mut Pubkey) -> Result<(), Status> {
    if key.alg_specified && !(key.alg.starts_with("RS") || key.alg.starts_with("PS")) {
        return Err(Status::RsaKeyBadAlg);
    }

    let n_str = match reader.get_string("n") {
        Ok(s) => s,
        Err(FindError::Missing) => return Err(Status::RsaKeyMissingN),
        Err(_) => return Err(Status::RsaKeyBadN),
    };
    let e_str = match reader.get_string("e") {
        Ok(s) => s,
        Err(FindError::Missing) => return Err(Status::RsaKeyMissingE),
        Err(_) => return Err(Status::RsaKeyBadE),
    };

    let n = base64::decode_url(n_str).map_err(|_| Status::RsaParseError)?;
    let e = base64::decode_url(e_str).map_err(|_| Status::RsaParseError)?;

    let e = BigUint::from_bytes_be(&e);
    // Only the two standard public exponents are accepted; anything else is
    // a pathological key.
    if e != BigUint::from(3u32) && e != BigUint::from(65537u32) {
        return Err(Status::RsaParseError);
    }

    let public = RsaPublicKey::new(BigUint::from_bytes_be(&n), e)
        .map_err(|_| Status::RsaParseError)?;
    key.material = KeyMaterial::Rsa(public);
    Ok(())
}

fn extract_ec_jwk(reader: &ObjectReader<'_>, key: &mut Pubkey) -> Result<(), Status> {
    if key.alg_specified && !key.alg.starts_with("ES") {
        return Err(Status::EcKeyBadAlg);
    }

    let mut crv = match reader.get_string("crv") {
        Ok(s) => s.to_owned(),
        Err(FindError::Missing) => String::new(),
        Err(_) => return Err(Status::EcKeyBadCrv),
    };

    if key.alg_specified {
        let expected = match key.alg.as_str() {
            "ES256" => "P-256",
            "ES384" => "P-384",
            "ES512" => "P-521",
            _ => return Err(Status::EcKeyAlgOrCrvUnsupported),
        };
        if crv.is_empty() {
            crv = expected.to_owned();
        } else if crv != expected {
            return Err(Status::AlgNotCompatibleWithCrv);
        }
    } else if crv.is_empty() {
        crv = "P-256".to_owned();
    }
    if !matches!(crv.as_str(), "P-256" | "P-384" | "P-521") {
        return Err(Status::EcKeyAlgOrCrvUnsupported);
    }

    let x_str = match reader.get_string("x") {
        Ok(s) => s,
        Err(FindError::Missing) => return Err(Status::EcKeyMissingX),
        Err(_) => return Err(Status::EcKeyBadX),
    };
    let y_str = match reader.get_string("y") {
        Ok(s) => s,
        Err(FindError::Missing) => return Err(Status::EcKeyMissingY),
        Err(_) => return Err(Status::EcKeyBadY),
    };

    let x = base64::decode_url(x_str).map_err(|_| Status::EcXorYBadBase64)?;
    let y = base64::decode_url(y_str).map_err(|_| Status::EcXorYBadBase64)?;

    let point = EcKey::from_affine_coordinates(&crv, &x, &y).ok_or(Status::EcParseError)?;
    key.crv = crv;
    key.material = KeyMaterial::Ec(point);
    Ok(())
}

fn extract_oct_jwk(reader: &ObjectReader<'_>, key: &mut Pubkey) -> Result<(), Status> {
    if key.alg_specified && !matches!(key.alg.as_str(), "HS256" | "HS384" | "HS512") {
        return Err(Status::HmacKeyBadAlg);
    }

    let k_str = match reader.get_string("k") {
        Ok(s) => s,
        Err(FindError::Missing) => return Err(Status::HmacKeyMissingK),
        Err(_) => return Err(Status::HmacKeyBadK),
    };
    let secret = base64::decode_url(k_str).map_err(|_| Status::OctBadBase64)?;
    if secret.is_empty() {
        return Err(Status::OctBadBase64);
    }
    key.material = KeyMaterial::Hmac(secret);
    Ok(())
}

fn extract_okp_jwk(reader: &ObjectReader<'_>, key: &mut Pubkey) -> Result<(), Status> {
    if key.alg_specified && key.alg != "EdDSA" {
        return Err(Status::OkpKeyBadAlg);
    }

    let crv = match reader.get_string("crv") {
        Ok(s) => s.to_owned(),
        Err(FindError::Missing) => "Ed25519".to_owned(),
        Err(_) => return Err(Status::OkpKeyBadCrv),
    };
    if crv != "Ed25519" {
        return Err(Status::OkpKeyCrvUnsupported);
    }

    let x_str = match reader.get_string("x") {
        Ok(s) => s,
        Err(FindError::Missing) => return Err(Status::OkpKeyMissingX),
        Err(_) => return Err(Status::OkpKeyBadX),
    };
    let x = base64::decode_url(x_str).map_err(|_| Status::OkpXBadBase64)?;
    let x: [u8; 32] = x.as_slice().try_into().map_err(|_| Status::OkpXWrongLength)?;
    let public =
        ed25519_dalek::VerifyingKey::from_bytes(&x).map_err(|_| Status::OkpXWrongLength)?;

    key.crv = crv;
    key.material = KeyMaterial::Okp(public);
    Ok(())
}

/// Recognize and extract an X.509 certificate bundle: an object whose every
/// member is `kid: PEM-certificate`. The shape check runs over the whole
/// object before any certificate is parsed, so a non-bundle object fails
/// with [`Status::NoKeys`] rather than a certificate error.
fn extract_x509_bundle(root: &Map<String, Value>) -> Result<Vec<Pubkey>, Status> {
    let mut entries = Vec::with_capacity(root.len());
    for (kid, value) in root {
        let Some(pem) = value.as_str() else {
            return Err(Status::NoKeys);
        };
        if !(pem.starts_with(CERT_PREFIX) && pem.ends_with(CERT_SUFFIX)) {
            return Err(Status::NoKeys);
        }
        entries.push((kid, pem));
    }
    if entries.is_empty() {
        return Err(Status::NoKeys);
    }

    let mut keys = Vec::with_capacity(entries.len());
    for (kid, pem) in entries {
        let material = material_from_certificate(pem)?;
        keys.push(Pubkey {
            kty: "RSA".to_owned(),
            kid: kid.clone(),
            kid_specified: true,
            alg: String::new(),
            alg_specified: false,
            crv: String::new(),
            pem_format: false,
            material,
        });
    }
    Ok(keys)
}

/// Extract the subject public key from one PEM certificate.
fn material_from_certificate(pem: &str) -> Result<KeyMaterial, Status> {
    use x509_cert::{Certificate, der::DecodePem};

    let cert = Certificate::from_pem(pem.as_bytes()).map_err(|_| Status::X509ParseError)?;
    let spki = &cert.tbs_certificate.subject_public_key_info;
    let alg_oid = spki.algorithm.oid;
    let key_bytes = spki
        .subject_public_key
        .as_bytes()
        .ok_or(Status::X509GetPubkeyError)?;

    if alg_oid == const_oid::db::rfc5912::RSA_ENCRYPTION {
        let public =
            RsaPublicKey::from_pkcs1_der(key_bytes).map_err(|_| Status::X509GetPubkeyError)?;
        return Ok(KeyMaterial::Rsa(public));
    }
    if alg_oid == const_oid::db::rfc5912::ID_EC_PUBLIC_KEY {
        let crv = spki
            .algorithm
            .parameters
            .as_ref()
            .and_then(|params| params.decode_as::<const_oid::ObjectIdentifier>().ok())
            .and_then(|oid| curve_name_for_oid(&oid))
            .ok_or(Status::X509GetPubkeyError)?;
        let point =
            EcKey::from_sec1_bytes(crv, key_bytes).ok_or(Status::X509GetPubkeyError)?;
        return Ok(KeyMaterial::Ec(point));
    }
    Err(Status::X509GetPubkeyError)
}

/// Build the single wildcard key of the bare-PEM path.
fn pubkey_from_bare_pem(data: &str) -> Result<Pubkey, Status> {
    let der = base64::decode(data.trim()).map_err(|_| Status::PemBadBase64)?;
    if der.is_empty() {
        return Err(Status::PemBadBase64);
    }
    let public = RsaPublicKey::from_pkcs1_der(&der).map_err(|_| Status::PemParseError)?;
    Ok(Pubkey {
        kty: "RSA".to_owned(),
        kid: String::new(),
        kid_specified: false,
        alg: String::new(),
        alg_specified: false,
        crv: String::new(),
        pem_format: true,
        material: KeyMaterial::Rsa(public),
    })
}

/// Parse a PEM-armored SubjectPublicKeyInfo and dispatch on its algorithm OID.
fn pubkey_from_pkcs8_pem(data: &str) -> Result<Pubkey, Status> {
    use der::Document;
    use spki::SubjectPublicKeyInfoRef;

    let (label, document) =
        Document::from_pem(data.trim()).map_err(|_| Status::Pkcs8ParseError)?;
    if label != "PUBLIC KEY" {
        return Err(Status::Pkcs8ParseError);
    }
    let spki = SubjectPublicKeyInfoRef::try_from(document.as_bytes())
        .map_err(|_| Status::Pkcs8ParseError)?;
    let key_bytes = spki
        .subject_public_key
        .as_bytes()
        .ok_or(Status::Pkcs8ParseError)?;

    let (material, crv, kty) = if spki.algorithm.oid == const_oid::db::rfc5912::RSA_ENCRYPTION {
        let public =
            RsaPublicKey::from_pkcs1_der(key_bytes).map_err(|_| Status::Pkcs8ParseError)?;
        (KeyMaterial::Rsa(public), "", "RSA")
    } else if spki.algorithm.oid == const_oid::db::rfc5912::ID_EC_PUBLIC_KEY {
        let crv = spki
            .algorithm
            .parameters
            .and_then(|params| params.decode_as::<const_oid::ObjectIdentifier>().ok())
            .and_then(|oid| curve_name_for_oid(&oid))
            .ok_or(Status::Pkcs8ParseError)?;
        let point = EcKey::from_sec1_bytes(crv, key_bytes).ok_or(Status::Pkcs8ParseError)?;
        (KeyMaterial::Ec(point), crv, "EC")
    } else {
        return Err(Status::Pkcs8NotImplementedKty);
    };

    Ok(Pubkey {
        kty: kty.to_owned(),
        kid: String::new(),
        kid_specified: false,
        alg: String::new(),
        alg_specified: false,
        crv: crv.to_owned(),
        pem_format: false,
        material,
    })
}

fn curve_name_for_oid(oid: &const_oid::ObjectIdentifier) -> Option<&'static str> {
    use const_oid::db::rfc5912::{SECP_256_R_1, SECP_384_R_1, SECP_521_R_1};
    if *oid == SECP_256_R_1 {
        Some("P-256")
    } else if *oid == SECP_384_R_1 {
        Some("P-384")
    } else if *oid == SECP_521_R_1 {
        Some("P-521")
    } else {
        None
    }
}
