// src/testing.rs
use chrono::{Duration, Utc};
use openssl::asn1::Asn1Time;
use openssl::bn::BigNum;
use openssl::hash::MessageDigest;
use openssl::pkey::PKey;
use openssl::rsa::Rsa;
use openssl::x509::extension::BasicConstraints;
use openssl::x509::{X509NameBuilder, X509};

/// Self-signed CA certificate valid from now for `days`, as (cert, key) PEM.
pub(crate) fn self_signed(common_name: &str, days: i64) -> (Vec<u8>, Vec<u8>) {
    self_signed_at(common_name, 0, days)
}

/// Self-signed CA certificate whose validity window is given in days
/// relative to now.
pub(crate) fn self_signed_at(common_name: &str, from_days: i64, to_days: i64) -> (Vec<u8>, Vec<u8>) {
    let key = PKey::from_rsa(Rsa::generate(2048).unwrap()).unwrap();

    let mut name = X509NameBuilder::new().unwrap();
    name.append_entry_by_text("CN", common_name).unwrap();
    let name = name.build();

    let not_before = (Utc::now() + Duration::days(from_days)).timestamp();
    let not_after = (Utc::now() + Duration::days(to_days)).timestamp();

    let mut builder = X509::builder().unwrap();
    builder.set_version(2).unwrap();
    let serial = BigNum::from_u32(1).unwrap().to_asn1_integer().unwrap();
    builder.set_serial_number(&serial).unwrap();
    builder.set_subject_name(&name).unwrap();
    builder.set_issuer_name(&name).unwrap();
    builder.set_pubkey(&key).unwrap();
    builder
        .set_not_before(&Asn1Time::from_unix(not_before as _).unwrap())
        .unwrap();
    builder
        .set_not_after(&Asn1Time::from_unix(not_after as _).unwrap())
        .unwrap();
    builder
        .append_extension(BasicConstraints::new().critical().ca().build().unwrap())
        .unwrap();
    builder.sign(&key, MessageDigest::sha256()).unwrap();

    (
        builder.build().to_pem().unwrap(),
        key.private_key_to_pem_pkcs8().unwrap(),
    )
}
