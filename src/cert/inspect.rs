// src/cert/inspect.rs
use chrono::{DateTime, Duration, TimeZone, Utc};
use openssl::hash::{hash, MessageDigest};
use openssl::x509::X509;
use serde::Serialize;
use std::fmt;
use x509_parser::prelude::{FromDer, ParsedExtension, X509Certificate};

use crate::error::{KubeConfigError, Result};

#[derive(Debug, Clone, Serialize)]
pub struct CertificateSummary {
    pub subject: String,
    pub issuer: String,
    pub not_before: DateTime<Utc>,
    pub not_after: DateTime<Utc>,
    pub serial: String,
    pub fingerprint: String,
    pub is_ca: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CertificateStatus {
    Valid,
    ExpiringSoon,
    Expired,
}

impl fmt::Display for CertificateStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Valid => "Valid",
            Self::ExpiringSoon => "ExpiringSoon",
            Self::Expired => "Expired",
        };
        f.write_str(label)
    }
}

impl CertificateSummary {
    pub fn status(&self, now: DateTime<Utc>) -> CertificateStatus {
        if self.not_after < now {
            CertificateStatus::Expired
        } else if self.not_after - now < Duration::days(30) {
            CertificateStatus::ExpiringSoon
        } else {
            CertificateStatus::Valid
        }
    }
}

/// Summarises every certificate in a PEM bundle (or a single DER blob).
pub fn inspect_pem(material: &[u8]) -> Result<Vec<CertificateSummary>> {
    let ders = if material.starts_with(b"-----BEGIN") {
        X509::stack_from_pem(material)?
            .iter()
            .map(|cert| cert.to_der())
            .collect::<std::result::Result<Vec<_>, _>>()?
    } else {
        vec![material.to_vec()]
    };

    ders.iter().map(|der| summarize(der)).collect()
}

fn summarize(der: &[u8]) -> Result<CertificateSummary> {
    let (_remainder, cert) = X509Certificate::from_der(der)
        .map_err(|e| KubeConfigError::InvalidCertificate { reason: e.to_string() })?;

    let is_ca = cert
        .extensions()
        .iter()
        .find_map(|ext| match ext.parsed_extension() {
            ParsedExtension::BasicConstraints(bc) => Some(bc.ca),
            _ => None,
        })
        .unwrap_or(false);

    Ok(CertificateSummary {
        subject: cert.subject().to_string(),
        issuer: cert.issuer().to_string(),
        not_before: timestamp(cert.validity().not_before.timestamp())?,
        not_after: timestamp(cert.validity().not_after.timestamp())?,
        serial: hex::encode(cert.raw_serial()),
        fingerprint: hex::encode(hash(MessageDigest::sha256(), der)?),
        is_ca,
    })
}

fn timestamp(seconds: i64) -> Result<DateTime<Utc>> {
    Utc.timestamp_opt(seconds, 0)
        .single()
        .ok_or_else(|| KubeConfigError::InvalidCertificate {
            reason: format!("timestamp {} out of range", seconds),
        })
}
