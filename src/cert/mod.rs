// src/cert/mod.rs
pub mod inspect;

pub use inspect::{inspect_pem, CertificateStatus, CertificateSummary};
