// src/transport/mod.rs
mod options;
mod tls;

pub use options::{
    Authenticator, BasicAuth, RequestOptions, ServiceAccountAuth, TlsMaterial, AUTHORIZATION,
};
