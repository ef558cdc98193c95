// src/lib.rs
//! Kubernetes client credential resolution.
//!
//! Loads a kubeconfig document, follows `current-context` to its cluster and
//! user, refreshes exec-helper tokens when they have expired, and writes the
//! resulting TLS material and `Authorization` header into [`RequestOptions`].

pub mod cert;
pub mod config;
pub mod credentials;
pub mod error;
pub mod kubeconfig;
pub mod transport;
pub mod utils;

#[cfg(test)]
pub(crate) mod testing;

pub use error::{KubeConfigError, Result};
pub use kubeconfig::{AuthProvider, AuthProviderConfig, Cluster, Context, KubeConfig, User};
pub use transport::{Authenticator, BasicAuth, RequestOptions};
