// src/kubeconfig/mod.rs
mod kube;
mod loader;
pub mod named;
mod types;

pub use kube::KubeConfig;
pub use loader::SUPPORTED_API_VERSION;
pub use named::{find_by_name, find_object, Named};
pub use types::{AuthProvider, AuthProviderConfig, Cluster, Context, User};
