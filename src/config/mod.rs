// src/config/mod.rs
mod bootstrap;
mod env;

pub use bootstrap::{
    from_file, Bootstrap, Client, DEFAULT_SERVER, KUBECONFIG_ENV, SERVICEACCOUNT_ROOT,
    SERVICE_HOST_ENV, SERVICE_PORT_ENV,
};
pub use env::{EnvProvider, MapEnv, ProcessEnv};
