// src/kubeconfig/types.rs
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A cluster entry. `name` comes from the list entry, everything else from
/// its `cluster` payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Cluster {
    #[serde(skip_deserializing)]
    pub name: String,
    #[serde(default)]
    pub server: String,
    #[serde(rename = "insecure-skip-tls-verify", default)]
    pub skip_tls_verify: bool,
    #[serde(rename = "certificate-authority")]
    pub ca_file: Option<String>,
    #[serde(rename = "certificate-authority-data")]
    pub ca_data: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct User {
    #[serde(skip_deserializing)]
    pub name: String,
    #[serde(rename = "client-certificate")]
    pub cert_file: Option<String>,
    #[serde(rename = "client-certificate-data")]
    pub cert_data: Option<String>,
    #[serde(rename = "client-key")]
    pub key_file: Option<String>,
    #[serde(rename = "client-key-data")]
    pub key_data: Option<String>,
    pub token: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    #[serde(rename = "auth-provider")]
    pub auth_provider: Option<AuthProvider>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Context {
    #[serde(skip_deserializing)]
    pub name: String,
    #[serde(default)]
    pub cluster: String,
    #[serde(default)]
    pub user: String,
    pub namespace: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AuthProvider {
    #[serde(default)]
    pub name: String,
    pub config: Option<AuthProviderConfig>,
}

/// Options of an exec-style auth provider.
///
/// This is the only part of a loaded kubeconfig that changes after load:
/// a token refresh overwrites `access_token` in place. `expiry` is left as it
/// was, so once a refresh has happened every later resolution refreshes again.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct AuthProviderConfig {
    pub access_token: Option<String>,
    pub expiry: Option<String>,
    pub cmd_path: Option<String>,
    pub cmd_args: Option<String>,
    pub token_key: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_yaml::Value>,
}

impl AuthProviderConfig {
    /// Full helper command line: `cmd-path` followed by `cmd-args`, if any.
    pub fn command_line(&self) -> Option<String> {
        let path = self.cmd_path.as_deref().filter(|p| !p.is_empty())?;
        Some(match self.cmd_args.as_deref().filter(|a| !a.is_empty()) {
            Some(args) => format!("{} {}", path, args),
            None => path.to_string(),
        })
    }
}
