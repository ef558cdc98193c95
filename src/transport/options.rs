// src/transport/options.rs
use log::debug;
use std::collections::BTreeMap;

use crate::credentials::material_for;
use crate::error::Result;
use crate::kubeconfig::KubeConfig;

pub const AUTHORIZATION: &str = "Authorization";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BasicAuth {
    pub username: String,
    pub password: Option<String>,
}

/// Outbound request settings an HTTP client reads its TLS material and
/// credentials from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestOptions {
    pub ca: Option<Vec<u8>>,
    pub cert: Option<Vec<u8>>,
    pub key: Option<Vec<u8>>,
    pub headers: BTreeMap<String, String>,
    pub auth: Option<BasicAuth>,
    /// Verify the server certificate chain. Cleared for clusters marked
    /// `insecure-skip-tls-verify`.
    pub strict_ssl: bool,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self {
            ca: None,
            cert: None,
            key: None,
            headers: BTreeMap::new(),
            auth: None,
            strict_ssl: true,
        }
    }
}

impl RequestOptions {
    pub fn authorization(&self) -> Option<&str> {
        self.headers.get(AUTHORIZATION).map(String::as_str)
    }
}

/// Writes credentials into request options.
///
/// Implementations either fill in everything they own or return an error
/// and leave `opts` untouched.
pub trait Authenticator {
    fn apply_to_request(&mut self, opts: &mut RequestOptions) -> Result<()>;
}

/// TLS material of the current context, loaded from files or inline data.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TlsMaterial {
    pub ca: Option<Vec<u8>>,
    pub cert: Option<Vec<u8>>,
    pub key: Option<Vec<u8>>,
}

impl KubeConfig {
    pub fn https_credentials(&self) -> Result<TlsMaterial> {
        let cluster = self.current_cluster()?;
        let user = self.current_user()?;

        Ok(TlsMaterial {
            ca: material_for(
                "certificate-authority",
                cluster.ca_file.as_deref(),
                cluster.ca_data.as_deref(),
            )?,
            cert: material_for(
                "client-certificate",
                user.cert_file.as_deref(),
                user.cert_data.as_deref(),
            )?,
            key: material_for(
                "client-key",
                user.key_file.as_deref(),
                user.key_data.as_deref(),
            )?,
        })
    }
}

impl Authenticator for KubeConfig {
    /// Applies the current context's CA, client certificate/key, bearer
    /// token and basic auth to `opts`.
    ///
    /// May refresh the user's auth-provider token as a side effect, see
    /// [`KubeConfig::authorization_token`].
    fn apply_to_request(&mut self, opts: &mut RequestOptions) -> Result<()> {
        let skip_tls_verify = self.current_cluster()?.skip_tls_verify;
        let user = self.current_user()?;
        let basic = user.username.clone().map(|username| BasicAuth {
            username,
            password: user.password.clone(),
        });
        let material = self.https_credentials()?;
        let token = self.authorization_token()?;

        debug!(
            "Applying credentials of context {}: ca={} cert={} key={} token={} basic={}",
            self.get_current_context().unwrap_or_default(),
            material.ca.is_some(),
            material.cert.is_some(),
            material.key.is_some(),
            token.is_some(),
            basic.is_some()
        );

        if skip_tls_verify {
            opts.strict_ssl = false;
        }
        opts.ca = material.ca;
        opts.cert = material.cert;
        opts.key = material.key;
        if let Some(token) = token {
            opts.headers.insert(AUTHORIZATION.to_string(), token);
        }
        if basic.is_some() {
            opts.auth = basic;
        }

        Ok(())
    }
}

/// Credentials mounted into pods for their service account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceAccountAuth {
    pub ca: Vec<u8>,
    pub token: String,
}

impl Authenticator for ServiceAccountAuth {
    fn apply_to_request(&mut self, opts: &mut RequestOptions) -> Result<()> {
        opts.ca = Some(self.ca.clone());
        opts.headers
            .insert(AUTHORIZATION.to_string(), format!("Bearer {}", self.token));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credentials::{CommandRunner, HelperOutput, TokenRefresher};
    use crate::error::KubeConfigError;
    use base64::{engine::general_purpose, Engine as _};
    use std::io;

    struct FailingRunner;

    impl CommandRunner for FailingRunner {
        fn run(&self, _command: &str) -> io::Result<HelperOutput> {
            Ok(HelperOutput {
                code: Some(2),
                stdout: String::new(),
                stderr: "helper exploded".to_string(),
            })
        }
    }

    fn b64(data: &str) -> String {
        general_purpose::STANDARD.encode(data)
    }

    fn config(user_block: &str, insecure: bool) -> String {
        format!(
            r#"
apiVersion: v1
clusters:
- name: c
  cluster:
    server: https://k8s.example.com
    certificate-authority-data: {ca}
    insecure-skip-tls-verify: {insecure}
users:
- name: u
  user:
{user_block}
contexts:
- name: ctx
  context:
    cluster: c
    user: u
current-context: ctx
"#,
            ca = b64("CA-BYTES"),
            insecure = insecure,
            user_block = user_block
        )
    }

    #[test]
    fn test_applies_tls_material_and_token() {
        let user = format!(
            "    client-certificate-data: {}\n    client-key-data: {}\n    token: secret\n",
            b64("CERT-BYTES"),
            b64("KEY-BYTES")
        );
        let mut kc = KubeConfig::load_from_str(&config(&user, false)).unwrap();
        let mut opts = RequestOptions::default();

        kc.apply_to_request(&mut opts).unwrap();

        assert_eq!(opts.ca.as_deref(), Some(&b"CA-BYTES"[..]));
        assert_eq!(opts.cert.as_deref(), Some(&b"CERT-BYTES"[..]));
        assert_eq!(opts.key.as_deref(), Some(&b"KEY-BYTES"[..]));
        assert_eq!(opts.authorization(), Some("Bearer secret"));
        assert!(opts.strict_ssl);
        assert!(opts.auth.is_none());
    }

    #[test]
    fn test_basic_auth_and_insecure_cluster() {
        let user = "    username: admin\n    password: hunter2\n";
        let mut kc = KubeConfig::load_from_str(&config(user, true)).unwrap();
        let mut opts = RequestOptions::default();

        kc.apply_to_request(&mut opts).unwrap();

        assert!(!opts.strict_ssl);
        assert_eq!(
            opts.auth,
            Some(BasicAuth {
                username: "admin".to_string(),
                password: Some("hunter2".to_string()),
            })
        );
        assert_eq!(opts.authorization(), None);
    }

    #[test]
    fn test_basic_auth_and_token_together() {
        let user = "    username: admin\n    token: t0k3n\n";
        let mut kc = KubeConfig::load_from_str(&config(user, false)).unwrap();
        let mut opts = RequestOptions::default();

        kc.apply_to_request(&mut opts).unwrap();

        assert_eq!(opts.authorization(), Some("Bearer t0k3n"));
        assert_eq!(opts.auth.as_ref().map(|a| a.username.as_str()), Some("admin"));
        assert_eq!(opts.auth.as_ref().and_then(|a| a.password.clone()), None);
    }

    #[test]
    fn test_failed_refresh_leaves_options_untouched() {
        let user = r#"    client-certificate-data: Q0VSVA==
    auth-provider:
      name: gcp
      config:
        access-token: stale
        expiry: "2000-01-01T00:00:00Z"
        cmd-path: helper
        token-key: "{.token}"
"#;
        let mut kc = KubeConfig::load_from_str(&config(user, true))
            .unwrap()
            .with_refresher(TokenRefresher::new(FailingRunner));
        let mut opts = RequestOptions::default();

        let err = kc.apply_to_request(&mut opts).unwrap_err();

        assert!(matches!(err, KubeConfigError::RefreshCommand { .. }));
        assert_eq!(opts, RequestOptions::default());
    }

    #[test]
    fn test_service_account_auth() {
        let mut auth = ServiceAccountAuth {
            ca: b"SA-CA".to_vec(),
            token: "sa-token".to_string(),
        };
        let mut opts = RequestOptions::default();
        auth.apply_to_request(&mut opts).unwrap();
        assert_eq!(opts.ca.as_deref(), Some(&b"SA-CA"[..]));
        assert_eq!(opts.authorization(), Some("Bearer sa-token"));
    }
}
