// src/config/bootstrap.rs
use log::{debug, info};
use std::fs;
use std::path::{Path, PathBuf};
use url::Url;

use super::env::{EnvProvider, ProcessEnv};
use crate::error::{KubeConfigError, Result};
use crate::kubeconfig::KubeConfig;
use crate::transport::{Authenticator, ServiceAccountAuth};

pub const SERVICEACCOUNT_ROOT: &str = "/var/run/secrets/kubernetes.io/serviceaccount";
pub const DEFAULT_SERVER: &str = "http://localhost:8080";

pub const KUBECONFIG_ENV: &str = "KUBECONFIG";
pub const SERVICE_HOST_ENV: &str = "KUBERNETES_SERVICE_HOST";
pub const SERVICE_PORT_ENV: &str = "KUBERNETES_SERVICE_PORT";

/// An API client that authenticates its requests through an [`Authenticator`].
pub trait Client {
    fn set_default_authentication(&mut self, auth: Box<dyn Authenticator>);
}

/// Builds a client for `path`: the client targets the current cluster's
/// server and authenticates with the loaded kubeconfig.
pub fn from_file<C, F>(path: impl AsRef<Path>, ctor: F) -> Result<C>
where
    C: Client,
    F: FnOnce(Url) -> C,
{
    let kc = KubeConfig::load_from_file(path)?;
    let server = kc.current_cluster()?.server.clone();
    let base = Url::parse(&server).map_err(|source| KubeConfigError::InvalidServer { server, source })?;

    let mut client = ctor(base);
    client.set_default_authentication(Box::new(kc));
    Ok(client)
}

/// Locates cluster credentials from the environment.
pub struct Bootstrap<E = ProcessEnv> {
    env: E,
    service_account_root: PathBuf,
}

impl Bootstrap<ProcessEnv> {
    pub fn from_process() -> Self {
        Self::new(ProcessEnv)
    }
}

impl<E: EnvProvider> Bootstrap<E> {
    pub fn new(env: E) -> Self {
        Self {
            env,
            service_account_root: PathBuf::from(SERVICEACCOUNT_ROOT),
        }
    }

    pub fn with_service_account_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.service_account_root = root.into();
        self
    }

    pub fn service_account_ca_path(&self) -> PathBuf {
        self.service_account_root.join("ca.crt")
    }

    pub fn service_account_token_path(&self) -> PathBuf {
        self.service_account_root.join("token")
    }

    pub fn home_dir(&self) -> Option<PathBuf> {
        self.env
            .var("HOME")
            .filter(|h| !h.is_empty())
            .map(PathBuf::from)
            .or_else(dirs::home_dir)
    }

    /// First entry of `KUBECONFIG`, if set.
    pub fn env_kubeconfig(&self) -> Option<PathBuf> {
        let value = self.env.var(KUBECONFIG_ENV)?;
        let separator = if cfg!(windows) { ';' } else { ':' };
        value
            .split(separator)
            .find(|p| !p.is_empty())
            .map(PathBuf::from)
    }

    /// `KUBECONFIG`, else `~/.kube/config` when that file exists.
    pub fn kubeconfig_path(&self) -> Option<PathBuf> {
        self.env_kubeconfig().or_else(|| {
            self.home_dir()
                .map(|home| home.join(".kube").join("config"))
                .filter(|path| path.exists())
        })
    }

    /// Builds a client from the service account mounted into a pod.
    pub fn from_cluster<C, F>(&self, ctor: F) -> Result<C>
    where
        C: Client,
        F: FnOnce(Url) -> C,
    {
        let host = self
            .env
            .var(SERVICE_HOST_ENV)
            .ok_or(KubeConfigError::MissingEnvironment { key: SERVICE_HOST_ENV })?;
        let port = self
            .env
            .var(SERVICE_PORT_ENV)
            .ok_or(KubeConfigError::MissingEnvironment { key: SERVICE_PORT_ENV })?;

        let ca_path = self.service_account_ca_path();
        let ca = fs::read(&ca_path).map_err(|e| KubeConfigError::io(&ca_path, e))?;
        let token_path = self.service_account_token_path();
        let token = fs::read_to_string(&token_path)
            .map_err(|e| KubeConfigError::io(&token_path, e))?
            .trim()
            .to_string();

        let server = if host.contains(':') {
            format!("https://[{}]:{}", host, port)
        } else {
            format!("https://{}:{}", host, port)
        };
        let base = Url::parse(&server).map_err(|source| KubeConfigError::InvalidServer { server, source })?;
        debug!("Using in-cluster service account against {}", base);

        let mut client = ctor(base);
        client.set_default_authentication(Box::new(ServiceAccountAuth { ca, token }));
        Ok(client)
    }

    /// Picks the first available source: `KUBECONFIG`, `~/.kube/config`,
    /// the in-cluster service account, then an unauthenticated local server.
    pub fn default_client<C, F>(&self, ctor: F) -> Result<C>
    where
        C: Client,
        F: FnOnce(Url) -> C,
    {
        if let Some(path) = self.kubeconfig_path() {
            info!("Using kubeconfig {}", path.display());
            return from_file(path, ctor);
        }

        if self.service_account_token_path().exists() {
            info!("Using in-cluster configuration");
            return self.from_cluster(ctor);
        }

        info!("No credentials found, falling back to {}", DEFAULT_SERVER);
        let base = Url::parse(DEFAULT_SERVER).map_err(|source| KubeConfigError::InvalidServer {
            server: DEFAULT_SERVER.to_string(),
            source,
        })?;
        Ok(ctor(base))
    }
}
