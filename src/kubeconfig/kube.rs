// src/kubeconfig/kube.rs
use log::debug;
use std::fs;
use std::path::Path;

use super::loader::parse_document;
use super::named::find_by_name;
use super::types::{Cluster, Context, User};
use crate::credentials::TokenRefresher;
use crate::error::{KubeConfigError, Result};

/// A loaded kubeconfig document.
///
/// Records are kept in source order and resolved by name when used, so a
/// context pointing at a missing cluster only fails once it is the active one.
#[derive(Debug, Clone, Default)]
pub struct KubeConfig {
    clusters: Vec<Cluster>,
    users: Vec<User>,
    contexts: Vec<Context>,
    current_context: Option<String>,
    refresher: TokenRefresher,
}

impl KubeConfig {
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| KubeConfigError::io(path, e))?;
        debug!("Loading kubeconfig from {}", path.display());
        Self::load_from_str(&text)
    }

    pub fn load_from_str(text: &str) -> Result<Self> {
        let document = parse_document(text)?;
        Ok(Self {
            clusters: document.clusters,
            users: document.users,
            contexts: document.contexts,
            current_context: document.current_context,
            refresher: TokenRefresher::default(),
        })
    }

    /// Replaces the helper runner and clock used for token refreshes.
    pub fn with_refresher(mut self, refresher: TokenRefresher) -> Self {
        self.refresher = refresher;
        self
    }

    pub fn clusters(&self) -> &[Cluster] {
        &self.clusters
    }

    pub fn users(&self) -> &[User] {
        &self.users
    }

    pub fn contexts(&self) -> &[Context] {
        &self.contexts
    }

    pub fn get_current_context(&self) -> Option<&str> {
        self.current_context.as_deref()
    }

    /// Switches the active context in memory. The name is not checked here;
    /// an unknown name fails on the next resolution.
    pub fn set_current_context(&mut self, name: impl Into<String>) {
        self.current_context = Some(name.into());
    }

    pub fn context_by_name(&self, name: &str) -> Option<&Context> {
        find_by_name(&self.contexts, name)
    }

    pub fn cluster_by_name(&self, name: &str) -> Option<&Cluster> {
        find_by_name(&self.clusters, name)
    }

    pub fn user_by_name(&self, name: &str) -> Option<&User> {
        find_by_name(&self.users, name)
    }

    pub fn current_context_object(&self) -> Result<&Context> {
        let name = self
            .current_context
            .as_deref()
            .ok_or_else(|| KubeConfigError::reference("current-context", ""))?;
        self.context_by_name(name)
            .ok_or_else(|| KubeConfigError::reference("context", name))
    }

    pub fn current_cluster(&self) -> Result<&Cluster> {
        let context = self.current_context_object()?;
        self.cluster_by_name(&context.cluster)
            .ok_or_else(|| KubeConfigError::reference("cluster", context.cluster.as_str()))
    }

    pub fn current_user(&self) -> Result<&User> {
        let context = self.current_context_object()?;
        self.user_by_name(&context.user)
            .ok_or_else(|| KubeConfigError::reference("user", context.user.as_str()))
    }

    /// Resolves the `Authorization` value for the current user.
    ///
    /// Side effect: when the auth-provider token is expired and a helper is
    /// configured, the helper's token is written back into the user's
    /// auth-provider `access-token`.
    pub fn authorization_token(&mut self) -> Result<Option<String>> {
        let user_name = self.current_context_object()?.user.clone();
        let user = self
            .users
            .iter_mut()
            .find(|u| u.name == user_name)
            .ok_or_else(|| KubeConfigError::reference("user", user_name.as_str()))?;
        self.refresher.authorization_token(user)
    }
}
