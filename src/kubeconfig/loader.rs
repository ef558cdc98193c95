// src/kubeconfig/loader.rs
use log::debug;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_yaml::Value;

use super::named::unwrap_entry;
use super::types::{Cluster, Context, User};
use crate::error::{KubeConfigError, Result};

pub const SUPPORTED_API_VERSION: &str = "v1";

#[derive(Deserialize)]
struct RawDocument {
    #[serde(rename = "apiVersion")]
    api_version: Option<Value>,
    clusters: Option<Vec<Value>>,
    users: Option<Vec<Value>>,
    contexts: Option<Vec<Value>>,
    #[serde(rename = "current-context")]
    current_context: Option<String>,
}

/// Records of one kubeconfig document, in source order.
#[derive(Debug, Default)]
pub(crate) struct Document {
    pub clusters: Vec<Cluster>,
    pub users: Vec<User>,
    pub contexts: Vec<Context>,
    pub current_context: Option<String>,
}

pub(crate) fn parse_document(text: &str) -> Result<Document> {
    let raw: RawDocument = serde_yaml::from_str(text)?;

    match raw.api_version.as_ref().and_then(Value::as_str) {
        Some(SUPPORTED_API_VERSION) => {}
        _ => {
            let found = match raw.api_version {
                Some(Value::String(s)) => s,
                Some(other) => serde_yaml::to_string(&other)?.trim().to_string(),
                None => "<missing>".to_string(),
            };
            return Err(KubeConfigError::UnsupportedVersion { found });
        }
    }

    let document = Document {
        clusters: records(raw.clusters.unwrap_or_default(), "cluster", |c: &mut Cluster, n| c.name = n)?,
        users: records(raw.users.unwrap_or_default(), "user", |u: &mut User, n| u.name = n)?,
        contexts: records(raw.contexts.unwrap_or_default(), "context", |c: &mut Context, n| c.name = n)?,
        current_context: raw.current_context.filter(|c| !c.is_empty()),
    };

    debug!(
        "Parsed kubeconfig: {} clusters, {} users, {} contexts",
        document.clusters.len(),
        document.users.len(),
        document.contexts.len()
    );

    Ok(document)
}

fn records<T, F>(entries: Vec<Value>, key: &str, set_name: F) -> Result<Vec<T>>
where
    T: DeserializeOwned,
    F: Fn(&mut T, String),
{
    entries
        .iter()
        .map(|entry| {
            let name = entry
                .get("name")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string();
            let mut record: T = serde_yaml::from_value(unwrap_entry(entry, key).clone())?;
            set_name(&mut record, name);
            Ok(record)
        })
        .collect()
}
