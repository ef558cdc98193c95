// src/kubeconfig/named.rs
//! Name-keyed lookups over kubeconfig lists.
//!
//! Kubeconfig lists are ordered, may contain duplicate names and are always
//! searched by name. The first entry with a matching name wins.

use serde_yaml::Value;

use super::types::{Cluster, Context, User};

pub trait Named {
    fn name(&self) -> &str;
}

impl Named for Cluster {
    fn name(&self) -> &str {
        &self.name
    }
}

impl Named for User {
    fn name(&self) -> &str {
        &self.name
    }
}

impl Named for Context {
    fn name(&self) -> &str {
        &self.name
    }
}

pub fn find_by_name<'a, T: Named>(list: &'a [T], name: &str) -> Option<&'a T> {
    list.iter().find(|item| item.name() == name)
}

/// Looks up `name` in a raw document list.
///
/// Entries are shaped `{name, <key>: {...}}`. When the matched entry carries
/// a non-empty `key` field, that payload is returned; otherwise the whole
/// entry is. `None` means no entry has that name.
pub fn find_object<'a>(list: &'a [Value], name: &str, key: &str) -> Option<&'a Value> {
    let entry = list
        .iter()
        .find(|entry| entry.get("name").and_then(Value::as_str) == Some(name))?;
    Some(unwrap_entry(entry, key))
}

/// Payload of a list entry under `key`, or the entry itself when the key is
/// missing or empty.
pub fn unwrap_entry<'a>(entry: &'a Value, key: &str) -> &'a Value {
    match entry.get(key) {
        Some(payload) if is_present(payload) => payload,
        _ => entry,
    }
}

fn is_present(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::String(s) => !s.is_empty(),
        Value::Number(n) => n.as_f64() != Some(0.0),
        _ => true,
    }
}
