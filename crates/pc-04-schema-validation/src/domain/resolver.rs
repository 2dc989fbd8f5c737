//! # Reference Resolver
//!
//! Replaces every `{"$ref": ...}` node with the value it points at, so the
//! compiled schemas are self-contained.
//!
//! ## Reference Forms
//!
//! - `#/components/schemas/Account`: pointer into the current document
//! - `common.yaml#/Money`: pointer into another file, relative to the
//!   directory of the referring document
//! - `common.yaml`: the whole other file
//!
//! Sibling keys next to `$ref` are expanded too and merged over the resolved
//! object.
//!
//! ## Scope
//!
//! [`RefResolver::resolve_at`] expands only selected subtrees (the validator
//! index passes the `responses` of each operation), so definitions nothing
//! reaches are never followed. [`RefResolver::resolve_document`] expands
//! everything.
//!
//! ## Cycles
//!
//! A reference reached again while it is still being expanded makes the
//! fully expanded form infinite; this is reported as
//! [`SchemaError::CyclicReference`].

use crate::domain::document::read_document;
use crate::domain::errors::SchemaError;
use percent_encoding::percent_decode_str;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::debug;

const REF_KEY: &str = "$ref";

/// Expands `$ref`s across one root document and the files it references.
pub struct RefResolver {
    /// Loaded documents by path
    documents: HashMap<PathBuf, Value>,
    /// Fully expanded targets by canonical reference
    resolved: HashMap<String, Value>,
}

impl RefResolver {
    /// Resolver whose root document is `root`, identified by `root_path`.
    pub fn new(root_path: PathBuf, root: Value) -> Self {
        let mut documents = HashMap::new();
        documents.insert(root_path, root);
        Self {
            documents,
            resolved: HashMap::new(),
        }
    }

    /// Expand the whole document stored under `root_path`.
    ///
    /// # Errors
    ///
    /// - `SchemaError::UnresolvedReference` for dangling pointers
    /// - `SchemaError::CyclicReference` for self-referencing chains
    /// - `SchemaError::Io`/`SchemaError::Parse` for unreadable referenced files
    pub fn resolve_document(&mut self, root_path: &Path) -> Result<Value, SchemaError> {
        let root = self.root(root_path)?;
        let mut stack = Vec::new();
        let expanded = self.expand(&root, root_path, &mut stack)?;
        debug!(
            documents = self.documents.len(),
            references = self.resolved.len(),
            "Resolved OpenAPI references"
        );
        Ok(expanded)
    }

    /// Copy of the document under `root_path` with only the nodes at the
    /// given JSON pointers expanded. Pointers that match nothing are skipped.
    ///
    /// # Errors
    ///
    /// As [`RefResolver::resolve_document`], for references reachable from
    /// the selected nodes only.
    pub fn resolve_at<I, S>(&mut self, root_path: &Path, pointers: I) -> Result<Value, SchemaError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut document = self.root(root_path)?;
        let mut stack = Vec::new();
        let mut expanded_nodes = 0usize;
        for pointer in pointers {
            let pointer = pointer.as_ref();
            let Some(node) = document.pointer(pointer).cloned() else {
                continue;
            };
            let expanded = self.expand(&node, root_path, &mut stack)?;
            if let Some(slot) = document.pointer_mut(pointer) {
                *slot = expanded;
                expanded_nodes += 1;
            }
        }
        debug!(
            nodes = expanded_nodes,
            documents = self.documents.len(),
            references = self.resolved.len(),
            "Resolved OpenAPI references"
        );
        Ok(document)
    }

    fn root(&self, root_path: &Path) -> Result<Value, SchemaError> {
        self.documents
            .get(root_path)
            .cloned()
            .ok_or_else(|| SchemaError::UnresolvedReference {
                reference: root_path.display().to_string(),
            })
    }

    fn expand(
        &mut self,
        node: &Value,
        current: &Path,
        stack: &mut Vec<String>,
    ) -> Result<Value, SchemaError> {
        match node {
            Value::Object(map) => match map.get(REF_KEY).and_then(Value::as_str) {
                Some(reference) => {
                    let target = self.follow(reference, current, stack)?;
                    let mut siblings = Map::new();
                    for (key, value) in map.iter().filter(|(key, _)| key.as_str() != REF_KEY) {
                        siblings.insert(key.clone(), self.expand(value, current, stack)?);
                    }
                    Ok(merge_siblings(target, siblings))
                }
                None => {
                    let mut out = Map::with_capacity(map.len());
                    for (key, value) in map {
                        out.insert(key.clone(), self.expand(value, current, stack)?);
                    }
                    Ok(Value::Object(out))
                }
            },
            Value::Array(items) => items
                .iter()
                .map(|item| self.expand(item, current, stack))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Array),
            other => Ok(other.clone()),
        }
    }

    fn follow(
        &mut self,
        reference: &str,
        current: &Path,
        stack: &mut Vec<String>,
    ) -> Result<Value, SchemaError> {
        let (file, fragment) = reference.split_once('#').unwrap_or((reference, ""));
        let document_path = if file.is_empty() {
            current.to_path_buf()
        } else {
            current
                .parent()
                .map_or_else(|| PathBuf::from(file), |dir| dir.join(file))
        };
        let canonical = format!("{}#{fragment}", document_path.display());

        if let Some(done) = self.resolved.get(&canonical) {
            return Ok(done.clone());
        }
        if stack.contains(&canonical) {
            return Err(SchemaError::CyclicReference {
                reference: reference.to_string(),
            });
        }

        if !self.documents.contains_key(&document_path) {
            let loaded = read_document(&document_path)?;
            self.documents.insert(document_path.clone(), loaded);
        }
        let target = self
            .documents
            .get(&document_path)
            .and_then(|document| lookup(document, fragment))
            .cloned()
            .ok_or_else(|| SchemaError::UnresolvedReference {
                reference: reference.to_string(),
            })?;

        stack.push(canonical.clone());
        let expanded = self.expand(&target, &document_path, stack);
        stack.pop();
        let expanded = expanded?;

        self.resolved.insert(canonical, expanded.clone());
        Ok(expanded)
    }
}

/// JSON pointer lookup; an empty fragment is the whole document.
fn lookup<'a>(document: &'a Value, fragment: &str) -> Option<&'a Value> {
    if fragment.is_empty() {
        return Some(document);
    }
    document.pointer(&decode_fragment(fragment))
}

/// Undo URI escaping of a fragment (`%7B` -> `{`). `~0`/`~1` are left to the
/// pointer lookup.
fn decode_fragment(fragment: &str) -> String {
    percent_decode_str(fragment).decode_utf8_lossy().into_owned()
}

/// Escape one JSON pointer token (`~` -> `~0`, `/` -> `~1`).
#[must_use]
pub fn pointer_token(token: &str) -> String {
    token.replace('~', "~0").replace('/', "~1")
}

fn merge_siblings(target: Value, siblings: Map<String, Value>) -> Value {
    match target {
        Value::Object(mut resolved) => {
            resolved.extend(siblings);
            Value::Object(resolved)
        }
        other => other,
    }
}
