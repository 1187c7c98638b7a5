//! Builds configuration trees from JSON documents.
//!
//! Mapping rules:
//! - object members become children in document order;
//! - arrays become repeated siblings sharing the array's key;
//! - scalars become node values (strings are kept verbatim, numbers use
//!   their JSON text);
//! - a `"[v]"` member sets the enclosing node's value;
//! - `null` becomes an empty node.

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};
use thiserror::Error;

use crate::node::{ConfigNode, VALUE_MARKER};
use crate::scalar::Scalar;

/// Errors raised while loading a configuration tree.
#[derive(Debug, Error)]
pub enum TreeError {
    /// The document could not be read.
    #[error("failed to read configuration tree '{path}': {source}")]
    Read {
        /// Document path.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },
    /// The document is not valid JSON.
    #[error("failed to parse configuration tree: {source}")]
    Parse {
        /// Underlying JSON error.
        #[source]
        source: serde_json::Error,
    },
    /// The document root is not a JSON object.
    #[error("configuration tree root must be an object")]
    NotAnObject,
    /// A `[v]` member held an object or array.
    #[error("value of '{key}' must be a scalar")]
    NonScalarValue {
        /// Key of the node whose value marker was invalid.
        key: String,
    },
}

/// Reads and maps the JSON document at `path`.
///
/// # Errors
///
/// Returns [`TreeError`] when the file cannot be read or does not describe a
/// valid tree.
pub fn load_file(path: &Path) -> Result<ConfigNode, TreeError> {
    let text = fs::read_to_string(path).map_err(|source| TreeError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_str(&text)
}

/// Parses JSON text into a tree rooted at an unnamed node.
///
/// # Errors
///
/// Returns [`TreeError`] when the text is not JSON or not a valid tree.
pub fn parse_str(text: &str) -> Result<ConfigNode, TreeError> {
    let document: Value =
        serde_json::from_str(text).map_err(|source| TreeError::Parse { source })?;
    from_value(&document)
}

/// Maps an already parsed JSON document into a tree.
///
/// # Errors
///
/// Returns [`TreeError::NotAnObject`] unless `document` is an object, and
/// [`TreeError::NonScalarValue`] for structured `[v]` members.
pub fn from_value(document: &Value) -> Result<ConfigNode, TreeError> {
    let Value::Object(members) = document else {
        return Err(TreeError::NotAnObject);
    };
    let mut root = ConfigNode::new("");
    map_members(&mut root, members)?;
    Ok(root)
}

fn map_members(parent: &mut ConfigNode, members: &Map<String, Value>) -> Result<(), TreeError> {
    for (key, value) in members {
        if key == VALUE_MARKER {
            let scalar = match value {
                Value::Object(_) | Value::Array(_) => {
                    return Err(TreeError::NonScalarValue {
                        key: parent.key().to_owned(),
                    });
                }
                other => scalar_from(other),
            };
            parent.set_value(scalar);
        } else {
            map_entry(parent, key, value)?;
        }
    }
    Ok(())
}

fn map_entry(parent: &mut ConfigNode, key: &str, value: &Value) -> Result<(), TreeError> {
    match value {
        Value::Array(items) => {
            for item in items {
                map_entry(parent, key, item)?;
            }
        }
        Value::Object(members) => {
            let mut node = ConfigNode::new(key);
            map_members(&mut node, members)?;
            parent.push(node);
        }
        scalar => {
            let mut node = ConfigNode::new(key);
            node.set_value(scalar_from(scalar));
            parent.push(node);
        }
    }
    Ok(())
}

fn scalar_from(value: &Value) -> Option<Scalar> {
    match value {
        Value::Bool(flag) => Some(Scalar::Bool(*flag)),
        Value::Number(number) => Some(Scalar::auto(&number.to_string())),
        Value::String(text) => Some(Scalar::String(text.clone())),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::NodeKind;
    use rstest::rstest;
    use std::io::Write;

    #[rstest]
    fn members_keep_document_order() {
        let tree = parse_str(r#"{"zeta": 1, "alpha": 2, "mid": 3}"#).expect("tree should parse");
        let keys: Vec<&str> = tree.children().iter().map(ConfigNode::key).collect();
        assert_eq!(keys, ["zeta", "alpha", "mid"]);
    }

    #[rstest]
    fn arrays_become_repeated_siblings() {
        let tree = parse_str(r#"{"net": {"bindIp": ["127.0.0.1", "10.0.0.1"]}}"#)
            .expect("tree should parse");
        let net = tree.find("net").expect("net node");
        let values: Vec<String> = net
            .children()
            .iter()
            .map(|child| {
                assert_eq!(child.key(), "bindIp");
                child.value().map(Scalar::to_text).unwrap_or_default()
            })
            .collect();
        assert_eq!(values, ["127.0.0.1", "10.0.0.1"]);
    }

    #[rstest]
    fn value_marker_sets_node_value() {
        let tree = parse_str(r#"{"path": {"[v]": "/var/log/mongod.log", "mode": "append"}}"#)
            .expect("tree should parse");
        let path = tree.find("path").expect("path node");
        assert_eq!(path.value(), Some(&Scalar::from("/var/log/mongod.log")));
        assert_eq!(path.children().len(), 1);
    }

    #[rstest]
    fn null_becomes_empty_node() {
        let tree = parse_str(r#"{"empty": null}"#).expect("tree should parse");
        assert_eq!(tree.find("empty").map(ConfigNode::kind), Some(NodeKind::Empty));
    }

    #[rstest]
    fn numbers_keep_their_json_text() {
        let tree = parse_str(r#"{"port": 27017, "ratio": 0.5}"#).expect("tree should parse");
        assert_eq!(tree.value_at("port"), Some(&Scalar::Int(27017)));
        assert_eq!(tree.value_at("ratio"), Some(&Scalar::Float(0.5)));
    }

    #[rstest]
    #[case("[1, 2]")]
    #[case("\"text\"")]
    fn non_object_roots_are_rejected(#[case] text: &str) {
        assert!(matches!(parse_str(text), Err(TreeError::NotAnObject)));
    }

    #[rstest]
    fn structured_value_marker_is_rejected() {
        let error = parse_str(r#"{"node": {"[v]": {"nested": 1}}}"#).expect_err("must fail");
        assert!(matches!(error, TreeError::NonScalarValue { key } if key == "node"));
    }

    #[rstest]
    fn malformed_json_is_a_parse_error() {
        assert!(matches!(parse_str("{"), Err(TreeError::Parse { .. })));
    }

    #[rstest]
    fn load_file_reads_documents() {
        let mut file = tempfile::NamedTempFile::new().expect("create temp file");
        file.write_all(br#"{"application": {"terminal": true}}"#)
            .expect("write document");
        let tree = load_file(file.path()).expect("tree should load");
        assert_eq!(tree.value_at("application.terminal"), Some(&Scalar::Bool(true)));
    }

    #[rstest]
    fn load_file_reports_missing_documents() {
        let dir = tempfile::TempDir::new().expect("create temp dir");
        let error = load_file(&dir.path().join("missing.json")).expect_err("must fail");
        assert!(matches!(error, TreeError::Read { .. }));
    }
}
