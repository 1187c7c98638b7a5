//! Placeholder expansion over configuration trees.
//!
//! Every value in the tree is rendered to text, expanded, and coerced back to
//! a scalar with [`Scalar::auto`]. Recognised placeholders:
//!
//! | Placeholder | Replacement                        |
//! |-------------|------------------------------------|
//! | `[subnet]`  | [`Environment::network_address`]   |
//! | `[object]`  | [`Environment::deploy_dir`]        |
//!
//! Anything else in brackets, and an unterminated `[`, is copied verbatim.

use std::borrow::Cow;

use crate::node::ConfigNode;
use crate::scalar::Scalar;

const NETWORK_PLACEHOLDER: &str = "subnet";
const DEPLOY_DIR_PLACEHOLDER: &str = "object";

/// Host facts available to placeholder expansion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Environment {
    network_address: String,
    deploy_dir: String,
}

impl Environment {
    /// Captures the host facts.
    #[must_use]
    pub fn new(network_address: impl Into<String>, deploy_dir: impl Into<String>) -> Self {
        Self {
            network_address: network_address.into(),
            deploy_dir: deploy_dir.into(),
        }
    }

    /// Local network address of the host.
    #[must_use]
    pub fn network_address(&self) -> &str {
        self.network_address.as_str()
    }

    /// Directory the deployment lives in.
    #[must_use]
    pub fn deploy_dir(&self) -> &str {
        self.deploy_dir.as_str()
    }

    fn lookup(&self, name: &str) -> Option<&str> {
        match name {
            NETWORK_PLACEHOLDER => Some(self.network_address()),
            DEPLOY_DIR_PLACEHOLDER => Some(self.deploy_dir()),
            _ => None,
        }
    }
}

/// Counters describing a resolution pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResolveReport {
    /// Nodes visited, including nodes without a value.
    pub visited: usize,
    /// Values whose type or text changed.
    pub rewritten: usize,
}

/// Expands placeholders in `text` in a single left-to-right pass.
///
/// Substituted text is not scanned again. Text without a recognised
/// placeholder is returned borrowed and unchanged.
#[must_use]
pub fn expand<'a>(text: &'a str, environment: &Environment) -> Cow<'a, str> {
    let mut output = String::new();
    let mut rest = text;
    let mut changed = false;

    while let Some(open) = rest.find('[') {
        let (before, bracketed) = rest.split_at(open);
        let (bracket, after_open) = bracketed.split_at(1);
        output.push_str(before);
        let Some(close) = after_open.find(']') else {
            output.push_str(bracketed);
            rest = "";
            break;
        };
        let (name, after_name) = after_open.split_at(close);
        if let Some(replacement) = environment.lookup(name) {
            output.push_str(replacement);
            rest = after_name.split_at(1).1;
            changed = true;
        } else {
            output.push_str(bracket);
            rest = after_open;
        }
    }

    if changed {
        output.push_str(rest);
        Cow::Owned(output)
    } else {
        Cow::Borrowed(text)
    }
}

/// Re-evaluates a single value against the environment.
#[must_use]
pub fn resolve_value(value: &Scalar, environment: &Environment) -> Scalar {
    let text = value.to_string();
    Scalar::auto(&expand(&text, environment))
}

/// Resolves every value in the tree in place.
///
/// Traversal is depth first, parent before children, siblings in stored
/// order. A value without placeholders is re-typed from its own text.
pub fn resolve_tree(root: &mut ConfigNode, environment: &Environment) -> ResolveReport {
    let mut report = ResolveReport::default();
    resolve_node(root, environment, &mut report);
    report
}

fn resolve_node(node: &mut ConfigNode, environment: &Environment, report: &mut ResolveReport) {
    report.visited += 1;
    if let Some(value) = node.value_mut() {
        let resolved = resolve_value(value, environment);
        if resolved != *value {
            report.rewritten += 1;
            *value = resolved;
        }
    }
    for child in node.children_mut() {
        resolve_node(child, environment, report);
    }
}
