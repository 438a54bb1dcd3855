//! Tree parser
//!
//! Turns a JSON document into action nodes. The schema is closed: known
//! fields are removed from each object as they are read, and whatever is
//! left afterwards is reported as an error.
//!
//! ```json
//! {
//!   "items": [
//!     { "id": "ReformatCode", "keys": ["ctrl alt L"] },
//!     { "name": "Windows", "separator-above": "Layout", "items": [
//!         { "id": "NextSplitter", "sticky": true, "keys": ["n"] }
//!     ]}
//!   ]
//! }
//! ```
//!
//! The root is either an array of nodes or an object whose only field is
//! `items`. Nodes without an `id` are numbered in encounter order with one
//! counter per parse, parents before their children.

use serde_json::{Map, Value};
use std::path::Path;

use crate::error::{LoadError, ParseError};
use crate::keystroke::KeyStroke;
use crate::model::{ActionNode, DEFAULT_ID_PREFIX, DEFAULT_NAME};

const ROOT: &str = "<root>";

/// Parse a document held in memory
pub fn parse(document: &str) -> Result<Vec<ActionNode>, ParseError> {
    let value: Value = serde_json::from_str(document)?;
    parse_value(value)
}

/// Parse an already decoded document
pub fn parse_value(document: Value) -> Result<Vec<ActionNode>, ParseError> {
    let mut parser = NodeParser::default();
    match document {
        Value::Array(items) => parser.parse_items(items),
        Value::Object(mut root) => {
            let items = remove_array(&mut root, "items")?;
            ensure_consumed(root, ROOT)?;
            parser.parse_items(items)
        }
        other => Err(unexpected(ROOT, "an array or an object", &other)),
    }
}

/// Read and parse a document from disk
pub fn parse_file(path: &Path) -> Result<Vec<ActionNode>, LoadError> {
    let document = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse(&document).map_err(|source| LoadError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Holds the id sequence shared by every node of one parse
#[derive(Debug, Default)]
struct NodeParser {
    seq: usize,
}

impl NodeParser {
    fn next_id(&mut self) -> String {
        let id = format!("{}{}", DEFAULT_ID_PREFIX, self.seq);
        self.seq += 1;
        id
    }

    fn parse_items(&mut self, items: Vec<Value>) -> Result<Vec<ActionNode>, ParseError> {
        items.into_iter().map(|item| self.parse_node(item)).collect()
    }

    fn parse_node(&mut self, value: Value) -> Result<ActionNode, ParseError> {
        let mut object = match value {
            Value::Object(object) => object,
            other => return Err(unexpected("items", "an object", &other)),
        };

        let id = match remove_string(&mut object, "id")? {
            Some(id) => id,
            None => self.next_id(),
        };
        let separator_above = remove_separator(&mut object)?;
        let name = remove_string(&mut object, "name")?.unwrap_or_else(|| DEFAULT_NAME.to_string());
        let sticky = remove_bool(&mut object, "sticky")?.unwrap_or(false);
        let keys = remove_array(&mut object, "keys")?
            .into_iter()
            .map(to_keystroke)
            .collect::<Result<Vec<_>, _>>()?;
        let items = self.parse_items(remove_array(&mut object, "items")?)?;

        ensure_consumed(object, &id)?;

        Ok(ActionNode::group(id, name, items)
            .with_separator_above(separator_above)
            .with_sticky(sticky)
            .with_keys(keys))
    }
}

/// Fail if anything is left after the known fields were taken out
fn ensure_consumed(object: Map<String, Value>, node: &str) -> Result<(), ParseError> {
    if object.is_empty() {
        return Ok(());
    }
    Err(ParseError::UnknownFields {
        node: node.to_string(),
        fields: object.into_iter().map(|(key, _)| key).collect(),
    })
}

/// Remove a field, treating `null` like an absent field
fn remove(object: &mut Map<String, Value>, field: &str) -> Option<Value> {
    object.remove(field).filter(|value| !value.is_null())
}

fn remove_string(object: &mut Map<String, Value>, field: &str) -> Result<Option<String>, ParseError> {
    match remove(object, field) {
        None => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(other) => Err(unexpected(field, "a string", &other)),
    }
}

fn remove_bool(object: &mut Map<String, Value>, field: &str) -> Result<Option<bool>, ParseError> {
    match remove(object, field) {
        None => Ok(None),
        Some(Value::Bool(b)) => Ok(Some(b)),
        Some(other) => Err(unexpected(field, "a boolean", &other)),
    }
}

fn remove_array(object: &mut Map<String, Value>, field: &str) -> Result<Vec<Value>, ParseError> {
    match remove(object, field) {
        None => Ok(Vec::new()),
        Some(Value::Array(values)) => Ok(values),
        Some(other) => Err(unexpected(field, "an array", &other)),
    }
}

/// `"separator-above"` is a label, or `true` for a plain divider
fn remove_separator(object: &mut Map<String, Value>) -> Result<Option<String>, ParseError> {
    const FIELD: &str = "separator-above";
    match remove(object, FIELD) {
        None | Some(Value::Bool(false)) => Ok(None),
        Some(Value::Bool(true)) => Ok(Some(String::new())),
        Some(Value::String(label)) => Ok(Some(label)),
        Some(other) => Err(unexpected(FIELD, "a string or a boolean", &other)),
    }
}

fn to_keystroke(value: Value) -> Result<KeyStroke, ParseError> {
    match value {
        Value::String(text) => KeyStroke::parse(&text),
        other => Err(unexpected("keys", "a key stroke string", &other)),
    }
}

fn unexpected(field: &str, expected: &'static str, found: &Value) -> ParseError {
    let found = match found {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    };
    ParseError::UnexpectedType {
        field: field.to_string(),
        expected,
        found: found.to_string(),
    }
}
