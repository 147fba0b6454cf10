//! Generic attribute tree read from TOML descriptors.
//!
//! A TOML document maps onto the tree as follows:
//!
//! - scalar values become attributes (stringified);
//! - a sub-table becomes a child named by its key;
//! - an array of tables becomes one child per element, each named by the key.
//!
//! Children appear in document order, even when arrays of tables with
//! different keys are interleaved. Attribute key order is preserved. Arrays
//! of scalars have no tree representation and are rejected.
//!
//! ```
//! use forge_deployer::Configuration;
//!
//! let tree = Configuration::from_toml(
//!     "roles",
//!     "version = \"1.0.0\"\n[[role]]\nshorthand = \"widget\"\nname = \"com.acme.Widget\"\n",
//!     "roles.toml",
//! )
//! .unwrap();
//! assert_eq!(tree.attribute("version"), Some("1.0.0"));
//! let role = tree.children_named("role").next().unwrap();
//! assert_eq!(role.attribute("shorthand"), Some("widget"));
//! ```

use toml_edit::{DocumentMut, InlineTable, Item, Table, Value};

use crate::error::{Error, Result};

/// A named node with string attributes and ordered children.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Configuration {
    name: String,
    location: String,
    attributes: Vec<(String, String)>,
    children: Vec<Configuration>,
}

impl Configuration {
    pub fn new(name: impl Into<String>, location: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            location: location.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Parse a TOML document into a tree whose root is called `root_name`.
    ///
    /// `location` names the source in errors and is recorded on every node.
    pub fn from_toml(root_name: &str, text: &str, location: &str) -> Result<Self> {
        let document: DocumentMut =
            text.parse()
                .map_err(|e: toml_edit::TomlError| Error::MalformedDescriptor {
                    url: location.to_string(),
                    message: e.message().to_string(),
                })?;
        let (node, _) = from_table(root_name, document.as_table(), location)?;
        Ok(node)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Where this node was read from.
    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn attribute_names(&self) -> impl Iterator<Item = &str> {
        self.attributes.iter().map(|(k, _)| k.as_str())
    }

    /// Set an attribute, replacing an existing value.
    pub fn set_attribute(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.attributes.iter_mut().find(|(k, _)| *k == name) {
            Some(entry) => entry.1 = value,
            None => self.attributes.push((name, value)),
        }
    }

    pub fn children(&self) -> &[Configuration] {
        &self.children
    }

    /// The first child called `name`.
    pub fn child(&self, name: &str) -> Option<&Configuration> {
        self.children.iter().find(|c| c.name == name)
    }

    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Configuration> {
        self.children.iter().filter(move |c| c.name == name)
    }

    pub fn add_child(&mut self, child: Configuration) {
        self.children.push(child);
    }
}

/// Header position of a table in its document. Implicit tables (`types` in
/// `[[types.widget]]`) have none of their own and take their first
/// descendant's.
type Position = Option<i64>;

fn from_table(name: &str, table: &Table, location: &str) -> Result<(Configuration, Position)> {
    let mut node = Configuration::new(name, location);
    let mut children: Vec<(Position, Configuration)> = Vec::new();

    for (key, item) in table.iter() {
        match item {
            Item::None => {}
            Item::Value(value) => {
                for child in from_value(&mut node, key, value, location)? {
                    children.push((None, child));
                }
            }
            Item::Table(sub) => children.push(swap(from_table(key, sub, location)?)),
            Item::ArrayOfTables(array) => {
                for sub in array.iter() {
                    children.push(swap(from_table(key, sub, location)?));
                }
            }
        }
    }

    // Stable: entries without a header keep their key order, ahead of the
    // sections that follow them in the document.
    children.sort_by_key(|(position, _)| *position);

    let own = table.position().and_then(|p| i64::try_from(p).ok());
    let position = own.or_else(|| children.iter().filter_map(|(p, _)| *p).min());
    node.children = children.into_iter().map(|(_, child)| child).collect();
    Ok((node, position))
}

fn swap((node, position): (Configuration, Position)) -> (Position, Configuration) {
    (position, node)
}

fn from_inline(name: &str, table: &InlineTable, location: &str) -> Result<Configuration> {
    let mut node = Configuration::new(name, location);
    for (key, value) in table.iter() {
        for child in from_value(&mut node, key, value, location)? {
            node.add_child(child);
        }
    }
    Ok(node)
}

/// Record a scalar on `node`, or return the children an inline table or an
/// array of inline tables stands for.
fn from_value(
    node: &mut Configuration,
    key: &str,
    value: &Value,
    location: &str,
) -> Result<Vec<Configuration>> {
    let text = match value {
        Value::String(s) => s.value().clone(),
        Value::Integer(i) => i.value().to_string(),
        Value::Float(f) => f.value().to_string(),
        Value::Boolean(b) => b.value().to_string(),
        Value::Datetime(d) => d.value().to_string(),
        Value::InlineTable(sub) => return Ok(vec![from_inline(key, sub, location)?]),
        Value::Array(items) => {
            return items
                .iter()
                .map(|item| match item {
                    Value::InlineTable(sub) => from_inline(key, sub, location),
                    _ => Err(Error::MalformedDescriptor {
                        url: location.to_string(),
                        message: format!(
                            "'{key}' in '{}' is an array of values; only arrays of tables are supported",
                            node.name
                        ),
                    }),
                })
                .collect();
        }
    };
    node.set_attribute(key, text);
    Ok(Vec::new())
}
