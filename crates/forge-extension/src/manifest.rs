//! Archive manifest parsing.
//!
//! A manifest is a block of `Key: value` lines stored in the archive entry
//! [`MANIFEST_ENTRY`](crate::MANIFEST_ENTRY). Lines starting with a single
//! space continue the previous value. Blank lines separate sections; every
//! section after the first (the main section) starts with `Name: <section>`.
//!
//! # Example
//!
//! ```text
//! Manifest-Version: 1.0
//! Extension-Name: com.acme.widgets
//! Specification-Version: 1.2
//! Implementation-Vendor-Id: com.acme
//! Extension-List: xml
//! xml-Extension-Name: org.example.xml
//! xml-Specification-Version: 2.0
//! ```
//!
//! The archive above provides `com.acme.widgets` 1.2 and requires
//! `org.example.xml` 2.0 or later.

use std::fmt;

use crate::error::{Error, Result};
use crate::extension::Extension;
use crate::version::DeweyDecimal;

pub const EXTENSION_NAME: &str = "Extension-Name";
pub const EXTENSION_LIST: &str = "Extension-List";
pub const OPTIONAL_EXTENSION_LIST: &str = "Optional-Extension-List";
pub const SPECIFICATION_VERSION: &str = "Specification-Version";
pub const SPECIFICATION_VENDOR: &str = "Specification-Vendor";
pub const IMPLEMENTATION_VERSION: &str = "Implementation-Version";
pub const IMPLEMENTATION_VENDOR: &str = "Implementation-Vendor";
pub const IMPLEMENTATION_VENDOR_ID: &str = "Implementation-Vendor-Id";
pub const IMPLEMENTATION_URL: &str = "Implementation-URL";

const SECTION_NAME: &str = "Name";

/// An ordered set of manifest attributes with case-insensitive keys.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attributes {
    entries: Vec<(String, String)>,
}

impl Attributes {
    /// Create an empty attribute set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a value, ignoring key case.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
    }

    /// Set a value, replacing an existing key of any case.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self
            .entries
            .iter_mut()
            .find(|(k, _)| k.eq_ignore_ascii_case(&key))
        {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    /// Iterate over the attributes in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn append_to_last(&mut self, continuation: &str) -> bool {
        match self.entries.last_mut() {
            Some((_, value)) => {
                value.push_str(continuation);
                true
            }
            None => false,
        }
    }
}

/// A parsed archive manifest: the main section plus named sections.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Manifest {
    main: Attributes,
    sections: Vec<(String, Attributes)>,
}

impl Manifest {
    /// Create an empty manifest.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse manifest bytes. The content must be UTF-8.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let text = std::str::from_utf8(bytes).map_err(|e| Error::ManifestParse {
            line: 0,
            reason: format!("not valid UTF-8: {e}"),
        })?;
        Self::parse(text)
    }

    /// Parse manifest text.
    pub fn parse(text: &str) -> Result<Self> {
        let mut manifest = Self::new();
        let mut current = Attributes::new();
        let mut in_main = true;

        for (index, raw) in text.lines().enumerate() {
            let line_no = index + 1;
            let line = raw.strip_suffix('\r').unwrap_or(raw);

            if line.is_empty() {
                manifest.close_section(&mut current, &mut in_main, line_no)?;
                continue;
            }

            if let Some(continuation) = line.strip_prefix(' ') {
                if !current.append_to_last(continuation) {
                    return Err(Error::ManifestParse {
                        line: line_no,
                        reason: "continuation line without a preceding attribute".to_string(),
                    });
                }
                continue;
            }

            let (key, value) = line.split_once(':').ok_or_else(|| Error::ManifestParse {
                line: line_no,
                reason: format!("expected 'Key: value', found '{line}'"),
            })?;
            let key = key.trim();
            if key.is_empty() {
                return Err(Error::ManifestParse {
                    line: line_no,
                    reason: "empty attribute name".to_string(),
                });
            }
            let value = value.strip_prefix(' ').unwrap_or(value);
            current.insert(key, value);
        }

        let end = text.lines().count() + 1;
        manifest.close_section(&mut current, &mut in_main, end)?;
        Ok(manifest)
    }

    fn close_section(
        &mut self,
        current: &mut Attributes,
        in_main: &mut bool,
        line: usize,
    ) -> Result<()> {
        if current.is_empty() {
            return Ok(());
        }
        let attributes = std::mem::take(current);
        if *in_main {
            self.main = attributes;
            *in_main = false;
            return Ok(());
        }
        let name = attributes
            .get(SECTION_NAME)
            .ok_or_else(|| Error::ManifestParse {
                line,
                reason: "section does not start with a Name attribute".to_string(),
            })?
            .to_string();
        self.sections.push((name, attributes));
        Ok(())
    }

    /// The main section.
    pub fn main(&self) -> &Attributes {
        &self.main
    }

    /// Mutable access to the main section.
    pub fn main_mut(&mut self) -> &mut Attributes {
        &mut self.main
    }

    /// Look up a named section.
    pub fn section(&self, name: &str) -> Option<&Attributes> {
        self.sections
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, attrs)| attrs)
    }

    /// Append a named section.
    pub fn add_section(&mut self, name: impl Into<String>, mut attributes: Attributes) {
        let name = name.into();
        attributes.insert(SECTION_NAME, name.clone());
        self.sections.push((name, attributes));
    }

    /// All sections, main first.
    fn all_sections(&self) -> impl Iterator<Item = &Attributes> {
        std::iter::once(&self.main).chain(self.sections.iter().map(|(_, attrs)| attrs))
    }

    /// Extensions this archive provides.
    pub fn available_extensions(&self) -> Result<Vec<Extension>> {
        let mut extensions = Vec::new();
        for attributes in self.all_sections() {
            if let Some(name) = attributes.get(EXTENSION_NAME) {
                extensions.push(read_extension(attributes, "", name)?);
            }
        }
        Ok(extensions)
    }

    /// Extensions this archive cannot work without.
    pub fn required_extensions(&self) -> Result<Vec<Extension>> {
        self.listed_extensions(EXTENSION_LIST)
    }

    /// Extensions this archive uses when present.
    pub fn optional_extensions(&self) -> Result<Vec<Extension>> {
        self.listed_extensions(OPTIONAL_EXTENSION_LIST)
    }

    fn listed_extensions(&self, list_key: &str) -> Result<Vec<Extension>> {
        let mut extensions = Vec::new();
        for attributes in self.all_sections() {
            let Some(list) = attributes.get(list_key) else {
                continue;
            };
            for alias in list.split_whitespace() {
                let prefix = format!("{alias}-");
                let name = attributes
                    .get(&format!("{prefix}{EXTENSION_NAME}"))
                    .ok_or_else(|| Error::MissingExtensionName {
                        alias: alias.to_string(),
                    })?;
                extensions.push(read_extension(attributes, &prefix, name)?);
            }
        }
        Ok(extensions)
    }
}

impl fmt::Display for Manifest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (key, value) in self.main.iter() {
            writeln!(f, "{key}: {value}")?;
        }
        for (_, attributes) in &self.sections {
            writeln!(f)?;
            if let Some(name) = attributes.get(SECTION_NAME) {
                writeln!(f, "{SECTION_NAME}: {name}")?;
            }
            for (key, value) in attributes.iter() {
                if !key.eq_ignore_ascii_case(SECTION_NAME) {
                    writeln!(f, "{key}: {value}")?;
                }
            }
        }
        Ok(())
    }
}

fn read_extension(attributes: &Attributes, prefix: &str, name: &str) -> Result<Extension> {
    let text = |key: &str| {
        attributes
            .get(&format!("{prefix}{key}"))
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    };
    let version = |key: &str| -> Result<Option<DeweyDecimal>> {
        match text(key) {
            Some(value) => DeweyDecimal::parse(&value)
                .map(Some)
                .map_err(|e| Error::BadExtensionVersion {
                    extension: name.to_string(),
                    attribute: key.to_string(),
                    value,
                    reason: e.to_string(),
                }),
            None => Ok(None),
        }
    };

    Ok(Extension {
        name: name.trim().to_string(),
        specification_version: version(SPECIFICATION_VERSION)?,
        specification_vendor: text(SPECIFICATION_VENDOR),
        implementation_version: version(IMPLEMENTATION_VERSION)?,
        implementation_vendor: text(IMPLEMENTATION_VENDOR),
        implementation_vendor_id: text(IMPLEMENTATION_VENDOR_ID),
        implementation_url: text(IMPLEMENTATION_URL),
    })
}

/// Write `extension` into `attributes`, prefixing every key with `prefix`.
///
/// Use an empty prefix to declare an available extension, or `"<alias>-"`
/// together with an `Extension-List` entry to declare a requirement.
pub fn write_extension(extension: &Extension, prefix: &str, attributes: &mut Attributes) {
    attributes.insert(format!("{prefix}{EXTENSION_NAME}"), extension.name.clone());
    let fields = [
        (
            SPECIFICATION_VERSION,
            extension.specification_version.as_ref().map(|v| v.to_string()),
        ),
        (SPECIFICATION_VENDOR, extension.specification_vendor.clone()),
        (
            IMPLEMENTATION_VERSION,
            extension.implementation_version.as_ref().map(|v| v.to_string()),
        ),
        (IMPLEMENTATION_VENDOR, extension.implementation_vendor.clone()),
        (IMPLEMENTATION_VENDOR_ID, extension.implementation_vendor_id.clone()),
        (IMPLEMENTATION_URL, extension.implementation_url.clone()),
    ];
    for (key, value) in fields {
        if let Some(value) = value {
            attributes.insert(format!("{prefix}{key}"), value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const WIDGETS_MANIFEST: &str = "Manifest-Version: 1.0\n\
Extension-Name: com.acme.widgets\n\
Specification-Version: 1.2\n\
Implementation-Vendor-Id: com.acme\n\
Extension-List: xml log\n\
xml-Extension-Name: org.example.xml\n\
xml-Specification-Version: 2.0\n\
log-Extension-Name: org.example.log\n\
Optional-Extension-List: fast\n\
fast-Extension-Name: org.example.fast\n";

    #[test]
    fn test_parse_main_section() {
        let manifest = Manifest::parse(WIDGETS_MANIFEST).unwrap();
        assert_eq!(manifest.main().get("manifest-version"), Some("1.0"));
        assert_eq!(manifest.main().get(EXTENSION_NAME), Some("com.acme.widgets"));
    }

    #[test]
    fn test_available_extensions() {
        let manifest = Manifest::parse(WIDGETS_MANIFEST).unwrap();
        let available = manifest.available_extensions().unwrap();
        assert_eq!(available.len(), 1);
        assert_eq!(available[0].name, "com.acme.widgets");
        assert_eq!(
            available[0].specification_version,
            Some(DeweyDecimal::parse("1.2").unwrap())
        );
        assert_eq!(available[0].implementation_vendor_id.as_deref(), Some("com.acme"));
    }

    #[test]
    fn test_required_extensions_follow_list_order() {
        let manifest = Manifest::parse(WIDGETS_MANIFEST).unwrap();
        let required = manifest.required_extensions().unwrap();
        let names: Vec<&str> = required.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["org.example.xml", "org.example.log"]);
        assert_eq!(
            required[0].specification_version,
            Some(DeweyDecimal::parse("2.0").unwrap())
        );
        assert!(required[1].specification_version.is_none());
    }

    #[test]
    fn test_optional_extensions() {
        let manifest = Manifest::parse(WIDGETS_MANIFEST).unwrap();
        let optional = manifest.optional_extensions().unwrap();
        assert_eq!(optional.len(), 1);
        assert_eq!(optional[0].name, "org.example.fast");
    }

    #[test]
    fn test_no_extension_declarations() {
        let manifest = Manifest::parse("Manifest-Version: 1.0\n").unwrap();
        assert!(manifest.available_extensions().unwrap().is_empty());
        assert!(manifest.required_extensions().unwrap().is_empty());
    }

    #[test]
    fn test_continuation_lines() {
        let text = "Extension-Name: com.acme.very\n .long.name\n";
        let manifest = Manifest::parse(text).unwrap();
        assert_eq!(manifest.main().get(EXTENSION_NAME), Some("com.acme.very.long.name"));
    }

    #[test]
    fn test_crlf_line_endings() {
        let text = "Manifest-Version: 1.0\r\nExtension-Name: crlf\r\n";
        let manifest = Manifest::parse(text).unwrap();
        assert_eq!(manifest.main().get(EXTENSION_NAME), Some("crlf"));
    }

    #[test]
    fn test_named_sections_contribute_extensions() {
        let text = "Manifest-Version: 1.0\n\nName: extra\nExtension-Name: com.acme.extra\n";
        let manifest = Manifest::parse(text).unwrap();
        assert!(manifest.section("extra").is_some());
        let available = manifest.available_extensions().unwrap();
        assert_eq!(available[0].name, "com.acme.extra");
    }

    #[test]
    fn test_section_without_name_rejected() {
        let text = "Manifest-Version: 1.0\n\nExtension-Name: orphan\n";
        let err = Manifest::parse(text).unwrap_err();
        assert!(matches!(err, Error::ManifestParse { .. }));
    }

    #[test]
    fn test_line_without_colon_rejected() {
        let err = Manifest::parse("Manifest-Version 1.0\n").unwrap_err();
        assert!(matches!(err, Error::ManifestParse { line: 1, .. }));
    }

    #[test]
    fn test_leading_continuation_rejected() {
        assert!(Manifest::parse(" dangling\n").is_err());
    }

    #[test]
    fn test_listed_alias_without_name_rejected() {
        let err = Manifest::parse("Extension-List: ghost\n")
            .unwrap()
            .required_extensions()
            .unwrap_err();
        assert!(matches!(err, Error::MissingExtensionName { ref alias } if alias == "ghost"));
    }

    #[test]
    fn test_bad_version_names_extension() {
        let err = Manifest::parse("Extension-Name: broken\nSpecification-Version: one\n")
            .unwrap()
            .available_extensions()
            .unwrap_err();
        assert!(err.to_string().contains("broken"));
    }

    #[test]
    fn test_written_manifest_parses_back() {
        let mut manifest = Manifest::new();
        manifest.main_mut().insert("Manifest-Version", "1.0");
        let provided = Extension::new("com.acme.widgets")
            .with_specification_version(DeweyDecimal::parse("1.2").unwrap());
        write_extension(&provided, "", manifest.main_mut());
        let required = Extension::new("org.example.xml").with_implementation_vendor_id("org.example");
        manifest.main_mut().insert(EXTENSION_LIST, "xml");
        write_extension(&required, "xml-", manifest.main_mut());

        let reparsed = Manifest::parse(&manifest.to_string()).unwrap();
        assert_eq!(reparsed.available_extensions().unwrap(), vec![provided]);
        assert_eq!(reparsed.required_extensions().unwrap(), vec![required]);
    }
}
