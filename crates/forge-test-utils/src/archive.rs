//! [`ArchiveBuilder`] for type-library test archives.

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use forge_extension::manifest::{EXTENSION_LIST, OPTIONAL_EXTENSION_LIST, write_extension};
use forge_extension::{Attributes, Extension, MANIFEST_ENTRY, Manifest};
use zip::CompressionMethod;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

pub const ROLES_ENTRY: &str = "META-INF/forge/roles.toml";
pub const TYPES_ENTRY: &str = "META-INF/forge/types.toml";
pub const SERVICES_ENTRY: &str = "META-INF/forge/services.toml";

/// Builds a zip archive with a manifest and optional descriptors.
///
/// # Example
///
/// ```rust,no_run
/// use forge_test_utils::ArchiveBuilder;
///
/// ArchiveBuilder::new()
///     .role("widget", "com.acme.Widget")
///     .type_def("widget", "mywidget", "com.acme.WidgetImpl")
///     .write("/tmp/foo.pkg");
/// ```
#[derive(Debug, Clone)]
pub struct ArchiveBuilder {
    manifest: Manifest,
    provided: usize,
    required: Vec<String>,
    optional: Vec<String>,
    version: String,
    roles: String,
    types: String,
    services: String,
    entries: Vec<(String, Vec<u8>)>,
}

impl Default for ArchiveBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ArchiveBuilder {
    /// An archive with an empty manifest and no descriptors.
    pub fn new() -> Self {
        let mut manifest = Manifest::new();
        manifest.main_mut().insert("Manifest-Version", "1.0");
        Self {
            manifest,
            provided: 0,
            required: Vec::new(),
            optional: Vec::new(),
            version: "1.0.0".to_string(),
            roles: String::new(),
            types: String::new(),
            services: String::new(),
            entries: Vec::new(),
        }
    }

    /// Declare an extension this archive provides.
    ///
    /// The first goes into the main section, later ones into named sections.
    pub fn provides(mut self, extension: Extension) -> Self {
        if self.provided == 0 {
            write_extension(&extension, "", self.manifest.main_mut());
        } else {
            let mut attributes = Attributes::new();
            write_extension(&extension, "", &mut attributes);
            self.manifest
                .add_section(format!("extension-{}/", self.provided), attributes);
        }
        self.provided += 1;
        self
    }

    /// Declare an extension this archive requires.
    pub fn requires(mut self, extension: Extension) -> Self {
        let alias = format!("req{}", self.required.len());
        write_extension(&extension, &format!("{alias}-"), self.manifest.main_mut());
        self.required.push(alias);
        self.manifest
            .main_mut()
            .insert(EXTENSION_LIST, self.required.join(" "));
        self
    }

    /// Declare an extension this archive uses when present.
    pub fn optionally(mut self, extension: Extension) -> Self {
        let alias = format!("opt{}", self.optional.len());
        write_extension(&extension, &format!("{alias}-"), self.manifest.main_mut());
        self.optional.push(alias);
        self.manifest
            .main_mut()
            .insert(OPTIONAL_EXTENSION_LIST, self.optional.join(" "));
        self
    }

    /// Schema version written into every generated descriptor.
    pub fn descriptor_version(mut self, version: &str) -> Self {
        self.version = version.to_string();
        self
    }

    /// Add a role to the role descriptor.
    pub fn role(mut self, shorthand: &str, name: &str) -> Self {
        self.roles.push_str(&format!(
            "[[role]]\nshorthand = \"{shorthand}\"\nname = \"{name}\"\n\n"
        ));
        self
    }

    /// Add a type under role `role` to the type descriptor.
    pub fn type_def(mut self, role: &str, name: &str, classname: &str) -> Self {
        self.types.push_str(&format!(
            "[[types.{role}]]\nname = \"{name}\"\nclassname = \"{classname}\"\n\n"
        ));
        self
    }

    /// Add a converter to the type descriptor.
    pub fn converter(mut self, classname: &str, source: &str, destination: &str) -> Self {
        self.types.push_str(&format!(
            "[[types.converter]]\nclassname = \"{classname}\"\nsource = \"{source}\"\ndestination = \"{destination}\"\n\n"
        ));
        self
    }

    /// Add a service to the service descriptor.
    pub fn service(mut self, role: &str, factory: &str) -> Self {
        self.services.push_str(&format!(
            "[[service]]\nrole = \"{role}\"\nfactory = \"{factory}\"\n\n"
        ));
        self
    }

    /// Add an arbitrary entry.
    pub fn entry(mut self, name: &str, contents: impl Into<Vec<u8>>) -> Self {
        self.entries.push((name.to_string(), contents.into()));
        self
    }

    /// The manifest as it will be written.
    pub fn manifest(&self) -> &Manifest {
        &self.manifest
    }

    /// Write the archive to `path` and return the path.
    ///
    /// # Panics
    /// Panics if the file cannot be written.
    pub fn write(&self, path: impl AsRef<Path>) -> PathBuf {
        let path = path.as_ref();
        let file = File::create(path)
            .unwrap_or_else(|e| panic!("Could not create archive {}: {e}", path.display()));
        let mut zip = ZipWriter::new(file);
        let options =
            SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

        let mut put = |name: &str, bytes: &[u8]| {
            zip.start_file(name, options).unwrap();
            zip.write_all(bytes).unwrap();
        };

        put(MANIFEST_ENTRY, self.manifest.to_string().as_bytes());
        for (entry, body) in [
            (ROLES_ENTRY, &self.roles),
            (TYPES_ENTRY, &self.types),
            (SERVICES_ENTRY, &self.services),
        ] {
            if !body.is_empty() {
                let text = format!("version = \"{}\"\n\n{body}", self.version);
                put(entry, text.as_bytes());
            }
        }
        for (name, contents) in &self.entries {
            put(name, contents);
        }

        zip.finish().unwrap();
        path.to_path_buf()
    }
}
