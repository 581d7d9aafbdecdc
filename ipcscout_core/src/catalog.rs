use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use thiserror::Error;
use tracing::debug;

/// Errors raised while resolving a target's component metadata.
#[derive(Error, Debug)]
pub enum CatalogError {
    /// The package could not be resolved by the metadata source.
    #[error("Package not found: {0}")]
    NotFound(String),

    /// The backing metadata could not be read.
    #[error("Catalog I/O error: {0}")]
    Io(String),

    /// The backing metadata could not be decoded.
    #[error("Catalog parse error: {0}")]
    Parse(String),
}

impl From<std::io::Error> for CatalogError {
    fn from(err: std::io::Error) -> Self {
        CatalogError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for CatalogError {
    fn from(err: serde_json::Error) -> Self {
        CatalogError::Parse(format!("JSON decoding error: {}", err))
    }
}

/// The kind of IPC entry point a component exposes.
///
/// Assigned once, when the metadata is classified; everything downstream
/// matches on this tag instead of inspecting component names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ComponentKind {
    Activity,
    Service,
    Receiver,
    Provider,
}

impl ComponentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ComponentKind::Activity => "activity",
            ComponentKind::Service => "service",
            ComponentKind::Receiver => "receiver",
            ComponentKind::Provider => "provider",
        }
    }
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One declared component of a target package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ComponentDescriptor {
    pub kind: ComponentKind,
    pub qualified_name: String,
    #[serde(default)]
    pub exported: bool,
    #[serde(default)]
    pub read_permission: Option<String>,
    #[serde(default)]
    pub write_permission: Option<String>,
    /// Resource namespace of a provider; `None` for other kinds.
    #[serde(default)]
    pub authority: Option<String>,
}

impl ComponentDescriptor {
    /// Class name without its package prefix.
    pub fn simple_name(&self) -> &str {
        simple_class_name(&self.qualified_name)
    }
}

fn simple_class_name(name: &str) -> &str {
    name.rsplit('.').next().unwrap_or(name)
}

/// Everything a metadata source knows about one package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct PackageManifest {
    pub package: String,
    #[serde(default)]
    pub components: Vec<ComponentDescriptor>,
}

/// Source of declared-component metadata for installed packages.
pub trait MetadataSource: Send + Sync {
    /// Returns the manifest of `package`, or `None` when it is not installed.
    fn lookup(&self, package: &str) -> Result<Option<PackageManifest>, CatalogError>;

    /// Finds the provider serving `authority` across all known packages.
    fn resolve_authority(
        &self,
        authority: &str,
    ) -> Result<Option<ComponentDescriptor>, CatalogError>;
}

/// A `MetadataSource` backed by a JSON array of [`PackageManifest`]s,
/// typically dumped once from the device.
#[derive(Debug, Default, Clone)]
pub struct ManifestIndex {
    packages: HashMap<String, PackageManifest>,
}

impl ManifestIndex {
    pub fn from_manifests<I>(manifests: I) -> Self
    where
        I: IntoIterator<Item = PackageManifest>,
    {
        let packages = manifests
            .into_iter()
            .map(|m| (m.package.clone(), m))
            .collect();
        Self { packages }
    }

    pub fn load_from_file(path: &Path) -> Result<Self, CatalogError> {
        let file = File::open(path).map_err(|e| {
            CatalogError::Io(format!("Failed to open manifest index {:?}: {}", path, e))
        })?;
        let manifests: Vec<PackageManifest> = serde_json::from_reader(BufReader::new(file))
            .map_err(|e| {
                CatalogError::Parse(format!(
                    "Failed to parse manifest index {:?}: {}",
                    path, e
                ))
            })?;
        Ok(Self::from_manifests(manifests))
    }

    pub fn len(&self) -> usize {
        self.packages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }
}

impl MetadataSource for ManifestIndex {
    fn lookup(&self, package: &str) -> Result<Option<PackageManifest>, CatalogError> {
        Ok(self.packages.get(package).cloned())
    }

    fn resolve_authority(
        &self,
        authority: &str,
    ) -> Result<Option<ComponentDescriptor>, CatalogError> {
        let found = self
            .packages
            .values()
            .flat_map(|m| m.components.iter())
            .find(|c| {
                c.kind == ComponentKind::Provider && c.authority.as_deref() == Some(authority)
            });
        Ok(found.cloned())
    }
}

/// Identity of the application running the probes, used to keep its own
/// launcher activity out of the listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct HostIdentity {
    pub entry_point: String,
}

impl HostIdentity {
    /// A fully qualified entry point matches exactly; a bare class name
    /// matches any activity with that simple name.
    fn is_entry_point(&self, component: &ComponentDescriptor) -> bool {
        if component.kind != ComponentKind::Activity || self.entry_point.is_empty() {
            return false;
        }
        if self.entry_point.contains('.') {
            component.qualified_name == self.entry_point
        } else {
            component.simple_name() == self.entry_point
        }
    }
}

impl Default for HostIdentity {
    fn default() -> Self {
        Self {
            entry_point: "MainActivity".to_string(),
        }
    }
}

pub struct Catalog<'a> {
    source: &'a dyn MetadataSource,
    host: HostIdentity,
}

impl<'a> Catalog<'a> {
    pub fn new(source: &'a dyn MetadataSource, host: HostIdentity) -> Self {
        Self { source, host }
    }

    /// Lists every exported component of `package`, grouped by kind.
    ///
    /// Fails with [`CatalogError::NotFound`] when the package cannot be
    /// resolved; no partial list is ever returned.
    pub fn list_exported_components(
        &self,
        package: &str,
    ) -> Result<Vec<ComponentDescriptor>, CatalogError> {
        let manifest = self
            .source
            .lookup(package)?
            .ok_or_else(|| CatalogError::NotFound(package.to_string()))?;

        let mut exported: Vec<ComponentDescriptor> = manifest
            .components
            .into_iter()
            .filter(|c| c.exported)
            .filter(|c| !self.host.is_entry_point(c))
            .collect();
        // stable: declaration order survives within a kind
        exported.sort_by_key(|c| c.kind);

        debug!(package, count = exported.len(), "enumerated exported components");
        Ok(exported)
    }
}
