use crate::catalog::{CatalogError, MetadataSource};
use std::collections::BTreeSet;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Error, Debug)]
pub enum GateError {
    /// The caller lacks at least one permission the provider declares.
    #[error("Permission denied for '{authority}': missing {missing:?}")]
    PermissionDenied {
        authority: String,
        missing: Vec<String>,
    },

    #[error("Permission lookup failed: {0}")]
    Catalog(#[from] CatalogError),
}

/// Answers whether the probing process holds a given permission.
pub trait PermissionHolder: Send + Sync {
    fn holds(&self, permission: &str) -> bool;
}

/// A fixed set of granted permissions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GrantedPermissions {
    granted: BTreeSet<String>,
}

impl GrantedPermissions {
    pub fn new<I, S>(permissions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            granted: permissions.into_iter().map(Into::into).collect(),
        }
    }

    pub fn grant(&mut self, permission: impl Into<String>) {
        self.granted.insert(permission.into());
    }
}

impl PermissionHolder for GrantedPermissions {
    fn holds(&self, permission: &str) -> bool {
        self.granted.contains(permission)
    }
}

/// All-or-nothing check run before any provider is probed.
pub struct PermissionGate<'a> {
    source: &'a dyn MetadataSource,
    holder: &'a dyn PermissionHolder,
}

impl<'a> PermissionGate<'a> {
    pub fn new(source: &'a dyn MetadataSource, holder: &'a dyn PermissionHolder) -> Self {
        Self { source, holder }
    }

    /// Read and write permissions declared by the provider serving
    /// `authority`. An authority no package declares requires nothing.
    pub fn required_permissions(&self, authority: &str) -> Result<BTreeSet<String>, GateError> {
        let mut required = BTreeSet::new();
        match self.source.resolve_authority(authority)? {
            Some(provider) => {
                required.extend(provider.read_permission);
                required.extend(provider.write_permission);
            }
            None => debug!(authority, "authority not declared by any known package"),
        }
        Ok(required)
    }

    pub fn is_authorized(&self, permissions: &BTreeSet<String>) -> bool {
        permissions.iter().all(|p| self.holder.holds(p))
    }

    /// Denies with the list of missing permissions unless every declared one
    /// is held.
    pub fn authorize(&self, authority: &str) -> Result<(), GateError> {
        let required = self.required_permissions(authority)?;
        if self.is_authorized(&required) {
            return Ok(());
        }
        let missing: Vec<String> = required
            .into_iter()
            .filter(|p| !self.holder.holds(p))
            .collect();
        warn!(authority, ?missing, "required permissions are not held; discovery not started");
        Err(GateError::PermissionDenied {
            authority: authority.to_string(),
            missing,
        })
    }
}
