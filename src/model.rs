// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory permission model: an ordered list of resources, each holding an ordered list of
//! per-role grants.
//!
//! Mutations through [`PermissionModel`] uphold two invariants: resource URIs are unique across
//! the model and roles are unique within a resource. Bulk construction through
//! [`PermissionModel::from_resources`] and [`Resource::new`] trusts its input and does not
//! re-check them.
use serde::Serialize;
use thiserror::Error;

use crate::access::AccessKind;
use crate::roles::RoleIndex;

/// Error types for mutating a permission model.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ModelError {
    /// A resource with this URI already exists.
    #[error("resource '{0}' already exists")]
    DuplicateResource(String),

    /// No resource with this URI exists.
    #[error("resource '{0}' not found")]
    UnknownResource(String),

    /// The resource exists but has no grant for this role.
    #[error("role '{role}' has no grant on resource '{uri}'")]
    UnknownRoleOnResource { role: String, uri: String },

    /// Role names and resource URIs can not be empty or whitespace only.
    #[error("role or resource name can not be empty")]
    EmptyName,
}

/// Treat empty and whitespace-only filter expressions as "no filter".
pub(crate) fn normalize_filter(filter: Option<String>) -> Option<String> {
    filter.filter(|text| !text.trim().is_empty())
}

/// Access rights (and an optional filter) of one role on one resource.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Grant {
    role: String,
    access: Vec<AccessKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    filter: Option<String>,
}

impl Grant {
    /// Repeated kinds in `access` are dropped, the first occurrence keeps its position.
    pub fn new(role: impl Into<String>, access: Vec<AccessKind>) -> Self {
        let mut unique = Vec::with_capacity(access.len());
        for kind in access {
            if !unique.contains(&kind) {
                unique.push(kind);
            }
        }

        Self {
            role: role.into(),
            access: unique,
            filter: None,
        }
    }

    /// Attach a filter expression, an empty expression leaves the grant unfiltered.
    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = normalize_filter(Some(filter.into()));
        self
    }

    pub fn role(&self) -> &str {
        &self.role
    }

    /// Granted access kinds in insertion order.
    pub fn access(&self) -> &[AccessKind] {
        &self.access
    }

    pub fn filter(&self) -> Option<&str> {
        self.filter.as_deref()
    }

    pub fn has(&self, kind: &AccessKind) -> bool {
        self.access.contains(kind)
    }

    /// Add the kind if absent, remove it if present. Returns true if the kind is now granted.
    ///
    /// Remaining kinds keep their order, a re-added kind goes to the end.
    pub fn toggle(&mut self, kind: AccessKind) -> bool {
        match self.access.iter().position(|granted| granted == &kind) {
            Some(index) => {
                self.access.remove(index);
                false
            }
            None => {
                self.access.push(kind);
                true
            }
        }
    }

    pub fn set_filter(&mut self, filter: Option<String>) {
        self.filter = normalize_filter(filter);
    }
}

/// A protected resource with its grants.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Resource {
    uri: String,
    #[serde(rename = "permissions")]
    grants: Vec<Grant>,
}

impl Resource {
    /// Construct a resource from already known grants.
    ///
    /// Role uniqueness is not checked here.
    pub fn new(uri: impl Into<String>, grants: Vec<Grant>) -> Self {
        Self {
            uri: uri.into(),
            grants,
        }
    }

    pub fn uri(&self) -> &str {
        &self.uri
    }

    pub fn grants(&self) -> &[Grant] {
        &self.grants
    }

    pub fn grant(&self, role: &str) -> Option<&Grant> {
        self.grants.iter().find(|grant| grant.role == role)
    }

    fn grant_mut(&mut self, role: &str) -> Option<&mut Grant> {
        self.grants.iter_mut().find(|grant| grant.role == role)
    }

    /// Insert a grant, replacing an existing grant of the same role in place.
    pub(crate) fn upsert_grant(&mut self, grant: Grant) {
        match self.grant_mut(&grant.role) {
            Some(existing) => *existing = grant,
            None => self.grants.push(grant),
        }
    }
}

/// Ordered collection of resources.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct PermissionModel {
    resources: Vec<Resource>,
}

impl PermissionModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Construct a model from a list of resources as-is.
    ///
    /// Duplicate URIs or roles are accepted, this is the trusted bulk path used by the JSON
    /// codec.
    pub fn from_resources(resources: Vec<Resource>) -> Self {
        Self { resources }
    }

    /// Sample policy with three resources and three roles.
    pub fn example() -> Self {
        use AccessKind::*;

        Self::from_resources(vec![
            Resource::new(
                "configuration/entityTypes",
                vec![
                    Grant::new(
                        "ACME_BUSINESS_ADMIN",
                        vec![Create, Read, Update, Delete, Merge, Unmerge],
                    ),
                    Grant::new(
                        "ACME_DATA_STEWARD",
                        vec![Create, Read, Update, Merge, Unmerge],
                    ),
                    Grant::new("ACME_READ_ONLY", vec![Read]),
                ],
            ),
            Resource::new(
                "configuration/relationTypes",
                vec![
                    Grant::new("ACME_BUSINESS_ADMIN", vec![Create, Read, Update, Delete]),
                    Grant::new("ACME_DATA_STEWARD", vec![Create, Read, Update, Delete]),
                    Grant::new("ACME_READ_ONLY", vec![Read]),
                ],
            ),
            Resource::new(
                "configuration/entityTypes/Organization",
                vec![
                    Grant::new("ACME_BUSINESS_ADMIN", vec![Create, Read, Update, Delete])
                        .with_filter(r#"equals(attributes.Addresses.Country, "US")"#),
                    Grant::new("ACME_DATA_STEWARD", vec![Read, Update]),
                ],
            ),
        ])
    }

    pub fn resources(&self) -> &[Resource] {
        &self.resources
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    pub fn resource(&self, uri: &str) -> Option<&Resource> {
        self.resources.iter().find(|resource| resource.uri == uri)
    }

    fn resource_mut(&mut self, uri: &str) -> Option<&mut Resource> {
        self.resources.iter_mut().find(|resource| resource.uri == uri)
    }

    /// Look up a resource, appending an empty one if it doesn't exist yet.
    pub(crate) fn resource_or_insert(&mut self, uri: &str) -> &mut Resource {
        let index = match self.resources.iter().position(|resource| resource.uri == uri) {
            Some(index) => index,
            None => {
                self.resources.push(Resource::new(uri, Vec::new()));
                self.resources.len() - 1
            }
        };
        &mut self.resources[index]
    }

    pub fn grant(&self, role: &str, uri: &str) -> Option<&Grant> {
        self.resource(uri).and_then(|resource| resource.grant(role))
    }

    fn grant_mut(&mut self, role: &str, uri: &str) -> Result<&mut Grant, ModelError> {
        let resource = self
            .resource_mut(uri)
            .ok_or_else(|| ModelError::UnknownResource(uri.to_owned()))?;
        resource
            .grant_mut(role)
            .ok_or_else(|| ModelError::UnknownRoleOnResource {
                role: role.to_owned(),
                uri: uri.to_owned(),
            })
    }

    /// Sorted, de-duplicated list of every role appearing in the model.
    pub fn roles(&self) -> RoleIndex {
        RoleIndex::recompute(self)
    }

    /// Append a new resource with a READ grant for each of the given roles.
    ///
    /// Roles are kept in the given order, repeated roles only produce one grant.
    pub fn add_resource<I, R>(&mut self, uri: &str, initial_roles: I) -> Result<(), ModelError>
    where
        I: IntoIterator<Item = R>,
        R: AsRef<str>,
    {
        if uri.trim().is_empty() {
            return Err(ModelError::EmptyName);
        }

        if self.resource(uri).is_some() {
            return Err(ModelError::DuplicateResource(uri.to_owned()));
        }

        let mut resource = Resource::new(uri, Vec::new());
        for role in initial_roles {
            let role = role.as_ref();
            if role.trim().is_empty() {
                return Err(ModelError::EmptyName);
            }
            if resource.grant(role).is_none() {
                resource
                    .grants
                    .push(Grant::new(role, vec![AccessKind::Read]));
            }
        }

        self.resources.push(resource);
        Ok(())
    }

    /// Remove a resource. Returns false if it didn't exist.
    pub fn remove_resource(&mut self, uri: &str) -> bool {
        let before = self.resources.len();
        self.resources.retain(|resource| resource.uri != uri);
        self.resources.len() != before
    }

    /// Give the role READ access on every resource which doesn't have a grant for it yet.
    ///
    /// Returns the number of resources which received a new grant.
    pub fn add_role(&mut self, role: &str) -> Result<usize, ModelError> {
        if role.trim().is_empty() {
            return Err(ModelError::EmptyName);
        }

        let mut added = 0;
        for resource in self.resources.iter_mut() {
            if resource.grant(role).is_none() {
                resource
                    .grants
                    .push(Grant::new(role, vec![AccessKind::Read]));
                added += 1;
            }
        }
        Ok(added)
    }

    /// Remove the grants of a role from every resource. Resources left without grants stay.
    ///
    /// Returns the number of removed grants.
    pub fn remove_role(&mut self, role: &str) -> usize {
        let mut removed = 0;
        for resource in self.resources.iter_mut() {
            let before = resource.grants.len();
            resource.grants.retain(|grant| grant.role != role);
            removed += before - resource.grants.len();
        }
        removed
    }

    /// Flip an access kind on a grant. Returns true if the kind is now granted.
    pub fn toggle_access(
        &mut self,
        role: &str,
        uri: &str,
        kind: AccessKind,
    ) -> Result<bool, ModelError> {
        let grant = self.grant_mut(role, uri)?;
        Ok(grant.toggle(kind))
    }

    /// Set the filter expression of a grant. Blank text removes the filter.
    pub fn set_filter(&mut self, role: &str, uri: &str, text: &str) -> Result<(), ModelError> {
        let grant = self.grant_mut(role, uri)?;
        grant.set_filter(Some(text.to_owned()));
        Ok(())
    }

    /// Returns true if the role holds this access kind on the resource.
    pub fn query_access(&self, role: &str, uri: &str, kind: &AccessKind) -> bool {
        self.grant(role, uri)
            .map(|grant| grant.has(kind))
            .unwrap_or(false)
    }
}
