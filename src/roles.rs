// SPDX-License-Identifier: MIT OR Apache-2.0

use std::collections::BTreeSet;

use crate::model::PermissionModel;

/// Sorted, de-duplicated set of all roles referenced by any grant of a model.
///
/// The index is derived data: it is recomputed from the model after every change and never
/// used as a source of truth.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RoleIndex(Vec<String>);

impl RoleIndex {
    pub fn recompute(model: &PermissionModel) -> Self {
        let roles: BTreeSet<&str> = model
            .resources()
            .iter()
            .flat_map(|resource| resource.grants())
            .map(|grant| grant.role())
            .collect();

        Self(roles.into_iter().map(str::to_owned).collect())
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn contains(&self, role: &str) -> bool {
        self.0
            .binary_search_by(|probe| probe.as_str().cmp(role))
            .is_ok()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
