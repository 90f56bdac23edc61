// SPDX-License-Identifier: MIT OR Apache-2.0

//! Editing session holding the live permission model.
//!
//! The editor is what a presentation layer talks to: it runs mutations on the model, keeps the
//! role index in sync and installs decoded documents. Decoding always happens into a detached
//! model first, the live model is only replaced once the whole document was accepted.
//!
//! An editor is a plain value without interior locking. Hosts sharing one session between
//! threads need to serialize access themselves, for example behind a mutex.
use tracing::debug;

use crate::access::{AccessCatalog, AccessKind};
use crate::builder::EditorBuilder;
use crate::config::Config;
use crate::csv::{self, CsvError};
use crate::json::{self, JsonError};
use crate::model::{ModelError, PermissionModel};
use crate::roles::RoleIndex;

/// Read-only view on the current state of an editor.
#[derive(Clone, Copy, Debug)]
pub struct Snapshot<'a> {
    pub model: &'a PermissionModel,
    pub roles: &'a RoleIndex,
}

#[derive(Clone, Debug)]
pub struct Editor {
    config: Config,
    model: PermissionModel,
    roles: RoleIndex,
}

impl Default for Editor {
    fn default() -> Self {
        Self::new()
    }
}

impl Editor {
    /// Editor with default configuration and an empty model.
    pub fn new() -> Self {
        Self::builder().build()
    }

    pub fn builder() -> EditorBuilder {
        EditorBuilder::new()
    }

    pub(crate) fn from_parts(config: Config, model: PermissionModel) -> Self {
        let roles = RoleIndex::recompute(&model);
        Self {
            config,
            model,
            roles,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn model(&self) -> &PermissionModel {
        &self.model
    }

    pub fn roles(&self) -> &RoleIndex {
        &self.roles
    }

    pub fn snapshot(&self) -> Snapshot<'_> {
        Snapshot {
            model: &self.model,
            roles: &self.roles,
        }
    }

    fn refresh_roles(&mut self) {
        self.roles = RoleIndex::recompute(&self.model);
    }

    /// Install a new model in place of the current one.
    pub fn replace(&mut self, model: PermissionModel) {
        self.model = model;
        self.refresh_roles();
    }

    pub fn add_resource<I, R>(&mut self, uri: &str, initial_roles: I) -> Result<(), ModelError>
    where
        I: IntoIterator<Item = R>,
        R: AsRef<str>,
    {
        self.model.add_resource(uri, initial_roles)?;
        self.refresh_roles();
        debug!(uri, "added resource");
        Ok(())
    }

    /// Add a resource with a READ grant for every role currently known to the editor.
    pub fn add_resource_for_known_roles(&mut self, uri: &str) -> Result<(), ModelError> {
        let roles = self.roles.clone();
        self.add_resource(uri, roles.iter())
    }

    /// Remove a resource, returns false if it didn't exist.
    ///
    /// Asking for confirmation is up to the caller.
    pub fn remove_resource(&mut self, uri: &str) -> bool {
        let removed = self.model.remove_resource(uri);
        self.refresh_roles();
        if removed {
            debug!(uri, "removed resource");
        }
        removed
    }

    pub fn add_role(&mut self, role: &str) -> Result<usize, ModelError> {
        let added = self.model.add_role(role)?;
        self.refresh_roles();
        debug!(role, added, "added role");
        Ok(added)
    }

    /// Remove a role from all resources, returns the number of removed grants.
    ///
    /// Asking for confirmation is up to the caller.
    pub fn remove_role(&mut self, role: &str) -> usize {
        let removed = self.model.remove_role(role);
        self.refresh_roles();
        debug!(role, removed, "removed role");
        removed
    }

    pub fn toggle_access(
        &mut self,
        role: &str,
        uri: &str,
        kind: AccessKind,
    ) -> Result<bool, ModelError> {
        debug!(role, uri, %kind, "toggle access");
        let granted = self.model.toggle_access(role, uri, kind)?;
        self.refresh_roles();
        debug!(role, uri, granted, "toggled access");
        Ok(granted)
    }

    pub fn set_filter(&mut self, role: &str, uri: &str, text: &str) -> Result<(), ModelError> {
        self.model.set_filter(role, uri, text)?;
        self.refresh_roles();
        debug!(role, uri, "updated filter");
        Ok(())
    }

    pub fn query_access(&self, role: &str, uri: &str, kind: &AccessKind) -> bool {
        self.model.query_access(role, uri, kind)
    }

    /// Catalog kinds the role does not hold on the resource yet, in catalog order.
    ///
    /// Returns `None` if there is no grant for this role on the resource.
    pub fn available_kinds(&self, role: &str, uri: &str) -> Option<Vec<&'static AccessKind>> {
        let grant = self.model.grant(role, uri)?;
        Some(
            AccessCatalog::standard()
                .kinds()
                .filter(|kind| !grant.has(kind))
                .collect(),
        )
    }

    pub fn encode_csv(&self) -> String {
        csv::encode(&self.model)
    }

    /// Replace the live model with the decoded CSV matrix.
    ///
    /// On failure the current model stays untouched.
    pub fn decode_csv(&mut self, text: &str) -> Result<(), CsvError> {
        let model = csv::decode(text)?;
        self.replace(model);
        Ok(())
    }

    pub fn encode_json(&self) -> Result<String, JsonError> {
        json::encode(&self.model, self.config.json_format)
    }

    /// Replace the live model with the decoded JSON document.
    ///
    /// On failure the current model stays untouched.
    pub fn decode_json(&mut self, text: &str) -> Result<(), JsonError> {
        let model = json::decode(text)?;
        self.replace(model);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::access::AccessKind;
    use crate::config::Seed;
    use crate::csv::CsvError;
    use crate::json::{JsonError, JsonFormat};
    use crate::model::{ModelError, PermissionModel};

    use super::Editor;

    #[test]
    fn builder_seeds() {
        let editor = Editor::new();
        assert!(editor.model().is_empty());
        assert!(editor.roles().is_empty());

        let editor = Editor::builder().seed(Seed::Example).build();
        assert_eq!(editor.model(), &PermissionModel::example());
        assert_eq!(
            editor.roles().as_slice(),
            ["ACME_BUSINESS_ADMIN", "ACME_DATA_STEWARD", "ACME_READ_ONLY"]
        );
    }

    #[test]
    fn role_index_follows_mutations() {
        let mut editor = Editor::new();
        editor.add_resource("a", ["ZED", "ADMIN"]).unwrap();
        assert_eq!(editor.roles().as_slice(), ["ADMIN", "ZED"]);

        editor.add_role("MIDDLE").unwrap();
        assert_eq!(editor.roles().as_slice(), ["ADMIN", "MIDDLE", "ZED"]);

        editor.remove_role("ZED");
        assert_eq!(editor.roles().as_slice(), ["ADMIN", "MIDDLE"]);

        editor.remove_resource("a");
        assert!(editor.roles().is_empty());
    }

    #[test]
    fn add_resource_for_known_roles() {
        let mut editor = Editor::builder().seed(Seed::Example).build();
        editor.add_resource_for_known_roles("configuration/sources").unwrap();

        let resource = editor.model().resource("configuration/sources").unwrap();
        assert_eq!(resource.grants().len(), 3);
        assert!(editor.query_access("ACME_READ_ONLY", "configuration/sources", &AccessKind::Read));

        assert_eq!(
            editor.add_resource_for_known_roles("configuration/sources"),
            Err(ModelError::DuplicateResource("configuration/sources".into()))
        );
    }

    #[test]
    fn available_kinds() {
        let editor = Editor::builder().seed(Seed::Example).build();

        let available = editor
            .available_kinds("ACME_DATA_STEWARD", "configuration/entityTypes/Organization")
            .unwrap();
        assert_eq!(
            available,
            [
                &AccessKind::ReadMasked,
                &AccessKind::Create,
                &AccessKind::Delete,
                &AccessKind::Merge,
                &AccessKind::Unmerge,
                &AccessKind::InitiateChangeRequest,
                &AccessKind::AcceptChangeRequest,
            ]
        );
        assert!(
            editor
                .available_kinds("ACME_READ_ONLY", "configuration/entityTypes/Organization")
                .is_none()
        );
    }

    #[test]
    fn failed_decode_keeps_model() {
        let mut editor = Editor::builder().seed(Seed::Example).build();

        assert_eq!(
            editor.decode_csv("Resource,a\nADMIN,Read"),
            Err(CsvError::MalformedHeader("Resource".into()))
        );
        assert!(matches!(
            editor.decode_json(r#"[{"uri":"a","permissions":[{"role":"x"}]}]"#),
            Err(JsonError::InvalidShape(_))
        ));
        assert!(matches!(
            editor.decode_json("not json"),
            Err(JsonError::ParseFailure(_))
        ));

        assert_eq!(editor.model(), &PermissionModel::example());
        assert_eq!(editor.roles().len(), 3);
    }

    #[test]
    fn decode_replaces_model() {
        let mut editor = Editor::builder().seed(Seed::Example).build();

        editor.decode_csv("Role,other\nNEW_ROLE,Delete").unwrap();
        assert_eq!(editor.model().resources().len(), 1);
        assert_eq!(editor.roles().as_slice(), ["NEW_ROLE"]);

        editor
            .decode_json(r#"[{"uri":"x","permissions":[{"role":"JSON_ROLE","access":[]}]}]"#)
            .unwrap();
        assert_eq!(editor.roles().as_slice(), ["JSON_ROLE"]);
    }

    #[test]
    fn json_format_is_configurable() {
        let editor = Editor::builder()
            .json_format(JsonFormat::Compact)
            .model(PermissionModel::new())
            .build();
        assert_eq!(editor.encode_json().unwrap(), "[]");

        let editor = Editor::new();
        assert_eq!(editor.encode_json().unwrap(), "[]");
    }
}
