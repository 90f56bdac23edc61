// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::Editor;
use crate::config::{Config, Seed};
use crate::json::JsonFormat;
use crate::model::PermissionModel;

#[derive(Default)]
pub struct EditorBuilder {
    config: Config,
    model: Option<PermissionModel>,
}

impl EditorBuilder {
    pub(crate) fn new() -> Self {
        EditorBuilder {
            config: Config::default(),
            model: None,
        }
    }

    pub fn seed(mut self, seed: Seed) -> Self {
        self.config.seed = seed;
        self
    }

    pub fn json_format(mut self, format: JsonFormat) -> Self {
        self.config.json_format = format;
        self
    }

    /// Start from this model instead of the configured seed.
    pub fn model(mut self, model: PermissionModel) -> Self {
        self.model = Some(model);
        self
    }

    pub fn config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    pub fn build(self) -> Editor {
        let model = self.model.unwrap_or_else(|| self.config.seed.model());
        Editor::from_parts(self.config, model)
    }
}
