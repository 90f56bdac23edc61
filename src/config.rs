// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::json::JsonFormat;
use crate::model::PermissionModel;

/// Initial content of a new editor session.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Seed {
    /// Start without any resources.
    #[default]
    Empty,

    /// Start with the sample policy of [`PermissionModel::example`].
    Example,
}

impl Seed {
    pub fn model(&self) -> PermissionModel {
        match self {
            Seed::Empty => PermissionModel::new(),
            Seed::Example => PermissionModel::example(),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Config {
    pub seed: Seed,
    pub json_format: JsonFormat,
}
