// SPDX-License-Identifier: MIT OR Apache-2.0

//! Describe which roles hold which access rights on which resources, optionally narrowed by a
//! filter expression, and move that policy losslessly between CSV and JSON.
//!
//! The crate only describes a policy, it does not enforce one.
pub mod access;
mod builder;
mod config;
pub mod csv;
mod editor;
pub mod json;
mod model;
mod roles;
#[cfg(any(test, feature = "test_utils"))]
pub mod test_utils;

pub use access::{AccessCatalog, AccessKind, Lookup, Swatch};
pub use builder::EditorBuilder;
pub use config::{Config, Seed};
pub use csv::{CsvError, EXPORT_FILE_NAME};
pub use editor::{Editor, Snapshot};
pub use json::{JsonError, JsonFormat};
pub use model::{Grant, ModelError, PermissionModel, Resource};
pub use roles::RoleIndex;
