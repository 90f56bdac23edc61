// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities.
use crate::access::AccessKind;
use crate::model::{Grant, PermissionModel, Resource};

pub fn setup_logging() {
    if std::env::var("RUST_LOG").is_ok() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .try_init();
    }
}

/// Model with a single resource holding a single grant.
pub fn single_grant(uri: &str, grant: Grant) -> PermissionModel {
    PermissionModel::from_resources(vec![Resource::new(uri, vec![grant])])
}

/// Model touching every corner of the codecs: unknown kinds, filters with quotes and commas,
/// grants without access and resources without grants.
pub fn tricky_model() -> PermissionModel {
    PermissionModel::from_resources(vec![
        Resource::new(
            "data/entities",
            vec![
                Grant::new("ADMIN", vec![AccessKind::Read, AccessKind::Create])
                    .with_filter(r#"contains(attributes.Name, "A, B""C")"#),
                Grant::new("AUDITOR", vec![AccessKind::from_identifier("EXPORT")]),
                Grant::new("GUEST", vec![]).with_filter("equals(public, true)"),
            ],
        ),
        Resource::new("data/empty", vec![]),
        Resource::new(
            "data/relations",
            vec![Grant::new(
                "ADMIN",
                vec![AccessKind::AcceptChangeRequest, AccessKind::ReadMasked],
            )],
        ),
    ])
}
