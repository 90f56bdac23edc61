// SPDX-License-Identifier: MIT OR Apache-2.0

//! Encode or decode a permission model as a JSON document.
//!
//! The document is an array of resource objects:
//!
//! ```json
//! [
//!   {
//!     "uri": "configuration/entityTypes",
//!     "permissions": [
//!       { "role": "ADMIN", "access": ["READ", "CREATE"], "filter": "equals(type, \"x\")" }
//!     ]
//!   }
//! ]
//! ```
//!
//! Field names are part of the external contract. Decoding checks the shape of the document
//! but no further invariants: duplicate URIs or roles are installed as they are.
//!
//! A `filter` which is empty or only whitespace is read as "no filter", the same way
//! [`PermissionModel::set_filter`] treats it. Repeated kinds in an `access` array are collapsed.
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use crate::access::AccessKind;
use crate::model::{Grant, PermissionModel, Resource};

/// Output style of the JSON encoder.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum JsonFormat {
    /// Two-space indented document.
    #[default]
    Pretty,

    /// Single line without whitespace.
    Compact,
}

/// Error types for encoding or decoding a JSON permission document.
#[derive(Debug, Error)]
pub enum JsonError {
    /// Text is not valid JSON.
    #[error("error parsing json: {0}")]
    ParseFailure(#[source] serde_json::Error),

    /// JSON is valid but does not have the expected structure.
    #[error("invalid format: {0}")]
    InvalidShape(String),

    #[error("error encoding json: {0}")]
    Encode(#[source] serde_json::Error),
}

fn invalid_shape(reason: &str) -> JsonError {
    JsonError::InvalidShape(reason.to_owned())
}

/// Serializes a model into a JSON document.
pub fn encode(model: &PermissionModel, format: JsonFormat) -> Result<String, JsonError> {
    match format {
        JsonFormat::Pretty => serde_json::to_string_pretty(model),
        JsonFormat::Compact => serde_json::to_string(model),
    }
    .map_err(JsonError::Encode)
}

/// Parses and validates a JSON document into a new model.
pub fn decode(text: &str) -> Result<PermissionModel, JsonError> {
    let value: Value = serde_json::from_str(text).map_err(JsonError::ParseFailure)?;

    let Value::Array(items) = value else {
        return Err(invalid_shape("expected array"));
    };

    let resources = items
        .iter()
        .map(decode_resource)
        .collect::<Result<Vec<_>, _>>()?;
    let model = PermissionModel::from_resources(resources);

    debug!(
        resources = model.resources().len(),
        roles = model.roles().len(),
        "decoded json permission document"
    );

    Ok(model)
}

fn decode_resource(value: &Value) -> Result<Resource, JsonError> {
    let uri = value
        .get("uri")
        .and_then(Value::as_str)
        .filter(|uri| !uri.is_empty());
    let permissions = value.get("permissions").and_then(Value::as_array);

    let (Some(uri), Some(permissions)) = (uri, permissions) else {
        return Err(invalid_shape("missing uri or permissions array"));
    };

    let grants = permissions
        .iter()
        .map(decode_grant)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Resource::new(uri, grants))
}

fn decode_grant(value: &Value) -> Result<Grant, JsonError> {
    let role = value
        .get("role")
        .and_then(Value::as_str)
        .filter(|role| !role.is_empty());
    let access = value.get("access").and_then(Value::as_array);

    let (Some(role), Some(access)) = (role, access) else {
        return Err(invalid_shape("missing role or access array"));
    };

    let access = access
        .iter()
        .map(|kind| {
            let kind = kind
                .as_str()
                .map(AccessKind::from_identifier)
                .ok_or_else(|| invalid_shape("access entries must be strings"))?;
            if !kind.is_known() {
                warn!(%kind, role, "unknown access kind in json document");
            }
            Ok(kind)
        })
        .collect::<Result<Vec<_>, JsonError>>()?;

    let filter = match value.get("filter") {
        None | Some(Value::Null) => None,
        Some(Value::String(filter)) => Some(filter.clone()),
        Some(_) => return Err(invalid_shape("filter must be a string")),
    };

    let mut grant = Grant::new(role, access);
    grant.set_filter(filter);
    Ok(grant)
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use crate::access::AccessKind;
    use crate::model::{Grant, PermissionModel, Resource};

    use super::{JsonError, JsonFormat, decode, encode};

    #[rstest]
    #[case(JsonFormat::Pretty)]
    #[case(JsonFormat::Compact)]
    fn round_trip(#[case] format: JsonFormat) {
        let model = PermissionModel::example();
        let text = encode(&model, format).unwrap();
        assert_eq!(decode(&text).unwrap(), model);
    }

    #[test]
    fn stable_field_names_and_order() {
        let model = PermissionModel::from_resources(vec![Resource::new(
            "a",
            vec![
                Grant::new("ADMIN", vec![AccessKind::Read, AccessKind::Create]),
                Grant::new("VIEWER", vec![]).with_filter(r#"equals(x, "y")"#),
            ],
        )]);

        assert_eq!(
            encode(&model, JsonFormat::Compact).unwrap(),
            r#"[{"uri":"a","permissions":[{"role":"ADMIN","access":["READ","CREATE"]},{"role":"VIEWER","access":[],"filter":"equals(x, \"y\")"}]}]"#
        );
    }

    #[test]
    fn pretty_uses_two_space_indentation() {
        let model = PermissionModel::from_resources(vec![Resource::new("a", vec![])]);
        assert_eq!(
            encode(&model, JsonFormat::Pretty).unwrap(),
            "[\n  {\n    \"uri\": \"a\",\n    \"permissions\": []\n  }\n]"
        );
    }

    #[rstest]
    #[case(r#"{"uri":"a","permissions":[]}"#, "expected array")]
    #[case(r#"[{"permissions":[]}]"#, "missing uri or permissions array")]
    #[case(r#"[{"uri":"","permissions":[]}]"#, "missing uri or permissions array")]
    #[case(r#"[{"uri":"a"}]"#, "missing uri or permissions array")]
    #[case(r#"[{"uri":"a","permissions":{}}]"#, "missing uri or permissions array")]
    #[case(r#"["a"]"#, "missing uri or permissions array")]
    #[case(r#"[{"uri":"a","permissions":[{"access":[]}]}]"#, "missing role or access array")]
    #[case(
        r#"[{"uri":"a","permissions":[{"role":"x","access":"READ"}]}]"#,
        "missing role or access array"
    )]
    #[case(
        r#"[{"uri":"a","permissions":[{"role":"x","access":[1]}]}]"#,
        "access entries must be strings"
    )]
    #[case(
        r#"[{"uri":"a","permissions":[{"role":"x","access":[],"filter":3}]}]"#,
        "filter must be a string"
    )]
    fn invalid_shapes(#[case] text: &str, #[case] reason: &str) {
        match decode(text) {
            Err(JsonError::InvalidShape(found)) => assert_eq!(found, reason),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn parse_failure_carries_reason() {
        let err = decode("[{").unwrap_err();
        assert!(matches!(err, JsonError::ParseFailure(_)));
        assert!(err.to_string().starts_with("error parsing json: "));
    }

    #[test]
    fn duplicates_are_accepted() {
        let model = decode(
            r#"[
                {"uri":"a","permissions":[{"role":"x","access":[]},{"role":"x","access":["READ"]}]},
                {"uri":"a","permissions":[]}
            ]"#,
        )
        .unwrap();

        assert_eq!(model.resources().len(), 2);
        assert_eq!(model.resources()[0].grants().len(), 2);
        assert_eq!(model.roles().as_slice(), ["x"]);
    }

    #[test]
    fn unknown_kinds_and_extra_fields_pass() {
        let model = decode(
            r#"[{"uri":"a","label":"ignored","permissions":[{"role":"x","access":["FOO","READ"],"filter":null}]}]"#,
        )
        .unwrap();

        let grant = model.grant("x", "a").unwrap();
        assert_eq!(
            grant.access(),
            [AccessKind::Other("FOO".into()), AccessKind::Read]
        );
        assert_eq!(grant.filter(), None);
    }

    #[rstest]
    #[case(r#"[{"uri":"a","permissions":[{"role":"x","access":[],"filter":""}]}]"#)]
    #[case(r#"[{"uri":"a","permissions":[{"role":"x","access":[],"filter":" \t "}]}]"#)]
    fn blank_filter_is_absent(#[case] text: &str) {
        let model = decode(text).unwrap();
        assert_eq!(model.grant("x", "a").unwrap().filter(), None);
        assert!(
            !encode(&model, JsonFormat::Compact)
                .unwrap()
                .contains("filter")
        );
    }

    #[test]
    fn repeated_kinds_collapse() {
        let model =
            decode(r#"[{"uri":"a","permissions":[{"role":"x","access":["READ","FOO","READ"]}]}]"#)
                .unwrap();
        assert_eq!(
            model.grant("x", "a").unwrap().access(),
            [AccessKind::Read, AccessKind::from_identifier("FOO")]
        );
    }
}
