#![cfg(test)]

use std::str::FromStr;

use semver::Version;

use crate::plugin_system::dependency::{Dependency, DependencyError, DependencyKind, RequirementIssue};
use crate::plugin_system::error::PluginSystemError;
use crate::plugin_system::version::{parse_version, VersionError, VersionRange};

#[test]
fn test_dependency_kind_from_type_string() {
    assert_eq!(DependencyKind::from("plugin".to_string()), DependencyKind::Plugin);
    assert_eq!(
        DependencyKind::from("extension".to_string()),
        DependencyKind::Other("extension".to_string())
    );
    assert!(DependencyKind::Plugin.is_plugin());
    assert!(!DependencyKind::Other("Plugin".to_string()).is_plugin());
}

#[test]
fn test_dependency_deserializes_type_field() {
    let json = r#"[
        {"type": "plugin", "name": "comments"},
        {"type": "plugin", "name": "likes", "version": ">=1.2"},
        {"type": "extension", "name": "gd"}
    ]"#;

    let deps: Vec<Dependency> = serde_json::from_str(json).unwrap();

    assert_eq!(deps[0], Dependency::plugin("comments"));
    assert!(deps[1].is_plugin());
    assert!(deps[1].version.as_ref().unwrap().includes_str("1.4.0"));
    assert!(!deps[1].version.as_ref().unwrap().includes_str("1.1.9"));
    assert_eq!(deps[2], Dependency::other("extension", "gd"));
    assert!(!deps[2].is_plugin());
}

#[test]
fn test_dependency_serializes_type_field() {
    let value = serde_json::to_value(Dependency::plugin("comments")).unwrap();
    assert_eq!(value, serde_json::json!({"type": "plugin", "name": "comments"}));

    let versioned = Dependency::plugin_version("likes", VersionRange::from_str("^2").unwrap());
    let value = serde_json::to_value(&versioned).unwrap();
    assert_eq!(value["version"], "^2");
}

#[test]
fn test_invalid_version_constraint_rejected() {
    let json = r#"{"type": "plugin", "name": "x", "version": "not a range"}"#;
    assert!(serde_json::from_str::<Dependency>(json).is_err());

    match VersionRange::from_str("not a range") {
        Err(VersionError::InvalidConstraint { constraint, .. }) => assert_eq!(constraint, "not a range"),
        other => panic!("Expected InvalidConstraint, got {:?}", other),
    }
}

#[test]
fn test_version_range_matching() {
    let range = VersionRange::from_str(">=1.0, <2.0").unwrap();
    assert!(range.includes(&Version::parse("1.5.0").unwrap()));
    assert!(!range.includes(&Version::parse("2.0.0").unwrap()));
    assert!(!range.includes_str("garbage"));
    assert_eq!(range.constraint_string(), ">=1.0, <2.0");
    assert!(parse_version("1.2").is_err());
}

#[test]
fn test_dependency_display() {
    assert_eq!(Dependency::plugin("a").to_string(), "plugin: a");
    let versioned = Dependency::plugin_version("a", VersionRange::from_str("^1.2").unwrap());
    assert_eq!(versioned.to_string(), "plugin: a (^1.2)");
}

#[test]
fn test_requirement_issue_messages() {
    assert_eq!(
        RequirementIssue::NotInstalled("x".to_string()).to_string(),
        "requires 'x', which is not installed"
    );
    assert_eq!(
        RequirementIssue::Inactive("x".to_string()).to_string(),
        "requires 'x', which is not active"
    );
    assert_eq!(
        RequirementIssue::ConflictActive("y".to_string()).to_string(),
        "conflicts with active plugin 'y'"
    );
}

#[test]
fn test_errors_carry_plugin_id() {
    let err = PluginSystemError::invalid_reference("nonexistent-id");
    assert_eq!(err.plugin_id(), Some("nonexistent-id"));
    assert!(err.to_string().contains("nonexistent-id"));

    let err = PluginSystemError::invalid_manifest("bare");
    assert_eq!(err.plugin_id(), Some("bare"));

    let err: PluginSystemError = DependencyError::Contradiction {
        plugin_id: "b".to_string(),
        root: "a".to_string(),
    }
    .into();
    assert_eq!(err.plugin_id(), Some("b"));
    assert!(err.to_string().contains("'a'"));
}

#[test]
fn test_unsatisfiable_lists_every_issue() {
    let err: PluginSystemError = DependencyError::Unsatisfiable {
        plugin_id: "b".to_string(),
        root: "a".to_string(),
        issues: vec![
            RequirementIssue::NotInstalled("x".to_string()),
            RequirementIssue::VersionMismatch {
                plugin_id: "y".to_string(),
                required: "^2".to_string(),
                found: "1.0.0".to_string(),
            },
        ],
    }
    .into();

    assert_eq!(err.plugin_id(), Some("b"));
    assert_eq!(
        err.to_string(),
        "Dependency resolution failed: Plugin 'b' cannot be activated while resolving 'a': \
         requires 'x', which is not installed; requires 'y' version '^2', but found version '1.0.0'"
    );
}
