//! Copyright © 2025-2026 Wenze Wei. All Rights Reserved.
//!
//! This file is part of Hzx.
//! The Hzx project belongs to the Dunimd Team.
//!
//! Licensed under the Apache License, Version 2.0 (the "License");
//! You may not use this file except in compliance with the License.
//! You may obtain a copy of the License at
//!
//!     http://www.apache.org/licenses/LICENSE-2.0
//!
//! Unless required by applicable law or agreed to in writing, software
//! distributed under the License is distributed on an "AS IS" BASIS,
//! WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
//! See the License for the specific language governing permissions and
//! limitations under the License.

use std::fs;
use std::path::Path;

use serde_json::{json, Map, Value};
use tempfile::TempDir;

use hzx::{HzEnabledEntry, HzError, HzSiteConfig};

fn write(dir: &Path, name: &str, contents: &str) {
    fs::write(dir.join(name), contents).unwrap();
}

fn object(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        other => panic!("expected an object, got {}", other),
    }
}

#[test]
fn defaults_match_a_stock_site() {
    let config = HzSiteConfig::new();
    assert_eq!(config.slug, "horizon");
    assert_eq!(config.name, "Horizon");
    assert_eq!(config.namespace, "horizon");
    assert_eq!(config.url_prefix, "/");
    assert!(config.installed_apps.is_empty());
    assert!(config.default_dashboard.is_none());
}

#[test]
fn setters_chain() {
    let config = HzSiteConfig::new()
        .slug("admin")
        .namespace("admin")
        .url_prefix("/admin/")
        .installed_apps(["app.project"])
        .dashboards(["project"])
        .default_dashboard("project")
        .user_home("/project/")
        .urls("app.urls");
    assert_eq!(config.url_prefix, "/admin/");
    assert_eq!(config.dashboards, vec!["project".to_string()]);
    assert_eq!(config.user_home, Some(json!("/project/")));
    assert_eq!(config.urls.as_deref(), Some("app.urls"));
}

#[test]
fn json_file_loads_by_extension() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("site.json");
    fs::write(
        &path,
        r#"{"installed_apps": ["app.project"], "default_dashboard": "project",
            "panel_customization": [{"PANEL": "images", "PANEL_DASHBOARD": "project"}]}"#,
    )
    .unwrap();

    let config = HzSiteConfig::from_path(&path).unwrap();
    assert_eq!(config.installed_apps, vec!["app.project".to_string()]);
    assert_eq!(config.default_dashboard.as_deref(), Some("project"));
    assert_eq!(config.panel_customization.len(), 1);
    assert_eq!(config.namespace, "horizon");
}

#[cfg(feature = "yaml")]
#[test]
fn yaml_file_loads_by_extension() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("site.yml");
    fs::write(
        &path,
        "slug: admin\nurl_prefix: /admin/\ndashboards:\n  - identity\n  - project\n",
    )
    .unwrap();

    let config = HzSiteConfig::from_path(&path).unwrap();
    assert_eq!(config.slug, "admin");
    assert_eq!(config.url_prefix, "/admin/");
    assert_eq!(
        config.dashboards,
        vec!["identity".to_string(), "project".to_string()]
    );
}

#[test]
fn unknown_extensions_are_rejected() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("site.toml");
    fs::write(&path, "slug = 'admin'").unwrap();
    assert!(matches!(
        HzSiteConfig::from_path(&path),
        Err(HzError::ImproperlyConfigured(_))
    ));
}

#[test]
fn missing_files_surface_io_errors() {
    let dir = TempDir::new().unwrap();
    assert!(matches!(
        HzSiteConfig::from_path(dir.path().join("absent.json")),
        Err(HzError::Io(_))
    ));
}

#[test]
fn wrongly_typed_keys_are_improperly_configured() {
    let err = HzSiteConfig::from_json(&json!({"installed_apps": "app.project"})).unwrap_err();
    assert!(matches!(err, HzError::ImproperlyConfigured(_)));
}

#[test]
fn enabled_entries_merge_into_the_configuration() {
    let mut config = HzSiteConfig::new()
        .installed_apps(["app.base"])
        .dashboards(["settings", "identity"]);
    config
        .apply_enabled_entries(vec![
            HzEnabledEntry::new(
                "_10_project",
                object(json!({
                    "DASHBOARD": "project",
                    "DEFAULT": true,
                    "ADD_INSTALLED_APPS": ["app.project"],
                })),
            ),
            HzEnabledEntry::new(
                "_20_admin",
                object(json!({
                    "DASHBOARD": "admin",
                    "ADD_INSTALLED_APPS": ["app.admin", "app.project", "app.base"],
                })),
            ),
            HzEnabledEntry::new(
                "_30_settings",
                object(json!({"DASHBOARD": "settings", "DISABLED": true})),
            ),
            HzEnabledEntry::new(
                "_40_images",
                object(json!({"PANEL": "images", "PANEL_DASHBOARD": "project"})),
            ),
            HzEnabledEntry::new(
                "_50_disabled_panel",
                object(json!({"PANEL": "volumes", "PANEL_DASHBOARD": "project", "DISABLED": 1})),
            ),
        ])
        .unwrap();

    assert_eq!(config.dashboards, vec!["identity", "project", "admin"]);
    assert_eq!(config.default_dashboard.as_deref(), Some("project"));
    assert_eq!(
        config.installed_apps,
        vec!["app.project", "app.admin", "app.base"]
    );
    assert_eq!(config.panel_customization.len(), 1);
    assert_eq!(
        config.panel_customization[0].get("__name__"),
        Some(&json!("_40_images"))
    );
}

#[test]
fn configured_dashboards_keep_their_position() {
    let mut config = HzSiteConfig::new().dashboards(["identity", "project"]);
    config
        .apply_enabled_entries(vec![HzEnabledEntry::new(
            "_10_project",
            object(json!({"DASHBOARD": "project"})),
        )])
        .unwrap();
    assert_eq!(config.dashboards, vec!["identity", "project"]);
}

#[test]
fn installed_apps_must_be_strings() {
    let mut config = HzSiteConfig::new();
    let err = config
        .apply_enabled_entries(vec![HzEnabledEntry::new(
            "_10_bad",
            object(json!({"ADD_INSTALLED_APPS": [1, 2]})),
        )])
        .unwrap_err();
    assert!(matches!(err, HzError::ImproperlyConfigured(_)));
}

#[test]
fn enabled_directory_is_read_in_file_name_order() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "_20_admin.json", r#"{"DASHBOARD": "admin"}"#);
    write(dir.path(), "_10_project.json", r#"{"DASHBOARD": "project", "DEFAULT": true}"#);
    write(
        dir.path(),
        "_30_images.json",
        r#"{"PANEL": "images", "PANEL_DASHBOARD": "project"}"#,
    );
    write(dir.path(), "__init__.json", r#"{"DASHBOARD": "hidden"}"#);
    write(dir.path(), "README.txt", "not a plugin file");

    let entries = HzEnabledEntry::read_dir(dir.path()).unwrap();
    let names = entries.iter().map(|e| e.name.as_str()).collect::<Vec<_>>();
    assert_eq!(names, vec!["_10_project", "_20_admin", "_30_images"]);

    let mut config = HzSiteConfig::new();
    config.apply_enabled_dir(dir.path()).unwrap();
    assert_eq!(config.dashboards, vec!["project", "admin"]);
    assert_eq!(config.default_dashboard.as_deref(), Some("project"));
    assert_eq!(
        config.panel_customization[0].get("__name__"),
        Some(&json!("_30_images"))
    );
}

#[cfg(feature = "yaml")]
#[test]
fn enabled_directory_reads_yaml_files() {
    let dir = TempDir::new().unwrap();
    write(
        dir.path(),
        "_10_project.yaml",
        "DASHBOARD: project\nADD_INSTALLED_APPS:\n  - app.project\n",
    );
    let mut config = HzSiteConfig::new();
    config.apply_enabled_dir(dir.path()).unwrap();
    assert_eq!(config.dashboards, vec!["project"]);
    assert_eq!(config.installed_apps, vec!["app.project"]);
}

#[test]
fn enabled_files_must_hold_objects() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "_10_list.json", r#"["project"]"#);
    assert!(matches!(
        HzEnabledEntry::read_dir(dir.path()),
        Err(HzError::ImproperlyConfigured(_))
    ));
}
