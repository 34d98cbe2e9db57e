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

#[path = "../common/mod.rs"]
mod common;

use std::sync::Arc;

use hzx::{HzComponent, HzDashboardClass, HzError, HzPanelClass};

#[test]
fn registering_twice_returns_the_same_instance() {
    let mut site = common::site();
    let first = site.register(common::cats_class()).unwrap();
    let second = site.register(common::cats_class()).unwrap();
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(site.registry().len(), 1);
}

#[test]
fn registering_a_panel_as_a_dashboard_is_a_value_error() {
    let mut site = common::site();
    let err = site.register(common::kittens_class()).unwrap_err();
    assert!(matches!(err, HzError::Value(_)), "got {:?}", err);
    assert!(site.registry().is_empty());
}

#[test]
fn blank_slug_is_improperly_configured() {
    let mut site = common::site();
    let err = site
        .register(HzDashboardClass::new("app.blank.dashboard", "Blank", ""))
        .unwrap_err();
    assert!(matches!(err, HzError::ImproperlyConfigured(_)));
}

#[test]
fn unregistering_an_unknown_class_is_not_registered() {
    let mut site = common::site();
    let err = site.unregister(common::dogs_class()).unwrap_err();
    assert!(err.is_not_registered());
}

#[test]
fn unregister_removes_and_keeps_order() {
    let mut site = common::site();
    site.register(common::cats_class()).unwrap();
    site.register(common::dogs_class()).unwrap();
    site.register(HzDashboardClass::new("app.birds.dashboard", "Birds", "birds"))
        .unwrap();

    assert!(site.unregister(common::dogs_class()).unwrap());
    let slugs = site
        .registry()
        .values()
        .map(|d| d.slug().to_string())
        .collect::<Vec<_>>();
    assert_eq!(slugs, vec!["cats".to_string(), "birds".to_string()]);
    assert!(site.registered("dogs").is_err());
}

#[test]
fn lookup_by_class_or_slug() {
    let mut site = common::site();
    let cats = Arc::new(common::cats_class());
    site.register(Arc::clone(&cats)).unwrap();

    assert_eq!(site.registered(&cats).unwrap().slug(), "cats");
    assert_eq!(site.registered("cats").unwrap().slug(), "cats");

    let err = site.registered("lions").unwrap_err();
    assert_eq!(
        err,
        HzError::NotRegistered("Dashboard with slug \"lions\" is not registered.".to_string())
    );
}

#[test]
fn panel_lookup_miss_names_the_dashboard() {
    let mut site = common::site();
    site.register(common::cats_class()).unwrap();
    site.register_panel("cats", common::kittens_class()).unwrap();

    let cats = site.registered("cats").unwrap();
    assert_eq!(cats.get_panel("kittens").unwrap().registered_with, "cats");
    let err = cats.get_panel("lions").unwrap_err();
    assert_eq!(
        err.to_string(),
        "Panel with slug \"lions\" is not registered with Dashboard \"cats\"."
    );
}

#[test]
fn panels_must_be_registered_with_an_existing_dashboard() {
    let mut site = common::site();
    let err = site
        .register_panel("cats", common::kittens_class())
        .unwrap_err();
    assert!(err.is_not_registered());
}

#[test]
fn dashboard_class_cannot_be_registered_as_a_panel() {
    let mut site = common::site();
    site.register(common::cats_class()).unwrap();
    let err = site
        .register_panel("cats", common::dogs_class())
        .unwrap_err();
    assert!(matches!(err, HzError::Value(_)));
}

#[test]
fn unregister_panel_drops_its_template_dir() {
    let dir = tempfile::tempdir().unwrap();
    let mut site = common::site();
    site.register(common::cats_class()).unwrap();
    site.register_panel(
        "cats",
        common::kittens_class().with_template_dir(dir.path()),
    )
    .unwrap();
    site.register_panel(
        "cats",
        HzPanelClass::new("app.cats.lions.panel", "Lions", "lions")
            .with_template_dir(dir.path().join("missing")),
    )
    .unwrap();

    let keys = site.panel_template_dirs().keys().cloned().collect::<Vec<_>>();
    assert_eq!(keys, vec!["cats/kittens".to_string()]);

    assert!(site.unregister_panel("cats", "kittens").unwrap());
    assert!(site.panel_template_dirs().is_empty());
    assert!(site.registered("cats").unwrap().get_panel("kittens").is_err());
}
