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

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use proptest::prelude::*;
use serde_json::json;

use hzx::{
    HzComponent, HzDashboardClass, HzError, HzModule, HzPanelClass, HzPanelGroupSpec, HzSymbol,
    HzUser,
};

fn slugs(site: &hzx::HzSite) -> Vec<String> {
    site.get_dashboards()
        .unwrap()
        .iter()
        .map(|d| d.slug().to_string())
        .collect()
}

#[test]
fn unlisted_dashboards_are_sorted_by_slug() {
    let mut site = common::site();
    site.register(common::dogs_class()).unwrap();
    site.register(common::cats_class()).unwrap();
    assert_eq!(slugs(&site), vec!["cats", "dogs"]);
}

#[test]
fn configured_order_comes_first() {
    let config = common::config().dashboards(["dogs"]);
    let mut site = common::site_with(config, common::catalog());
    site.register(common::cats_class()).unwrap();
    site.register(HzDashboardClass::new("app.ants.dashboard", "Ants", "ants"))
        .unwrap();
    site.register(common::dogs_class()).unwrap();
    assert_eq!(slugs(&site), vec!["dogs", "ants", "cats"]);
}

#[test]
fn configured_order_accepts_class_paths() {
    let config = common::config().dashboards(["hz_test.dashboards.dogs.dashboard.Dogs", "cats"]);
    let mut site = common::site_with(config, common::catalog());
    site.register(common::cats_class()).unwrap();
    site.register(common::dogs_class()).unwrap();
    assert_eq!(slugs(&site), vec!["dogs", "cats"]);
}

#[test]
fn unknown_configured_dashboard_is_not_registered() {
    let config = common::config().dashboards(["lions"]);
    let site = common::site_with(config, common::catalog());
    assert!(site.get_dashboards().unwrap_err().is_not_registered());
}

#[test]
fn duplicate_configured_dashboard_is_rejected() {
    let config = common::config().dashboards(["cats", "cats"]);
    let mut site = common::site_with(config, common::catalog());
    site.register(common::cats_class()).unwrap();
    assert!(matches!(
        site.get_dashboards(),
        Err(HzError::ImproperlyConfigured(_))
    ));
}

#[test]
fn default_dashboard_resolution() {
    let mut site = common::site();
    assert_eq!(
        site.get_default_dashboard().unwrap_err(),
        HzError::NotRegistered("No dashboard modules have been registered.".to_string())
    );

    site.register(common::dogs_class()).unwrap();
    site.register(common::cats_class()).unwrap();
    assert_eq!(site.get_default_dashboard().unwrap().slug(), "cats");

    site.config_mut().default_dashboard = Some("dogs".to_string());
    assert_eq!(site.get_default_dashboard().unwrap().slug(), "dogs");
}

proptest! {
    #[test]
    fn dashboard_order_ignores_registration_order(
        names in proptest::collection::btree_set("[a-z]{1,8}", 1..8),
        seed in any::<u64>(),
    ) {
        let mut names = names.into_iter().collect::<Vec<_>>();
        let expected = names.clone();
        let len = names.len();
        names.rotate_left((seed as usize) % len);

        let mut site = common::site();
        for name in &names {
            site.register(HzDashboardClass::new(format!("app.{}.dashboard", name), "D", name.as_str()))
                .unwrap();
        }
        prop_assert_eq!(slugs(&site), expected);
    }
}

#[test]
fn autodiscovery_registers_installed_dashboards() {
    let mut site = common::site();
    site.autodiscover().unwrap();
    assert_eq!(slugs(&site), vec!["cats", "dogs"]);
    assert!(site.is_imported("hz_test.dashboards.cats.dashboard"));
    assert!(!site.routes_built());
}

#[test]
fn missing_installed_app_is_module_not_found() {
    let config = common::config().installed_apps([common::CATS_APP, "hz_test.nowhere"]);
    let mut site = common::site_with(config, common::catalog());
    assert_eq!(
        site.autodiscover().unwrap_err(),
        HzError::ModuleNotFound("hz_test.nowhere".to_string())
    );
}

#[test]
fn failing_dashboard_module_is_rolled_back_and_reraised() {
    let catalog = common::catalog().with(
        HzModule::new("hz_test.dashboards.broken.dashboard").on_import(|site| {
            site.register(HzDashboardClass::new(
                "hz_test.dashboards.broken.dashboard",
                "Broken",
                "broken",
            ))?;
            Err(HzError::internal("boom"))
        }),
    );
    let config = common::config().installed_apps([
        common::CATS_APP,
        "hz_test.dashboards.broken",
        common::DOGS_APP,
    ]);
    let mut site = common::site_with(config, catalog);

    assert_eq!(site.autodiscover().unwrap_err(), HzError::internal("boom"));
    assert!(site.registered("broken").is_err());
    assert!(!site.is_imported("hz_test.dashboards.broken.dashboard"));
    assert!(site.registered("cats").is_ok());
}

fn panel_paths(site: &hzx::HzSite, dashboard: &str) -> Vec<String> {
    site.registered(dashboard)
        .unwrap()
        .registry()
        .class_paths()
        .map(str::to_string)
        .collect()
}

#[test]
fn failing_panel_module_is_rolled_back_and_reraised() {
    let templates = tempfile::TempDir::new().unwrap();
    let template_dir = templates.path().to_path_buf();
    let catalog = common::catalog().with(
        HzModule::new("hz_test.dashboards.cats.tigers.panel").on_import(move |site| {
            site.register_panel(
                "cats",
                common::tigers_class().with_template_dir(template_dir.clone()),
            )?;
            site.register_panel(
                "dogs",
                HzPanelClass::new("hz_test.dashboards.dogs.wolves.panel", "Wolves", "wolves"),
            )?;
            Err(HzError::internal("boom"))
        }),
    );
    let mut site = common::site_with(common::config(), catalog);
    site.autodiscover().unwrap();

    let dogs_before = panel_paths(&site, "dogs");
    let dirs_before = site.panel_template_dirs().clone();

    assert_eq!(
        site.autodiscover_dashboard("cats").unwrap_err(),
        HzError::internal("boom")
    );
    assert_eq!(
        panel_paths(&site, "cats"),
        vec!["hz_test.dashboards.cats.kittens.panel.Kittens".to_string()]
    );
    assert_eq!(panel_paths(&site, "dogs"), dogs_before);
    assert_eq!(site.panel_template_dirs(), &dirs_before);
    assert!(!site.is_imported("hz_test.dashboards.cats.tigers.panel"));
    assert!(!site.registered("cats").unwrap().autodiscover_complete());
}

#[test]
fn absent_panel_modules_are_skipped() {
    let catalog = common::catalog().with(HzModule::registering_dashboard(
        "hz_test.dashboards.dogs.dashboard",
        common::dogs_class().with_panels(["puppies", "ghosts"]),
    ));
    let mut site = common::site_with(common::config(), catalog);
    site.autodiscover().unwrap();
    site.autodiscover_dashboard("dogs").unwrap();

    let dogs = site.registered("dogs").unwrap();
    assert!(dogs.get_panel("puppies").is_ok());
    assert_eq!(dogs.registry().len(), 1);
}

#[test]
fn panel_package_without_panel_module_reraises() {
    let catalog = common::catalog()
        .with(HzModule::registering_dashboard(
            "hz_test.dashboards.dogs.dashboard",
            common::dogs_class().with_panel_groups(vec![
                HzPanelGroupSpec::new("pack").with_panels(["puppies", "wolves"]),
            ]),
        ))
        .with(common::urls_module(
            "hz_test.dashboards.dogs.wolves.urls",
            "wolves",
            "wolf_id",
        ));
    let mut site = common::site_with(common::config(), catalog);
    site.autodiscover().unwrap();

    let err = site.autodiscover_dashboard("dogs").unwrap_err();
    assert_eq!(
        err,
        HzError::ModuleNotFound("hz_test.dashboards.dogs.wolves.panel".to_string())
    );
    // The panel registered before the failure survives the rollback.
    assert!(site.registered("dogs").unwrap().get_panel("puppies").is_ok());
}

#[test]
fn import_bodies_run_once() {
    let runs = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&runs);
    let catalog = common::catalog().with(HzModule::new("hz_test.dashboards.cats").on_import(
        move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        },
    ));
    let mut site = common::site_with(common::config(), catalog);
    site.autodiscover().unwrap();
    site.import_module("hz_test.dashboards.cats").unwrap();
    assert_eq!(runs.load(Ordering::SeqCst), 1);

    site.reset();
    assert!(site.registry().is_empty());
    site.autodiscover().unwrap();
    assert_eq!(runs.load(Ordering::SeqCst), 2);
}

#[test]
fn user_home_prefers_the_programmatic_resolver() {
    let mut site = common::site();
    site.config_mut().user_home = Some(json!("/ignored/"));
    site.set_user_home_fn(|user| Ok(format!("/users/{}/", user.username)));
    let home = site.get_user_home(&HzUser::authenticated("ada")).unwrap();
    assert_eq!(home, "/users/ada/");
}

#[test]
fn user_home_url_is_returned_verbatim() {
    let config = common::config().user_home("/project/overview/");
    let mut site = common::site_with(config, common::catalog());
    assert_eq!(site.get_user_home(&HzUser::anonymous()).unwrap(), "/project/overview/");
    assert!(!site.routes_built());
}

#[test]
fn user_home_dotted_path_is_resolved_through_the_catalog() {
    let catalog = common::catalog().with(HzModule::new("hz_test.home").export(
        "landing",
        HzSymbol::user_home(|user| Ok(format!("/landing/{}/", user.username))),
    ));
    let config = common::config().user_home("hz_test.home.landing");
    let mut site = common::site_with(config, catalog);
    assert_eq!(
        site.get_user_home(&HzUser::authenticated("bob")).unwrap(),
        "/landing/bob/"
    );
}

#[test]
fn user_home_defaults_to_the_default_dashboard() {
    let mut site = common::site();
    assert_eq!(site.get_user_home(&HzUser::anonymous()).unwrap(), "/cats/");
    assert!(site.routes_built());
}

#[test]
fn falsy_user_home_falls_back_to_the_default_dashboard() {
    for home in [json!(false), json!(0), json!(""), json!([]), json!({})] {
        let config = common::config().user_home(home.clone());
        let mut site = common::site_with(config, common::catalog());
        assert_eq!(
            site.get_user_home(&HzUser::anonymous()).unwrap(),
            "/cats/",
            "user_home={}",
            home
        );
    }
}

#[test]
fn non_string_user_home_is_a_value_error() {
    let config = common::config().user_home(json!(42));
    let mut site = common::site_with(config, common::catalog());
    assert!(matches!(
        site.get_user_home(&HzUser::anonymous()),
        Err(HzError::Value(_))
    ));
}
