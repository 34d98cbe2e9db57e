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
use std::thread;

use hzx::{
    HzDashboardClass, HzError, HzHandler, HzModule, HzPanelClass, HzRequest, HzRoute, HzUser,
};

#[test]
fn routes_are_built_lazily_and_cached() {
    let mut site = common::site();
    assert!(!site.routes_built());
    assert!(site.registry().is_empty());

    let url = site
        .reverse("horizon:cats:kittens:index", &common::no_kwargs())
        .unwrap();
    assert_eq!(url, "/cats/");
    assert!(site.routes_built());

    // Later registrations do not touch the cached tree.
    site.register(HzDashboardClass::new("app.birds.dashboard", "Birds", "birds"))
        .unwrap();
    let names = site.routes().unwrap().route_names();
    assert!(!names.iter().any(|name| name.starts_with("birds:")));

    site.reset();
    assert!(!site.routes_built());
}

#[test]
fn reverse_follows_namespaces_and_kwargs() {
    let mut site = common::site();
    assert_eq!(
        site.reverse("horizon:cats:tigers:index", &common::no_kwargs()).unwrap(),
        "/cats/tigers/"
    );
    assert_eq!(
        site.reverse(
            "horizon:cats:kittens:detail",
            &common::kwargs(&[("kitten_id", "tom")])
        )
        .unwrap(),
        "/cats/tom/"
    );
    assert_eq!(
        site.reverse(
            "horizon:dogs:puppies:detail",
            &common::kwargs(&[("puppy_id", "rex")])
        )
        .unwrap(),
        "/dogs/rex/"
    );
}

#[test]
fn unknown_names_do_not_reverse() {
    let mut site = common::site();
    for name in [
        "cats:kittens:index",
        "horizon:cats:lions:index",
        "horizon:cats:kittens:detail",
        "other:cats:kittens:index",
    ] {
        assert_eq!(
            site.reverse(name, &common::no_kwargs()).unwrap_err(),
            HzError::NoReverseMatch(name.to_string())
        );
    }
}

#[test]
fn route_names_cover_every_panel() {
    let mut site = common::site();
    let names = site.routes().unwrap().route_names();
    assert_eq!(
        names,
        vec![
            "cats:tigers:index",
            "cats:tigers:detail",
            "cats:kittens:index",
            "cats:kittens:detail",
            "dogs:puppies:index",
            "dogs:puppies:detail",
        ]
    );
}

#[test]
fn resolve_round_trips_with_reverse() {
    let mut site = common::site();
    let kwargs = common::kwargs(&[("tiger_id", "shere-khan")]);
    let path = site.reverse("horizon:cats:tigers:detail", &kwargs).unwrap();
    assert_eq!(path, "/cats/tigers/shere-khan/");

    let resolved = site.resolve(&path).unwrap().unwrap();
    assert_eq!(resolved.view_name().as_deref(), Some("horizon:cats:tigers:detail"));
    assert_eq!(resolved.kwargs, kwargs);
    assert!(site.resolve("/lions/").unwrap().is_none());
}

#[test]
fn dispatch_enforces_login_then_union_of_permissions() {
    let mut site = common::site();
    let resolved = site.resolve("/cats/tigers/7/").unwrap().unwrap();

    let anonymous = HzRequest::new("/cats/tigers/7/", HzUser::anonymous());
    assert_eq!(resolved.call(&anonymous).unwrap_err(), HzError::NotAuthenticated);

    let member = HzUser::authenticated("m").with_permissions(["horizon.test"]);
    assert_eq!(
        resolved
            .call(&HzRequest::new("/cats/tigers/7/", member))
            .unwrap_err(),
        HzError::NotAuthorized {
            missing: vec!["horizon.tigers".to_string()]
        }
    );

    let response = resolved
        .call(&HzRequest::new("/cats/tigers/7/", common::admin()))
        .unwrap();
    assert_eq!(response.view, "tigers.detail");
    assert_eq!(response.current_dashboard.as_deref(), Some("cats"));
    assert_eq!(response.current_panel.as_deref(), Some("tigers"));
    assert_eq!(response.kwargs.get("tiger_id").map(String::as_str), Some("7"));
}

#[test]
fn authenticated_user_without_dashboard_permission_is_refused() {
    let mut site = common::site();
    let resolved = site.resolve("/cats/").unwrap().unwrap();
    let err = resolved
        .call(&HzRequest::new("/cats/", HzUser::authenticated("nobody")))
        .unwrap_err();
    assert_eq!(
        err,
        HzError::NotAuthorized {
            missing: vec!["horizon.test".to_string()]
        }
    );
}

#[test]
fn url_prefix_is_applied_both_ways() {
    let config = common::config().url_prefix("/dashboard/");
    let mut site = common::site_with(config, common::catalog());
    assert_eq!(
        site.reverse("horizon:dogs:puppies:index", &common::no_kwargs()).unwrap(),
        "/dashboard/dogs/"
    );
    assert!(site.resolve("/dashboard/dogs/").unwrap().is_some());
    assert!(site.resolve("/dogs/").unwrap().is_none());
}

#[test]
fn site_urls_are_mounted_before_dashboards() {
    let catalog = common::catalog().with(HzModule::new("hz_test.site_urls").with_urlpatterns(
        vec![HzRoute::new("^$", HzHandler::echo("splash"))
            .unwrap()
            .named("splash")
            .into()],
    ));
    let config = common::config().urls("hz_test.site_urls");
    let mut site = common::site_with(config, catalog);
    assert_eq!(site.reverse("horizon:splash", &common::no_kwargs()).unwrap(), "/");
    let resolved = site.resolve("/").unwrap().unwrap();
    assert_eq!(resolved.view_name().as_deref(), Some("horizon:splash"));
    assert!(resolved.handler.layers().is_empty());
}

#[test]
fn absolute_urls() {
    let mut site = common::site();
    assert_eq!(site.panel_absolute_url("cats", "tigers").unwrap(), "/cats/tigers/");
    assert_eq!(site.dashboard_absolute_url("dogs").unwrap(), "/dogs/");
    assert_eq!(site.get_absolute_url().unwrap(), "/cats/");
}

#[test]
fn absolute_url_of_unroutable_panel_is_no_reverse_match() {
    let catalog = common::catalog().with(HzModule::registering_panel(
        "hz_test.dashboards.dogs.puppies.panel",
        "dogs",
        common::puppies_class().with_index_url_name("overview"),
    ));
    let mut site = common::site_with(common::config(), catalog);
    assert!(matches!(
        site.panel_absolute_url("dogs", "puppies"),
        Err(HzError::NoReverseMatch(_))
    ));
}

#[test]
fn compiled_tree_is_shareable_across_threads() {
    let mut site = common::site();
    let routes = Arc::new(site.routes().unwrap().clone());
    let worker = {
        let routes = Arc::clone(&routes);
        thread::spawn(move || {
            let resolved = routes.resolve("dogs/rex/").unwrap();
            resolved
                .call(&HzRequest::new("/dogs/rex/", common::admin()))
                .map(|response| response.view)
        })
    };
    assert_eq!(worker.join().unwrap().unwrap(), "puppies.detail");
}

#[test]
fn navigation_lists_visible_accessible_components() {
    let catalog = common::catalog()
        .with(HzModule::registering_panel(
            "hz_test.dashboards.cats.tigers.panel",
            "cats",
            common::tigers_class().with_nav(false),
        ))
        .with(HzModule::registering_dashboard(
            "hz_test.dashboards.birds.dashboard",
            HzDashboardClass::new("hz_test.dashboards.birds.dashboard", "Birds", "birds")
                .with_panels(["owls"])
                .with_default_panel("owls")
                .with_nav(false),
        ))
        .with(HzModule::registering_panel(
            "hz_test.dashboards.birds.owls.panel",
            "birds",
            HzPanelClass::new("hz_test.dashboards.birds.owls.panel", "Owls", "owls"),
        ));
    let config = common::config().installed_apps([
        common::CATS_APP,
        common::DOGS_APP,
        "hz_test.dashboards.birds",
    ]);
    let mut site = common::site_with(config, catalog);

    let tree = site.navigation(&common::admin()).unwrap();
    let dashboards = tree.iter().map(|d| d.slug.as_str()).collect::<Vec<_>>();
    assert_eq!(dashboards, vec!["cats", "dogs"]);

    let cats = &tree[0];
    assert_eq!(cats.url.as_deref(), Some("/cats/"));
    assert_eq!(cats.groups.len(), 1);
    assert_eq!(cats.groups[0].name, "Kittens");
    assert_eq!(cats.groups[0].panels[0].url.as_deref(), Some("/cats/"));

    let dogs = &tree[1];
    assert_eq!(dogs.groups[0].slug, "default");
    assert_eq!(dogs.groups[0].name, "Dogs");
    assert_eq!(dogs.groups[0].panels[0].slug, "puppies");
}

#[test]
fn navigation_respects_policy_rules() {
    let catalog = common::catalog().with(HzModule::registering_panel(
        "hz_test.dashboards.dogs.puppies.panel",
        "dogs",
        common::puppies_class().with_policy_rules(["dogs:walk"]),
    ));
    let mut site = common::site_with(common::config(), catalog);
    site.set_policy_check(|rules, user| rules.iter().all(|r| user.permissions.contains(r)));

    let tree = site.navigation(&common::admin()).unwrap();
    assert!(tree.iter().all(|d| d.slug != "dogs"));

    let walker = common::admin().with_permissions(["dogs:walk"]);
    let tree = site.navigation(&walker).unwrap();
    assert!(tree.iter().any(|d| d.slug == "dogs"));
}
