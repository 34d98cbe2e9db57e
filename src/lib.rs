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

//! # Hzx Core Library
//!
//! Component registry and routing-tree builder for dashboards organized as
//! Site → Dashboard → Panel. Plugins are discovered from a module catalog,
//! customized declaratively, and compiled into one route tree with cascading
//! access-control layers.
//!
//! ## Module Overview
//!
//! - **errors**: `HzError` and the crate `Result` alias
//! - **component**: Slug, name, and access predicate shared by every level
//! - **registry**: Class-keyed registries of dashboards and panels
//! - **module**: The module catalog standing in for importable plugin code
//! - **routing**: Route fragments, resolution, reversal, middleware layers
//! - **panel**: Panels and panel groups
//! - **dashboard**: Dashboards and their panel composition
//! - **site**: The application context, autodiscovery, and navigation
//! - **customization**: Declarative panel and panel-group records
//! - **config**: Site settings and enabled-plugin directories
//!
//! ## Feature Flags
//!
//! - `yaml`: YAML site configuration and enabled-plugin files
//! - `full`: Enables all features
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use hzx::{
//!     HzDashboardClass, HzHandler, HzModule, HzModuleCatalog, HzPanelClass, HzRoute,
//!     HzSite, HzSiteConfig,
//! };
//!
//! let catalog = HzModuleCatalog::new()
//!     .with(HzModule::registering_dashboard(
//!         "app.project.dashboard",
//!         HzDashboardClass::new("app.project.dashboard", "Project", "project")
//!             .with_panels(["images"])
//!             .with_default_panel("images"),
//!     ))
//!     .with(HzModule::registering_panel(
//!         "app.project.images.panel",
//!         "project",
//!         HzPanelClass::new("app.project.images.panel", "Images", "images"),
//!     ))
//!     .with(HzModule::new("app.project.images.urls").with_urlpatterns(vec![
//!         HzRoute::new("^$", HzHandler::echo("images.index")).unwrap().named("index").into(),
//!     ]));
//!
//! let config = HzSiteConfig::new().installed_apps(["app.project"]);
//! let mut site = HzSite::new(config, Arc::new(catalog));
//! let url = site.reverse("horizon:project:images:index", &Default::default()).unwrap();
//! assert_eq!(url, "/project/");
//! ```
//!
//! ## Error Handling
//!
//! All fallible operations return `Result<T, HzError>`. Lookup misses are
//! `NotRegistered` and are routinely treated as "feature disabled" by
//! callers.

pub mod component;
pub mod config;
pub mod customization;
pub mod dashboard;
pub mod errors;
pub mod module;
pub mod panel;
pub mod registry;
pub mod routing;
pub mod site;

pub use errors::{HzError, Result};

pub use component::{HzAccessContext, HzAllowedFn, HzComponent, HzPolicyCheck, HzUser};
pub use config::{HzEnabledEntry, HzSiteConfig};
pub use customization::HzCustomizationReport;
pub use dashboard::{HzDashboard, HzDashboardClass, HzPanelSet, HzPanelSpec};
pub use module::{HzModule, HzModuleCatalog, HzModuleInit, HzSymbol, HzUserHomeFn};
pub use panel::{
    HzCanRegisterFn, HzPanel, HzPanelClass, HzPanelGroup, HzPanelGroupSpec, DEFAULT_PANEL_GROUP,
    OTHER_PANEL_GROUP, OTHER_PANEL_GROUP_NAME,
};
pub use registry::{HzClass, HzLookup, HzRegistrable, HzRegistry};
pub use routing::{
    HzHandler, HzInclude, HzLayer, HzRequest, HzResolved, HzResponse, HzRoute, HzRouteEntry,
    HzRouteFragment, HzViewFn,
};
pub use site::{HzNavDashboard, HzNavGroup, HzNavPanel, HzSite};
