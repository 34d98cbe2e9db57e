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

//! # Site Module
//!
//! `HzSite` is the application context: the registry of dashboards, the
//! module catalog plugins are discovered from, and the lazily compiled route
//! tree.
//!
//! ## Lifecycle
//!
//! 1. Construct with a configuration and a module catalog; nothing is
//!    registered yet
//! 2. The first call to [`HzSite::routes`], [`HzSite::reverse`],
//!    [`HzSite::resolve`], or an absolute-URL helper discovers every
//!    dashboard and panel, applies panel customization, and compiles the
//!    route tree
//! 3. The compiled tree is cached until [`HzSite::reset`]
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use hzx::{HzModuleCatalog, HzSite, HzSiteConfig};
//!
//! let config = HzSiteConfig::new().installed_apps(["app"]);
//! let mut site = HzSite::new(config, Arc::new(HzModuleCatalog::new()));
//! assert!(site.get_dashboards().unwrap().is_empty());
//! ```

mod autodiscover;
mod navigation;

pub use navigation::{HzNavDashboard, HzNavGroup, HzNavPanel};

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use serde_json::Value;

use crate::component::{HzAccessContext, HzComponent, HzPolicyCheck, HzUser};
use crate::config::enabled::truthy;
use crate::config::HzSiteConfig;
use crate::dashboard::HzDashboard;
use crate::errors::{HzError, Result};
use crate::module::{HzModuleCatalog, HzSymbol, HzUserHomeFn};
use crate::panel::HzPanel;
use crate::registry::{HzClass, HzLookup, HzRegistrable, HzRegistry};
use crate::routing::{HzResolved, HzRouteFragment};

/// Restorable copy of the mutable site state touched by an import.
#[derive(Clone, Debug)]
pub(crate) struct HzSiteSnapshot {
    registry: HzRegistry<HzDashboard>,
    panel_template_dirs: BTreeMap<String, PathBuf>,
    imported: BTreeSet<String>,
}

pub struct HzSite {
    pub(crate) config: HzSiteConfig,
    pub(crate) modules: Arc<HzModuleCatalog>,
    registry: HzRegistry<HzDashboard>,
    panel_template_dirs: BTreeMap<String, PathBuf>,
    imported: BTreeSet<String>,
    routes: Option<HzRouteFragment>,
    policy_check: Option<HzPolicyCheck>,
    user_home_fn: Option<HzUserHomeFn>,
}

impl fmt::Debug for HzSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HzSite")
            .field("slug", &self.config.slug)
            .field("registry", &self.registry)
            .field("imported", &self.imported)
            .field("routes_built", &self.routes.is_some())
            .finish()
    }
}

impl HzSite {
    pub fn new(config: HzSiteConfig, modules: Arc<HzModuleCatalog>) -> Self {
        HzSite {
            config,
            modules,
            registry: HzRegistry::new(),
            panel_template_dirs: BTreeMap::new(),
            imported: BTreeSet::new(),
            routes: None,
            policy_check: None,
            user_home_fn: None,
        }
    }

    pub fn config(&self) -> &HzSiteConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut HzSiteConfig {
        &mut self.config
    }

    pub fn modules(&self) -> &Arc<HzModuleCatalog> {
        &self.modules
    }

    pub fn namespace(&self) -> &str {
        &self.config.namespace
    }

    /// Install the policy engine used by `allowed` / `can_access`.
    pub fn set_policy_check<F>(&mut self, check: F)
    where
        F: Fn(&[String], &HzUser) -> bool + Send + Sync + 'static,
    {
        self.policy_check = Some(Arc::new(check));
    }

    pub fn policy_check(&self) -> Option<&HzPolicyCheck> {
        self.policy_check.as_ref()
    }

    /// Programmatic user-home resolver; takes precedence over the
    /// `user_home` setting.
    pub fn set_user_home_fn<F>(&mut self, func: F)
    where
        F: Fn(&HzUser) -> Result<String> + Send + Sync + 'static,
    {
        self.user_home_fn = Some(Arc::new(func));
    }

    pub fn access_context<'a>(&'a self, user: &'a HzUser) -> HzAccessContext<'a> {
        HzAccessContext::new(user).with_policy_check(self.policy_check.as_ref())
    }

    /// Clear every registration, imported module, and the route cache.
    pub fn reset(&mut self) {
        self.registry.clear();
        self.panel_template_dirs.clear();
        self.imported.clear();
        self.routes = None;
        log::debug!("site.reset: cleared registry - site={}", self.config.slug);
    }

    pub(crate) fn snapshot(&self) -> HzSiteSnapshot {
        HzSiteSnapshot {
            registry: self.registry.snapshot(),
            panel_template_dirs: self.panel_template_dirs.clone(),
            imported: self.imported.clone(),
        }
    }

    pub(crate) fn restore(&mut self, snapshot: HzSiteSnapshot) {
        self.registry.restore(snapshot.registry);
        self.panel_template_dirs = snapshot.panel_template_dirs;
        self.imported = snapshot.imported;
    }

    // Registration

    pub fn register(&mut self, dashboard: impl Into<HzClass>) -> Result<Arc<HzDashboard>> {
        let dashboard = self.registry.register(dashboard).map(Arc::clone)?;
        log::debug!(
            "site.register.dashboard: registered - dashboard={}",
            dashboard.slug()
        );
        Ok(dashboard)
    }

    pub fn unregister(&mut self, dashboard: impl Into<HzClass>) -> Result<bool> {
        self.registry.unregister(dashboard)
    }

    pub fn registered(&self, dashboard: impl Into<HzLookup>) -> Result<Arc<HzDashboard>> {
        self.registry.registered(dashboard).map(Arc::clone)
    }

    /// Dashboard by slug or class.
    pub fn get_dashboard(&self, dashboard: impl Into<HzLookup>) -> Result<Arc<HzDashboard>> {
        self.registered(dashboard)
    }

    pub fn registered_mut(&mut self, dashboard: impl Into<HzLookup>) -> Result<&mut HzDashboard> {
        self.registry.registered_mut(dashboard)
    }

    pub fn registry(&self) -> &HzRegistry<HzDashboard> {
        &self.registry
    }

    /// Register `panel` with `dashboard`. The panel's template directory is
    /// recorded only if it exists on disk.
    pub fn register_panel(
        &mut self,
        dashboard: impl Into<HzLookup>,
        panel: impl Into<HzClass>,
    ) -> Result<Arc<HzPanel>> {
        let dash = self.registry.registered_mut(dashboard)?;
        let panel = dash.register(panel)?;
        let key = format!("{}/{}", dash.slug(), panel.slug());
        if let Some(dir) = &panel.class.template_dir {
            if dir.is_dir() {
                self.panel_template_dirs.insert(key, dir.clone());
            }
        }
        log::debug!(
            "site.register.panel: registered - dashboard={}, panel={}",
            panel.registered_with,
            panel.slug()
        );
        Ok(panel)
    }

    /// Unregister a panel given by class or slug.
    pub fn unregister_panel(
        &mut self,
        dashboard: impl Into<HzLookup>,
        panel: impl Into<HzLookup>,
    ) -> Result<bool> {
        let dash = self.registry.registered_mut(dashboard)?;
        let panel = dash.get_panel(panel)?;
        let class = HzClass::Panel(Arc::clone(panel.class()));
        let key = format!("{}/{}", dash.slug(), panel.slug());
        let removed = dash.unregister(class)?;
        self.panel_template_dirs.remove(&key);
        Ok(removed)
    }

    /// Template directories keyed by `"<dashboard>/<panel>"`.
    pub fn panel_template_dirs(&self) -> &BTreeMap<String, PathBuf> {
        &self.panel_template_dirs
    }

    // Ordering

    /// Dashboards in configured order (by class path or slug), then the
    /// unlisted ones sorted by slug.
    pub fn get_dashboards(&self) -> Result<Vec<Arc<HzDashboard>>> {
        let mut ordered = Vec::new();
        let mut seen = BTreeSet::new();
        for item in &self.config.dashboards {
            let by_path = self
                .registry
                .values()
                .find(|dashboard| dashboard.class.class_path() == *item);
            let dashboard = match by_path {
                Some(dashboard) => Arc::clone(dashboard),
                None => self.registered(item)?,
            };
            if !seen.insert(dashboard.class.class_path()) {
                return Err(HzError::improperly_configured(format!(
                    "dashboard \"{}\" is listed more than once",
                    item
                )));
            }
            ordered.push(dashboard);
        }
        let mut extra = self
            .registry
            .values()
            .filter(|dashboard| !seen.contains(&dashboard.class.class_path()))
            .cloned()
            .collect::<Vec<_>>();
        extra.sort_by(|a, b| a.slug().cmp(b.slug()));
        ordered.extend(extra);
        Ok(ordered)
    }

    pub fn get_default_dashboard(&self) -> Result<Arc<HzDashboard>> {
        if let Some(default) = &self.config.default_dashboard {
            return self.registered(default);
        }
        self.get_dashboards()?.into_iter().next().ok_or_else(|| {
            HzError::not_registered("No dashboard modules have been registered.")
        })
    }

    // Routes

    /// The compiled route tree, built on first use.
    pub fn routes(&mut self) -> Result<&HzRouteFragment> {
        if self.routes.is_none() {
            let routes = self.build_routes()?;
            log::info!(
                "site.routes.built: compiled route tree - site={}, dashboards={}",
                self.config.slug,
                self.registry.len()
            );
            self.routes = Some(routes);
        }
        self.routes
            .as_ref()
            .ok_or_else(|| HzError::internal("route tree missing after build"))
    }

    pub fn routes_built(&self) -> bool {
        self.routes.is_some()
    }

    /// Reverse a fully namespaced route name, e.g.
    /// `horizon:project:instances:index`, into a path under `url_prefix`.
    pub fn reverse(&mut self, name: &str, kwargs: &BTreeMap<String, String>) -> Result<String> {
        self.routes()?;
        self.reverse_built(name, kwargs)
    }

    fn reverse_built(&self, name: &str, kwargs: &BTreeMap<String, String>) -> Result<String> {
        let routes = self
            .routes
            .as_ref()
            .ok_or_else(|| HzError::NoReverseMatch(name.to_string()))?;
        let relative = name
            .strip_prefix(self.config.namespace.as_str())
            .and_then(|rest| rest.strip_prefix(':'))
            .ok_or_else(|| HzError::NoReverseMatch(name.to_string()))?;
        let path = routes
            .reverse(relative, kwargs)
            .map_err(|_| HzError::NoReverseMatch(name.to_string()))?;
        Ok(format!("{}{}", self.config.url_prefix, path))
    }

    /// Resolve a request path to its handler.
    pub fn resolve(&mut self, path: &str) -> Result<Option<HzResolved>> {
        let prefix = self.config.url_prefix.clone();
        let namespace = self.config.namespace.clone();
        let routes = self.routes()?;
        let relative = match path.strip_prefix(prefix.as_str()) {
            Some(rest) => rest,
            None => return Ok(None),
        };
        Ok(routes.resolve(relative).map(|mut resolved| {
            resolved.namespaces.insert(0, namespace);
            resolved
        }))
    }

    /// Fragment of a single dashboard, discovering its panels first.
    pub fn dashboard_route_fragment(
        &mut self,
        dashboard: impl Into<HzLookup>,
    ) -> Result<HzRouteFragment> {
        let slug = self.registered(dashboard)?.slug().to_string();
        self.autodiscover_dashboard(&slug)?;
        self.registered(slug.as_str())?.route_fragment(&self.modules)
    }

    // Absolute URLs

    /// URL of a panel's index view.
    pub fn panel_absolute_url(
        &mut self,
        dashboard: impl Into<HzLookup>,
        panel: impl Into<HzLookup>,
    ) -> Result<String> {
        self.routes()?;
        let dashboard = self.registered(dashboard)?;
        let name = {
            let panel = dashboard.get_panel(panel)?;
            format!("{}:{}", self.config.namespace, panel.index_route_name())
        };
        self.reverse(&name, &BTreeMap::new()).map_err(|err| {
            log::info!(
                "routing.reverse.failed: error reversing absolute URL - name={}, error={}",
                name,
                err
            );
            err
        })
    }

    /// URL of a dashboard: its default panel's URL.
    pub fn dashboard_absolute_url(&mut self, dashboard: impl Into<HzLookup>) -> Result<String> {
        self.routes()?;
        let dashboard = self.registered(dashboard)?;
        let default = dashboard.default_panel.clone().ok_or_else(|| {
            HzError::not_registered(format!(
                "The default panel for dashboard \"{}\" is not set.",
                dashboard.slug()
            ))
        })?;
        self.panel_absolute_url(dashboard.slug(), default)
    }

    /// URL of the default dashboard.
    pub fn get_absolute_url(&mut self) -> Result<String> {
        self.routes()?;
        let dashboard = self.get_default_dashboard()?;
        self.dashboard_absolute_url(dashboard.slug())
    }

    /// Landing URL for `user`.
    pub fn get_user_home(&mut self, user: &HzUser) -> Result<String> {
        if let Some(func) = &self.user_home_fn {
            return func(user);
        }
        match self.config.user_home.clone() {
            home if !truthy(home.as_ref()) => self.get_absolute_url(),
            Some(Value::String(home)) if home.contains('/') => Ok(home),
            Some(Value::String(home)) => match self.modules.resolve_symbol(&home)? {
                HzSymbol::UserHome(func) => func(user),
                _ => Err(HzError::type_error(format!("{} is not callable", home))),
            },
            _ => Err(HzError::value(
                "The user_home setting must be either a string or a callable object (e.g. a function).",
            )),
        }
    }
}

impl HzComponent for HzSite {
    fn slug(&self) -> &str {
        &self.config.slug
    }

    fn name(&self) -> &str {
        &self.config.name
    }

    fn policy_rules(&self) -> &[String] {
        &[]
    }
}
