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

//! Module import, autodiscovery, and route-tree compilation.
//!
//! Discovery imports candidate modules transactionally: the site is
//! snapshotted before each import and restored if the import fails. The
//! failure is swallowed when the probed module does not exist at all, and
//! re-raised when it exists but failed.

use std::sync::Arc;

use crate::component::HzComponent;
use crate::errors::{HzError, Result};
use crate::module::ancestors_of;
use crate::routing::{HzInclude, HzRouteFragment};
use crate::site::HzSite;

const DISCOVERY_SUBMODULES: [&str; 2] = ["dashboard", "panel"];

impl HzSite {
    pub fn is_imported(&self, path: &str) -> bool {
        self.imported.contains(path)
    }

    /// Import `path` and any declared ancestor packages, running each import
    /// body once per site lifetime.
    pub fn import_module(&mut self, path: &str) -> Result<()> {
        if self.imported.contains(path) {
            return Ok(());
        }
        let module = match self.modules.get(path) {
            Some(module) => Arc::clone(module),
            None if self.modules.has_module(path) => {
                self.imported.insert(path.to_string());
                return Ok(());
            }
            None => return Err(HzError::ModuleNotFound(path.to_string())),
        };
        for ancestor in ancestors_of(path) {
            if self.modules.get(&ancestor).is_some() {
                self.import_module(&ancestor)?;
            }
        }

        // Marked before running so a body that imports its own module
        // again terminates.
        self.imported.insert(path.to_string());
        log::debug!("site.import.run: importing module - module={}", path);
        if let Err(err) = module.run(self) {
            self.imported.remove(path);
            return Err(err);
        }
        Ok(())
    }

    /// Import `target`, restoring the site on failure. The failure is
    /// re-raised only if `probe` names a module of the catalog.
    pub fn import_transactional(&mut self, target: &str, probe: &str) -> Result<()> {
        let snapshot = self.snapshot();
        match self.import_module(target) {
            Ok(()) => Ok(()),
            Err(err) => {
                self.restore(snapshot);
                if self.modules.has_module(probe) {
                    log::error!(
                        "site.autodiscover.failed: import failed - module={}, error={}",
                        target,
                        err
                    );
                    Err(err)
                } else {
                    log::debug!(
                        "site.autodiscover.rollback: module absent - module={}, error={}",
                        target,
                        err
                    );
                    Ok(())
                }
            }
        }
    }

    /// Import every installed app's `dashboard` module, then every app's
    /// `panel` module.
    pub fn autodiscover(&mut self) -> Result<()> {
        let apps = self.config.installed_apps.clone();
        for submodule in DISCOVERY_SUBMODULES {
            for app in &apps {
                if !self.modules.has_module(app) {
                    return Err(HzError::ModuleNotFound(app.clone()));
                }
                if self.modules.get(app).is_some() {
                    self.import_module(app)?;
                }
                let target = format!("{}.{}", app, submodule);
                self.import_transactional(&target, &target)?;
            }
        }
        log::debug!(
            "site.autodiscover.done: discovered dashboards - count={}",
            self.registry.len()
        );
        Ok(())
    }

    /// Discover the panels of one dashboard, once. Each panel name `p`
    /// declared by the dashboard imports `<package>.p.panel`.
    pub fn autodiscover_dashboard(&mut self, dashboard: &str) -> Result<()> {
        let dash = self.registry.registered_mut(dashboard)?;
        if dash.autodiscover_complete {
            return Ok(());
        }
        let slug = dash.slug().to_string();
        let package = dash.class.package().to_string();
        let names = dash.materialize_panel_groups();

        for name in names {
            let probe = format!("{}.{}", package, name);
            let target = format!("{}.panel", probe);
            self.import_transactional(&target, &probe)?;
        }

        self.registry.registered_mut(slug.as_str())?.autodiscover_complete = true;
        log::debug!(
            "site.autodiscover.dashboard: discovered panels - dashboard={}",
            slug
        );
        Ok(())
    }

    /// Forget that `dashboard` was discovered and discover it again.
    pub fn rediscover_dashboard(&mut self, dashboard: &str) -> Result<()> {
        self.registry.registered_mut(dashboard)?.autodiscover_complete = false;
        self.autodiscover_dashboard(dashboard)
    }

    pub(crate) fn build_routes(&mut self) -> Result<HzRouteFragment> {
        let mut entries = match self.config.urls.clone() {
            Some(urls) => self.modules.component_urlpatterns("", Some(&urls))?,
            None => Vec::new(),
        };

        self.autodiscover()?;
        let slugs = self
            .registry
            .values()
            .map(|dashboard| dashboard.slug().to_string())
            .collect::<Vec<_>>();
        for slug in &slugs {
            self.autodiscover_dashboard(slug)?;
        }

        self.load_panel_customization();

        if let Some(module) = self.config.customization_module.clone() {
            let (package, _) = module.rsplit_once('.').ok_or_else(|| {
                HzError::improperly_configured(format!(
                    "customization_module must be a dotted path, got {}",
                    module
                ))
            })?;
            if !self.modules.has_module(package) {
                return Err(HzError::ModuleNotFound(package.to_string()));
            }
            self.import_transactional(&module, &module)?;
        }

        // Dashboards registered by customization have not been discovered yet.
        let slugs = self
            .registry
            .values()
            .map(|dashboard| dashboard.slug().to_string())
            .collect::<Vec<_>>();
        for slug in &slugs {
            let fragment = self.dashboard_route_fragment(slug.as_str())?;
            let pattern = format!("^{}/", regex::escape(slug));
            entries.push(HzInclude::new(&pattern, fragment)?.into());
        }
        Ok(HzRouteFragment::new(
            entries,
            &self.config.namespace,
            &self.config.slug,
        ))
    }
}
