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

//! # Module Catalog
//!
//! The table of importable plugin modules. Each entry is addressed by a
//! dotted path and may carry:
//!
//! - an import body, run once per site lifetime when the module is imported
//!   (typically a `register` / `register_panel` call),
//! - exported symbols (dashboard classes, panel classes, user-home functions),
//! - `urlpatterns` consumed by the route builder.
//!
//! Packages need not be declared: a path is a known module if it is declared
//! or if any declared module lives beneath it.
//!
//! ## Example
//!
//! ```rust
//! use hzx::{HzModule, HzModuleCatalog, HzPanelClass};
//!
//! let images = HzPanelClass::new("app.images.panel", "Images", "images");
//! let catalog = HzModuleCatalog::new()
//!     .with(HzModule::registering_panel("app.images.panel", "project", images));
//! assert!(catalog.has_module("app.images"));
//! ```

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;

use crate::component::HzUser;
use crate::dashboard::HzDashboardClass;
use crate::errors::{HzError, Result};
use crate::panel::HzPanelClass;
use crate::registry::HzClass;
use crate::routing::HzRouteEntry;
use crate::site::HzSite;

/// Import body of a catalog module.
pub type HzModuleInit = Arc<dyn Fn(&mut HzSite) -> Result<()> + Send + Sync>;

/// Programmatic user-home resolver.
pub type HzUserHomeFn = Arc<dyn Fn(&HzUser) -> Result<String> + Send + Sync>;

/// A named export of a catalog module.
#[derive(Clone)]
pub enum HzSymbol {
    Dashboard(Arc<HzDashboardClass>),
    Panel(Arc<HzPanelClass>),
    UserHome(HzUserHomeFn),
}

impl HzSymbol {
    pub fn user_home<F>(func: F) -> Self
    where
        F: Fn(&HzUser) -> Result<String> + Send + Sync + 'static,
    {
        HzSymbol::UserHome(Arc::new(func))
    }
}

impl fmt::Debug for HzSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HzSymbol::Dashboard(class) => write!(f, "Dashboard({})", class.class_path()),
            HzSymbol::Panel(class) => write!(f, "Panel({})", class.class_path()),
            HzSymbol::UserHome(_) => write!(f, "UserHome(<fn>)"),
        }
    }
}

impl From<HzDashboardClass> for HzSymbol {
    fn from(class: HzDashboardClass) -> Self {
        HzSymbol::Dashboard(Arc::new(class))
    }
}

impl From<Arc<HzDashboardClass>> for HzSymbol {
    fn from(class: Arc<HzDashboardClass>) -> Self {
        HzSymbol::Dashboard(class)
    }
}

impl From<HzPanelClass> for HzSymbol {
    fn from(class: HzPanelClass) -> Self {
        HzSymbol::Panel(Arc::new(class))
    }
}

impl From<Arc<HzPanelClass>> for HzSymbol {
    fn from(class: Arc<HzPanelClass>) -> Self {
        HzSymbol::Panel(class)
    }
}

#[derive(Clone)]
pub struct HzModule {
    path: String,
    init: Option<HzModuleInit>,
    symbols: IndexMap<String, HzSymbol>,
    urlpatterns: Option<Vec<HzRouteEntry>>,
}

impl HzModule {
    pub fn new(path: impl Into<String>) -> Self {
        HzModule {
            path: path.into(),
            init: None,
            symbols: IndexMap::new(),
            urlpatterns: None,
        }
    }

    /// Module whose import registers `class` with the site and exports it.
    pub fn registering_dashboard(path: impl Into<String>, class: HzDashboardClass) -> Self {
        let class = Arc::new(class);
        let registered = Arc::clone(&class);
        HzModule::new(path)
            .export(class.class_name.clone(), Arc::clone(&class))
            .on_import(move |site| site.register(Arc::clone(&registered)).map(|_| ()))
    }

    /// Module whose import registers `class` with the `dashboard` dashboard
    /// and exports it.
    pub fn registering_panel(
        path: impl Into<String>,
        dashboard: impl Into<String>,
        class: HzPanelClass,
    ) -> Self {
        let class = Arc::new(class);
        let registered = Arc::clone(&class);
        let dashboard = dashboard.into();
        HzModule::new(path)
            .export(class.class_name.clone(), Arc::clone(&class))
            .on_import(move |site| {
                site.register_panel(dashboard.as_str(), Arc::clone(&registered))
                    .map(|_| ())
            })
    }

    pub fn on_import<F>(mut self, init: F) -> Self
    where
        F: Fn(&mut HzSite) -> Result<()> + Send + Sync + 'static,
    {
        self.init = Some(Arc::new(init));
        self
    }

    pub fn export(mut self, name: impl Into<String>, symbol: impl Into<HzSymbol>) -> Self {
        self.symbols.insert(name.into(), symbol.into());
        self
    }

    pub fn with_urlpatterns(mut self, entries: Vec<HzRouteEntry>) -> Self {
        self.urlpatterns = Some(entries);
        self
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn symbol(&self, name: &str) -> Option<&HzSymbol> {
        self.symbols.get(name)
    }

    pub fn symbols(&self) -> impl Iterator<Item = (&str, &HzSymbol)> {
        self.symbols.iter().map(|(name, symbol)| (name.as_str(), symbol))
    }

    pub fn urlpatterns(&self) -> Option<&[HzRouteEntry]> {
        self.urlpatterns.as_deref()
    }

    pub(crate) fn run(&self, site: &mut HzSite) -> Result<()> {
        match &self.init {
            Some(init) => init(site),
            None => Ok(()),
        }
    }
}

impl fmt::Debug for HzModule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HzModule")
            .field("path", &self.path)
            .field("init", &self.init.is_some())
            .field("symbols", &self.symbols)
            .field("urlpatterns", &self.urlpatterns.as_ref().map(Vec::len))
            .finish()
    }
}

#[derive(Clone, Debug, Default)]
pub struct HzModuleCatalog {
    modules: IndexMap<String, Arc<HzModule>>,
}

impl HzModuleCatalog {
    pub fn new() -> Self {
        HzModuleCatalog::default()
    }

    pub fn with(mut self, module: HzModule) -> Self {
        self.add(module);
        self
    }

    /// Add or replace a module.
    pub fn add(&mut self, module: HzModule) -> &mut Self {
        self.modules
            .insert(module.path.clone(), Arc::new(module));
        self
    }

    pub fn get(&self, path: &str) -> Option<&Arc<HzModule>> {
        self.modules.get(path)
    }

    /// True if `path` is a declared module or a package containing one.
    pub fn has_module(&self, path: &str) -> bool {
        if self.modules.contains_key(path) {
            return true;
        }
        let prefix = format!("{}.", path);
        self.modules.keys().any(|key| key.starts_with(&prefix))
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.modules.keys().map(String::as_str)
    }

    /// Resolve `"package.module.Name"` to the symbol `Name` exported by
    /// `package.module`.
    pub fn resolve_symbol(&self, dotted: &str) -> Result<&HzSymbol> {
        let (module_path, name) = dotted.rsplit_once('.').ok_or_else(|| {
            HzError::value(format!("{} doesn't look like a module path", dotted))
        })?;
        let module = self
            .get(module_path)
            .ok_or_else(|| HzError::ModuleNotFound(module_path.to_string()))?;
        module.symbol(name).ok_or_else(|| {
            HzError::import(
                module_path,
                format!("cannot import name '{}'", name),
            )
        })
    }

    /// Resolve a dotted path that must name a dashboard or panel class.
    pub fn import_class(&self, dotted: &str) -> Result<HzClass> {
        match self.resolve_symbol(dotted)? {
            HzSymbol::Dashboard(class) => Ok(HzClass::Dashboard(Arc::clone(class))),
            HzSymbol::Panel(class) => Ok(HzClass::Panel(Arc::clone(class))),
            HzSymbol::UserHome(_) => Err(HzError::type_error(format!(
                "{} is not a class",
                dotted
            ))),
        }
    }

    /// Url patterns of a component living in `package`.
    ///
    /// An explicit `urls` module is tried relative to `package` first, then
    /// as an absolute path; it must exist and define `urlpatterns`. Without
    /// one, a sibling `<package>.urls` is used when declared, otherwise no
    /// patterns.
    pub fn component_urlpatterns(
        &self,
        package: &str,
        urls: Option<&str>,
    ) -> Result<Vec<HzRouteEntry>> {
        match urls {
            Some(urls) => {
                let relative = format!("{}.{}", package, urls);
                let module = self
                    .get(&relative)
                    .or_else(|| self.get(urls))
                    .ok_or_else(|| HzError::ModuleNotFound(urls.to_string()))?;
                module.urlpatterns().map(<[_]>::to_vec).ok_or_else(|| {
                    HzError::import(module.path(), "module has no attribute 'urlpatterns'")
                })
            }
            None => Ok(self
                .get(&format!("{}.urls", package))
                .and_then(|module| module.urlpatterns())
                .map(<[_]>::to_vec)
                .unwrap_or_default()),
        }
    }
}

/// Parent package of a dotted module path (`""` for a top-level module).
pub(crate) fn package_of(module: &str) -> &str {
    module.rsplit_once('.').map(|(package, _)| package).unwrap_or("")
}

/// Every proper ancestor of `path`, outermost first.
pub(crate) fn ancestors_of(path: &str) -> Vec<String> {
    let parts = path.split('.').collect::<Vec<_>>();
    (1..parts.len()).map(|n| parts[..n].join(".")).collect()
}
