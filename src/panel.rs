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

//! # Panel Module
//!
//! Panels are the leaves of the hierarchy: each owns a route fragment and an
//! access predicate. Panel groups order and label the panels of a dashboard.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::component::{HzAccessContext, HzAllowedFn, HzComponent};
use crate::config::HzSiteConfig;
use crate::dashboard::HzDashboard;
use crate::errors::Result;
use crate::module::{package_of, HzModuleCatalog};
use crate::registry::{HzClass, HzRegistrable};
use crate::routing::{HzLayer, HzRouteFragment};

/// Slug of the group that collects panels of a flat panel list.
pub const DEFAULT_PANEL_GROUP: &str = "default";

/// Slug and name of the implicit group holding panels outside every group.
pub const OTHER_PANEL_GROUP: &str = "other";
pub const OTHER_PANEL_GROUP_NAME: &str = "Other";

/// Load-time predicate deciding whether a customization may add the panel.
pub type HzCanRegisterFn = Arc<dyn Fn(&HzSiteConfig) -> bool + Send + Sync>;

/// Static description of a panel.
#[derive(Clone)]
pub struct HzPanelClass {
    pub module: String,
    pub class_name: String,
    pub slug: String,
    pub name: String,
    pub urls: Option<String>,
    pub nav: bool,
    pub index_url_name: String,
    pub permissions: Vec<String>,
    pub policy_rules: Vec<String>,
    pub template_dir: Option<PathBuf>,
    pub can_register: Option<HzCanRegisterFn>,
    pub allowed: Option<HzAllowedFn>,
}

impl HzPanelClass {
    pub fn new(
        module: impl Into<String>,
        class_name: impl Into<String>,
        slug: impl Into<String>,
    ) -> Self {
        let slug = slug.into();
        HzPanelClass {
            module: module.into(),
            class_name: class_name.into(),
            name: slug.clone(),
            slug,
            urls: None,
            nav: true,
            index_url_name: "index".to_string(),
            permissions: Vec::new(),
            policy_rules: Vec::new(),
            template_dir: None,
            can_register: None,
            allowed: None,
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_urls(mut self, urls: impl Into<String>) -> Self {
        self.urls = Some(urls.into());
        self
    }

    pub fn with_nav(mut self, nav: bool) -> Self {
        self.nav = nav;
        self
    }

    pub fn with_index_url_name(mut self, name: impl Into<String>) -> Self {
        self.index_url_name = name.into();
        self
    }

    pub fn with_permissions<I, S>(mut self, permissions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.permissions = permissions.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_policy_rules<I, S>(mut self, rules: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.policy_rules = rules.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_template_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.template_dir = Some(dir.into());
        self
    }

    pub fn with_can_register<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&HzSiteConfig) -> bool + Send + Sync + 'static,
    {
        self.can_register = Some(Arc::new(predicate));
        self
    }

    pub fn with_allowed<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&HzAccessContext) -> bool + Send + Sync + 'static,
    {
        self.allowed = Some(Arc::new(predicate));
        self
    }

    pub fn class_path(&self) -> String {
        format!("{}.{}", self.module, self.class_name)
    }

    pub fn package(&self) -> &str {
        package_of(&self.module)
    }

    /// Whether the panel may be added under `config`. Panels without a
    /// predicate always may.
    pub fn can_register(&self, config: &HzSiteConfig) -> bool {
        self.can_register
            .as_ref()
            .map_or(true, |predicate| predicate(config))
    }
}

impl fmt::Debug for HzPanelClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HzPanelClass")
            .field("class_path", &self.class_path())
            .field("slug", &self.slug)
            .field("urls", &self.urls)
            .field("nav", &self.nav)
            .field("permissions", &self.permissions)
            .field("policy_rules", &self.policy_rules)
            .field("template_dir", &self.template_dir)
            .finish()
    }
}

/// The registered instance of a panel class.
#[derive(Clone, Debug)]
pub struct HzPanel {
    pub class: Arc<HzPanelClass>,
    /// Slug of the dashboard this panel is registered with.
    pub registered_with: String,
}

impl HzPanel {
    pub fn nav(&self) -> bool {
        self.class.nav
    }

    pub fn permissions(&self) -> &[String] {
        &self.class.permissions
    }

    /// Route name of this panel's index view, relative to the site.
    pub fn index_route_name(&self) -> String {
        format!(
            "{}:{}:{}",
            self.registered_with, self.class.slug, self.class.index_url_name
        )
    }

    /// The panel's url patterns wrapped with its permission and current-panel
    /// layers, as `(entries, slug, slug)`.
    pub fn route_fragment(&self, catalog: &HzModuleCatalog) -> Result<HzRouteFragment> {
        let entries =
            catalog.component_urlpatterns(self.class.package(), self.class.urls.as_deref())?;
        let mut fragment = HzRouteFragment::new(entries, &self.class.slug, &self.class.slug);
        fragment.require_perms(self.class.permissions.iter().cloned());
        fragment.decorate(&HzLayer::CurrentPanel(self.class.slug.clone()));
        Ok(fragment)
    }
}

impl HzComponent for HzPanel {
    fn slug(&self) -> &str {
        &self.class.slug
    }

    fn name(&self) -> &str {
        &self.class.name
    }

    fn policy_rules(&self) -> &[String] {
        &self.class.policy_rules
    }

    fn allowed(&self, ctx: &HzAccessContext) -> bool {
        match &self.class.allowed {
            Some(predicate) => predicate(ctx),
            None => self.policy_allows(ctx),
        }
    }
}

impl HzRegistrable for HzPanel {
    type Class = HzPanelClass;

    const KIND: &'static str = "Panel";

    fn downcast(class: &HzClass) -> Option<&Arc<HzPanelClass>> {
        match class {
            HzClass::Panel(class) => Some(class),
            _ => None,
        }
    }

    fn class_path_of(class: &HzPanelClass) -> String {
        class.class_path()
    }

    fn slug_of(class: &HzPanelClass) -> &str {
        &class.slug
    }

    fn instantiate(class: Arc<HzPanelClass>, registered_with: &str) -> Self {
        HzPanel {
            class,
            registered_with: registered_with.to_string(),
        }
    }

    fn class(&self) -> &Arc<HzPanelClass> {
        &self.class
    }
}

/// Declarative panel group, as written in a dashboard class or a
/// customization record.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HzPanelGroupSpec {
    pub slug: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub panels: Vec<String>,
}

impl HzPanelGroupSpec {
    pub fn new(slug: impl Into<String>) -> Self {
        HzPanelGroupSpec {
            slug: slug.into(),
            ..HzPanelGroupSpec::default()
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_panels<I, S>(mut self, panels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.panels = panels.into_iter().map(Into::into).collect();
        self
    }
}

/// A dashboard's live panel group: an ordered list of panel slugs.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HzPanelGroup {
    pub slug: String,
    pub name: Option<String>,
    pub panels: Vec<String>,
    /// Slug of the owning dashboard.
    pub dashboard: String,
}

impl HzPanelGroup {
    pub fn new(
        dashboard: impl Into<String>,
        slug: Option<&str>,
        name: Option<&str>,
        panels: &[String],
    ) -> Self {
        HzPanelGroup {
            slug: slug.unwrap_or(DEFAULT_PANEL_GROUP).to_string(),
            name: name.map(str::to_string),
            panels: panels.to_vec(),
            dashboard: dashboard.into(),
        }
    }

    pub fn from_spec(dashboard: impl Into<String>, spec: &HzPanelGroupSpec) -> Self {
        HzPanelGroup::new(dashboard, Some(&spec.slug), spec.name.as_deref(), &spec.panels)
    }

    /// Registered panels of this group in group order. Names that are not
    /// currently registered are skipped.
    pub fn iter<'a>(
        &'a self,
        dashboard: &'a HzDashboard,
    ) -> impl Iterator<Item = &'a Arc<HzPanel>> + 'a {
        self.panels.iter().filter_map(move |name| {
            match dashboard.get_panel(name.as_str()) {
                Ok(panel) => Some(panel),
                Err(_) => {
                    log::debug!(
                        "panel_group.panel_missing: panel not registered - group={}, panel={}",
                        self.slug,
                        name
                    );
                    None
                }
            }
        })
    }

    pub fn len(&self) -> usize {
        self.panels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.panels.is_empty()
    }
}
