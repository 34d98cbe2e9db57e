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

//! # Dashboard Module
//!
//! A dashboard is a top-level section of the site. It owns a registry of
//! panels and arranges them into panel groups.
//!
//! ## Panel Specification
//!
//! The panels a dashboard declares are normalized once at construction:
//! a flat list becomes a single `"default"` group, a grouped list is kept as
//! is. Customization later appends further groups or ungrouped panel names.
//!
//! ## Route Composition
//!
//! Every registered panel except the default one is mounted under its slug;
//! the default panel is appended last with an empty prefix, so it serves the
//! dashboard root. The whole fragment is then decorated with the dashboard's
//! authentication, permission, and current-dashboard layers.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;

use crate::component::{HzAccessContext, HzComponent};
use crate::errors::{HzError, Result};
use crate::module::{package_of, HzModuleCatalog};
use crate::panel::{
    HzPanel, HzPanelGroup, HzPanelGroupSpec, DEFAULT_PANEL_GROUP, OTHER_PANEL_GROUP,
    OTHER_PANEL_GROUP_NAME,
};
use crate::registry::{HzClass, HzLookup, HzRegistrable, HzRegistry};
use crate::routing::{HzInclude, HzLayer, HzRouteFragment};

/// Panels as declared on a dashboard class.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HzPanelSpec {
    Flat(Vec<String>),
    Grouped(Vec<HzPanelGroupSpec>),
}

impl Default for HzPanelSpec {
    fn default() -> Self {
        HzPanelSpec::Flat(Vec::new())
    }
}

/// One normalized entry of a dashboard's panel list.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HzPanelSet {
    Group(HzPanelGroupSpec),
    Ungrouped(String),
}

impl HzPanelSpec {
    pub fn normalize(&self) -> Vec<HzPanelSet> {
        match self {
            HzPanelSpec::Flat(names) => vec![HzPanelSet::Group(
                HzPanelGroupSpec::new(DEFAULT_PANEL_GROUP).with_panels(names.iter().cloned()),
            )],
            HzPanelSpec::Grouped(groups) => {
                groups.iter().cloned().map(HzPanelSet::Group).collect()
            }
        }
    }
}

/// Static description of a dashboard.
#[derive(Clone, Debug)]
pub struct HzDashboardClass {
    pub module: String,
    pub class_name: String,
    pub slug: String,
    pub name: String,
    pub urls: Option<String>,
    pub panels: HzPanelSpec,
    pub default_panel: Option<String>,
    pub public: bool,
    pub nav: bool,
    pub permissions: Vec<String>,
    pub policy_rules: Vec<String>,
}

impl HzDashboardClass {
    pub fn new(
        module: impl Into<String>,
        class_name: impl Into<String>,
        slug: impl Into<String>,
    ) -> Self {
        let slug = slug.into();
        HzDashboardClass {
            module: module.into(),
            class_name: class_name.into(),
            name: slug.clone(),
            slug,
            urls: None,
            panels: HzPanelSpec::default(),
            default_panel: None,
            public: false,
            nav: true,
            permissions: Vec::new(),
            policy_rules: Vec::new(),
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

    pub fn with_panels<I, S>(mut self, panels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.panels = HzPanelSpec::Flat(panels.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_panel_groups(mut self, groups: Vec<HzPanelGroupSpec>) -> Self {
        self.panels = HzPanelSpec::Grouped(groups);
        self
    }

    pub fn with_default_panel(mut self, slug: impl Into<String>) -> Self {
        self.default_panel = Some(slug.into());
        self
    }

    pub fn public(mut self, public: bool) -> Self {
        self.public = public;
        self
    }

    pub fn with_nav(mut self, nav: bool) -> Self {
        self.nav = nav;
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

    pub fn class_path(&self) -> String {
        format!("{}.{}", self.module, self.class_name)
    }

    pub fn package(&self) -> &str {
        package_of(&self.module)
    }
}

/// The registered instance of a dashboard class.
#[derive(Clone)]
pub struct HzDashboard {
    pub class: Arc<HzDashboardClass>,
    pub registered_with: String,
    pub(crate) registry: HzRegistry<HzPanel>,
    pub default_panel: Option<String>,
    pub panels: Vec<HzPanelSet>,
    pub(crate) panel_groups: Option<IndexMap<String, HzPanelGroup>>,
    pub(crate) autodiscover_complete: bool,
}

impl fmt::Debug for HzDashboard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HzDashboard")
            .field("slug", &self.class.slug)
            .field("panels", &self.registry.class_paths().collect::<Vec<_>>())
            .field("default_panel", &self.default_panel)
            .field("autodiscover_complete", &self.autodiscover_complete)
            .finish()
    }
}

impl HzDashboard {
    pub fn public(&self) -> bool {
        self.class.public
    }

    pub fn nav(&self) -> bool {
        self.class.nav
    }

    pub fn permissions(&self) -> &[String] {
        &self.class.permissions
    }

    pub fn autodiscover_complete(&self) -> bool {
        self.autodiscover_complete
    }

    /// Panel registry; registration goes through the site so its template
    /// directory table stays in sync.
    pub fn registry(&self) -> &HzRegistry<HzPanel> {
        &self.registry
    }

    pub(crate) fn register(&mut self, panel: impl Into<HzClass>) -> Result<Arc<HzPanel>> {
        self.registry.register(panel).map(Arc::clone)
    }

    pub(crate) fn unregister(&mut self, panel: impl Into<HzClass>) -> Result<bool> {
        self.registry.unregister(panel)
    }

    pub fn get_panel(&self, panel: impl Into<HzLookup>) -> Result<&Arc<HzPanel>> {
        self.registry.registered(panel)
    }

    pub fn get_panel_group(&self, slug: &str) -> Option<&HzPanelGroup> {
        self.panel_groups.as_ref()?.get(slug)
    }

    pub fn get_panel_group_mut(&mut self, slug: &str) -> Option<&mut HzPanelGroup> {
        self.panel_groups.as_mut()?.get_mut(slug)
    }

    /// Append `panel` to the live group `group` and to its declaration, so
    /// later rediscovery keeps it. Returns false when the group is unknown.
    pub fn append_to_group(&mut self, group: &str, panel: &str) -> bool {
        let Some(live) = self.get_panel_group_mut(group) else {
            return false;
        };
        live.panels.push(panel.to_string());
        for set in &mut self.panels {
            if let HzPanelSet::Group(spec) = set {
                if spec.slug == group {
                    spec.panels.push(panel.to_string());
                }
            }
        }
        true
    }

    /// Panel groups in order, with panels outside every group collected into
    /// a trailing `"other"` group. The implicit `"default"` group is left out
    /// while it holds no panels.
    pub fn get_panel_groups(&self) -> IndexMap<String, HzPanelGroup> {
        let mut groups = IndexMap::new();
        let mut grouped = Vec::new();
        if let Some(live) = &self.panel_groups {
            for (slug, group) in live {
                grouped.extend(group.panels.iter().cloned());
                if slug == DEFAULT_PANEL_GROUP && group.is_empty() {
                    continue;
                }
                groups.insert(slug.clone(), group.clone());
            }
        }
        let remaining = self
            .registry
            .values()
            .filter(|panel| !grouped.iter().any(|name| name == panel.slug()))
            .map(|panel| panel.slug().to_string())
            .collect::<Vec<_>>();
        if !remaining.is_empty() {
            groups.insert(
                OTHER_PANEL_GROUP.to_string(),
                HzPanelGroup::new(
                    &self.class.slug,
                    Some(OTHER_PANEL_GROUP),
                    Some(OTHER_PANEL_GROUP_NAME),
                    &remaining,
                ),
            );
        }
        groups
    }

    /// Registered panels flattened across groups, in group order then
    /// intra-group order.
    pub fn get_panels(&self) -> Vec<Arc<HzPanel>> {
        let groups = self.get_panel_groups();
        groups
            .values()
            .flat_map(|group| group.iter(self).cloned().collect::<Vec<_>>())
            .collect()
    }

    /// Build any declared group not yet live, make sure a `"default"` group
    /// exists, and return every panel name to discover.
    pub(crate) fn materialize_panel_groups(&mut self) -> Vec<String> {
        let dashboard = self.class.slug.clone();
        let groups = self.panel_groups.get_or_insert_with(IndexMap::new);
        for set in &self.panels {
            if let HzPanelSet::Group(spec) = set {
                if !groups.contains_key(&spec.slug) {
                    groups.insert(spec.slug.clone(), HzPanelGroup::from_spec(&dashboard, spec));
                }
            }
        }
        if !groups.contains_key(DEFAULT_PANEL_GROUP) {
            groups.shift_insert(
                0,
                DEFAULT_PANEL_GROUP.to_string(),
                HzPanelGroup::new(&dashboard, None, None, &[]),
            );
        }

        let mut names = groups
            .values()
            .flat_map(|group| group.panels.iter().cloned())
            .collect::<Vec<_>>();
        for set in &self.panels {
            if let HzPanelSet::Ungrouped(name) = set {
                names.push(name.clone());
            }
        }
        names
    }

    /// Compose the dashboard's route fragment from its own url patterns and
    /// every registered panel's fragment.
    pub fn route_fragment(&self, catalog: &HzModuleCatalog) -> Result<HzRouteFragment> {
        let default_slug = self.default_panel.as_deref().ok_or_else(|| {
            HzError::not_registered(format!(
                "The default panel for dashboard \"{}\" is not set.",
                self.class.slug
            ))
        })?;
        let default_panel = self.registry.registered(default_slug).map_err(|_| {
            HzError::not_registered(format!(
                "The default panel \"{}\" is not registered.",
                default_slug
            ))
        })?;

        let mut entries =
            catalog.component_urlpatterns(self.class.package(), self.class.urls.as_deref())?;
        for panel in self.registry.values() {
            if panel.slug() == default_slug {
                continue;
            }
            entries.push(HzInclude::under_slug(panel.slug(), panel.route_fragment(catalog)?)?.into());
        }
        entries.push(HzInclude::new("", default_panel.route_fragment(catalog)?)?.into());

        let mut fragment = HzRouteFragment::new(entries, &self.class.slug, &self.class.slug);
        if !self.class.public {
            fragment.decorate(&HzLayer::RequireAuth);
        }
        fragment.require_perms(self.class.permissions.iter().cloned());
        fragment.decorate(&HzLayer::CurrentDashboard(self.class.slug.clone()));
        Ok(fragment)
    }
}

impl HzComponent for HzDashboard {
    fn slug(&self) -> &str {
        &self.class.slug
    }

    fn name(&self) -> &str {
        &self.class.name
    }

    fn policy_rules(&self) -> &[String] {
        &self.class.policy_rules
    }

    /// Own policy rules gate the dashboard; past that, any accessible panel
    /// grants access.
    fn allowed(&self, ctx: &HzAccessContext) -> bool {
        if !self.policy_allows(ctx) {
            return false;
        }
        self.get_panels().iter().any(|panel| panel.can_access(ctx))
    }
}

impl HzRegistrable for HzDashboard {
    type Class = HzDashboardClass;

    const KIND: &'static str = "Dashboard";

    fn downcast(class: &HzClass) -> Option<&Arc<HzDashboardClass>> {
        match class {
            HzClass::Dashboard(class) => Some(class),
            _ => None,
        }
    }

    fn class_path_of(class: &HzDashboardClass) -> String {
        class.class_path()
    }

    fn slug_of(class: &HzDashboardClass) -> &str {
        &class.slug
    }

    fn instantiate(class: Arc<HzDashboardClass>, registered_with: &str) -> Self {
        HzDashboard {
            registry: HzRegistry::nested("Dashboard", class.slug.clone()),
            default_panel: class.default_panel.clone(),
            panels: class.panels.normalize(),
            panel_groups: None,
            autodiscover_complete: false,
            registered_with: registered_with.to_string(),
            class,
        }
    }

    fn class(&self) -> &Arc<HzDashboardClass> {
        &self.class
    }
}
