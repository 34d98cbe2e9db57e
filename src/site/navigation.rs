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

use std::collections::BTreeMap;

use serde::Serialize;

use crate::component::{HzComponent, HzUser};
use crate::errors::Result;
use crate::site::HzSite;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HzNavPanel {
    pub slug: String,
    pub name: String,
    pub url: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HzNavGroup {
    pub slug: String,
    /// Group name, or the dashboard's name for unnamed groups.
    pub name: String,
    pub panels: Vec<HzNavPanel>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HzNavDashboard {
    pub slug: String,
    pub name: String,
    pub url: Option<String>,
    pub groups: Vec<HzNavGroup>,
}

impl HzSite {
    /// Navigation tree for `user`: dashboards in display order that are
    /// shown in navigation and accessible, each with its non-empty groups of
    /// visible, accessible panels.
    pub fn navigation(&mut self, user: &HzUser) -> Result<Vec<HzNavDashboard>> {
        self.routes()?;
        let ctx = self.access_context(user);

        let mut tree = Vec::new();
        for dashboard in self.get_dashboards()? {
            if !dashboard.nav() || !dashboard.can_access(&ctx) {
                continue;
            }
            let mut groups = Vec::new();
            for group in dashboard.get_panel_groups().values() {
                let panels = group
                    .iter(&dashboard)
                    .filter(|panel| panel.nav() && panel.can_access(&ctx))
                    .map(|panel| HzNavPanel {
                        slug: panel.slug().to_string(),
                        name: panel.name().to_string(),
                        url: self
                            .reverse_index(&panel.registered_with, panel.slug())
                            .ok(),
                    })
                    .collect::<Vec<_>>();
                if panels.is_empty() {
                    continue;
                }
                groups.push(HzNavGroup {
                    slug: group.slug.clone(),
                    name: group
                        .name
                        .clone()
                        .unwrap_or_else(|| dashboard.name().to_string()),
                    panels,
                });
            }
            let url = dashboard
                .default_panel
                .as_deref()
                .and_then(|panel| self.reverse_index(dashboard.slug(), panel).ok());
            tree.push(HzNavDashboard {
                slug: dashboard.slug().to_string(),
                name: dashboard.name().to_string(),
                url,
                groups,
            });
        }
        Ok(tree)
    }

    /// Index URL of a panel against the already built route tree.
    fn reverse_index(&self, dashboard: &str, panel: &str) -> Result<String> {
        let dash = self.registered(dashboard)?;
        let panel = dash.get_panel(panel)?;
        let name = format!("{}:{}", self.config.namespace, panel.index_route_name());
        self.reverse_built(&name, &BTreeMap::new())
    }
}
