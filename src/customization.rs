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

//! # Customization Module
//!
//! Declarative records, applied after discovery, that add, remove, or
//! regroup panels and create panel groups.
//!
//! ## Record Kinds
//!
//! - **Panel group**: `PANEL_GROUP`, `PANEL_GROUP_DASHBOARD`,
//!   `PANEL_GROUP_NAME`
//! - **Panel**: `PANEL`, `PANEL_DASHBOARD`, and optionally `DEFAULT_PANEL`,
//!   `REMOVE_PANEL`, `ADD_PANEL` (dotted class path), `PANEL_GROUP`
//!
//! Records naming a `PANEL` are deferred until every group record has been
//! applied, so panels can be added to groups created by the same list.
//!
//! ## Error Boundary
//!
//! Each record is applied on its own. A failing record is logged and reported
//! as skipped; it never aborts the records after it.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::component::HzComponent;
use crate::config::enabled::truthy;
use crate::dashboard::HzPanelSet;
use crate::errors::{HzError, Result};
use crate::panel::HzPanelGroupSpec;
use crate::registry::HzClass;
use crate::site::HzSite;

/// Outcome of applying the configured customization records.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct HzCustomizationReport {
    /// Names of records applied.
    pub applied: Vec<String>,
    /// Names of records skipped, with the reason.
    pub skipped: Vec<(String, String)>,
}

impl HzCustomizationReport {
    pub fn is_clean(&self) -> bool {
        self.skipped.is_empty()
    }

    fn skip(&mut self, name: &str, reason: impl Into<String>) {
        let reason = reason.into();
        log::warn!(
            "customization.record.skipped: {} - record={}",
            reason,
            name
        );
        self.skipped.push((name.to_string(), reason));
    }

    fn settle(&mut self, name: &str, outcome: Result<HzOutcome>) {
        match outcome {
            Ok(HzOutcome::Applied) => self.applied.push(name.to_string()),
            Ok(HzOutcome::Skipped(reason)) => self.skip(name, reason),
            Err(err) => self.skip(name, format!("could not process record: {}", err)),
        }
    }
}

/// Result of one record: applied, or skipped with a reason.
enum HzOutcome {
    Applied,
    Skipped(String),
}

#[derive(Debug, Deserialize)]
struct HzPanelGroupRecord {
    #[serde(rename = "PANEL_GROUP", default)]
    slug: Option<String>,
    #[serde(rename = "PANEL_GROUP_DASHBOARD", default)]
    dashboard: Option<String>,
    #[serde(rename = "PANEL_GROUP_NAME", default)]
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct HzPanelRecord {
    #[serde(rename = "PANEL")]
    panel: String,
    #[serde(rename = "PANEL_DASHBOARD", default)]
    dashboard: Option<String>,
    #[serde(rename = "PANEL_GROUP", default)]
    group: Option<String>,
    #[serde(rename = "DEFAULT_PANEL", default)]
    default_panel: Option<String>,
    #[serde(rename = "ADD_PANEL", default)]
    add_panel: Option<String>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.is_empty())
}

fn parse<T: for<'de> Deserialize<'de>>(record: &Map<String, Value>) -> Result<T> {
    serde_json::from_value(Value::Object(record.clone())).map_err(|err| {
        HzError::improperly_configured(format!("malformed customization record: {}", err))
    })
}

fn record_name(record: &Map<String, Value>, idx: usize) -> String {
    record
        .get("__name__")
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| format!("panel_customization[{}]", idx))
}

impl HzSite {
    /// Apply every `panel_customization` record of the configuration.
    pub fn load_panel_customization(&mut self) -> HzCustomizationReport {
        let records = self.config.panel_customization.clone();
        let mut report = HzCustomizationReport::default();
        let mut panel_records = Vec::new();

        for (idx, record) in records.iter().enumerate() {
            let name = record_name(record, idx);
            if truthy(record.get("PANEL")) {
                panel_records.push((name, record));
            } else if truthy(record.get("PANEL_GROUP")) {
                let outcome = self.apply_panel_group_record(record);
                report.settle(&name, outcome);
            } else {
                report.skip(&name, "record defines neither PANEL nor PANEL_GROUP");
            }
        }

        for (name, record) in panel_records {
            let outcome = self.apply_panel_record(record);
            report.settle(&name, outcome);
        }

        log::info!(
            "customization.loaded: applied panel customization - applied={}, skipped={}",
            report.applied.len(),
            report.skipped.len()
        );
        report
    }

    fn apply_panel_group_record(&mut self, record: &Map<String, Value>) -> Result<HzOutcome> {
        let record: HzPanelGroupRecord = parse(record)?;
        let Some(dashboard) = non_empty(record.dashboard) else {
            return Ok(HzOutcome::Skipped(
                "PANEL_GROUP_DASHBOARD is not defined".to_string(),
            ));
        };
        let Some(slug) = non_empty(record.slug) else {
            return Ok(HzOutcome::Skipped("PANEL_GROUP is not defined".to_string()));
        };
        let Some(name) = non_empty(record.name) else {
            return Ok(HzOutcome::Skipped("PANEL_GROUP_NAME is not defined".to_string()));
        };

        let dash = self.registered_mut(dashboard.as_str())?;
        dash.panels
            .push(HzPanelSet::Group(HzPanelGroupSpec::new(slug).named(name)));
        self.rediscover_dashboard(&dashboard)?;
        Ok(HzOutcome::Applied)
    }

    fn apply_panel_record(&mut self, record: &Map<String, Value>) -> Result<HzOutcome> {
        let remove = truthy(record.get("REMOVE_PANEL"));
        let record: HzPanelRecord = parse(record)?;
        let Some(dashboard) = non_empty(record.dashboard) else {
            return Ok(HzOutcome::Skipped("PANEL_DASHBOARD is not defined".to_string()));
        };
        let dashboard = self.get_dashboard(dashboard.as_str())?.slug().to_string();

        if let Some(default_panel) = non_empty(record.default_panel) {
            self.registered_mut(dashboard.as_str())?.default_panel = Some(default_panel);
        }

        if remove {
            // A panel listed by several groups is yielded once per group.
            let mut seen = BTreeSet::new();
            let matching = self
                .registered(dashboard.as_str())?
                .get_panels()
                .into_iter()
                .filter(|panel| panel.slug() == record.panel)
                .filter(|panel| seen.insert(panel.class.class_path()))
                .collect::<Vec<_>>();
            if matching.is_empty() {
                return Ok(HzOutcome::Skipped(format!(
                    "no panel \"{}\" to remove from dashboard \"{}\"",
                    record.panel, dashboard
                )));
            }
            for panel in matching {
                self.unregister_panel(dashboard.as_str(), &panel.class)?;
            }
            return Ok(HzOutcome::Applied);
        }

        if let Some(path) = non_empty(record.add_panel) {
            let (module, _) = path.rsplit_once('.').ok_or_else(|| {
                HzError::value(format!("{} doesn't look like a module path", path))
            })?;
            if let Err(err) = self.import_module(module) {
                return Ok(HzOutcome::Skipped(format!(
                    "could not import panel module {}: {}",
                    module, err
                )));
            }
            let class = self.modules.import_class(&path)?;
            if let HzClass::Panel(panel) = &class {
                if !panel.can_register(&self.config) {
                    log::debug!(
                        "customization.panel.condition_failed: load condition failed - panel={}",
                        record.panel
                    );
                    return Ok(HzOutcome::Skipped(format!(
                        "load condition failed for panel {}",
                        record.panel
                    )));
                }
            }
            let panel = self.register_panel(dashboard.as_str(), class)?;
            let slug = panel.slug().to_string();

            let dash = self.registered_mut(dashboard.as_str())?;
            match non_empty(record.group) {
                Some(group) => {
                    if !dash.append_to_group(&group, &slug) {
                        return Err(HzError::not_registered(format!(
                            "Panel group \"{}\" is not registered with Dashboard \"{}\".",
                            group, dashboard
                        )));
                    }
                }
                None => dash.panels.push(HzPanelSet::Ungrouped(slug)),
            }
        }
        Ok(HzOutcome::Applied)
    }
}
