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

//! # Enabled Plugin Files
//!
//! A deployment enables dashboards and panels by dropping small files into
//! an "enabled" directory. Files are applied in file-name order; each is a
//! JSON or YAML object using these keys:
//!
//! - `DISABLED`: skip the file; with `DASHBOARD`, also drop that dashboard
//!   from the configured ordering
//! - `DASHBOARD`: enable a dashboard (appended to the ordering), made the
//!   default when `DEFAULT` is truthy
//! - `ADD_INSTALLED_APPS`: packages prepended to `installed_apps`
//! - `PANEL` / `PANEL_GROUP`: the whole file becomes a panel customization
//!   record, named after the file

use std::fs;
use std::path::Path;

use serde_json::{Map, Value};

use crate::config::settings::HzSiteConfig;
use crate::errors::{HzError, Result};

/// One enabled-plugin file: its name (file stem) and contents.
#[derive(Clone, Debug, PartialEq)]
pub struct HzEnabledEntry {
    pub name: String,
    pub config: Map<String, Value>,
}

impl HzEnabledEntry {
    pub fn new(name: impl Into<String>, config: Map<String, Value>) -> Self {
        HzEnabledEntry {
            name: name.into(),
            config,
        }
    }

    /// Read entries from `dir`, sorted by file name. Files whose name starts
    /// with `__` and files of other types are ignored.
    pub fn read_dir(dir: impl AsRef<Path>) -> Result<Vec<HzEnabledEntry>> {
        let mut paths = fs::read_dir(dir.as_ref())?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| path.is_file())
            .collect::<Vec<_>>();
        paths.sort();

        let mut entries = Vec::new();
        for path in paths {
            let stem = match path.file_stem().and_then(|s| s.to_str()) {
                Some(stem) if !stem.starts_with("__") => stem.to_string(),
                _ => continue,
            };
            let value: Value = match path.extension().and_then(|ext| ext.to_str()) {
                Some("json") => serde_json::from_str(&fs::read_to_string(&path)?)?,
                #[cfg(feature = "yaml")]
                Some("yaml") | Some("yml") => serde_yaml::from_str(&fs::read_to_string(&path)?)?,
                _ => continue,
            };
            match value {
                Value::Object(config) => entries.push(HzEnabledEntry::new(stem, config)),
                _ => {
                    return Err(HzError::improperly_configured(format!(
                        "enabled file {} must contain an object",
                        path.display()
                    )))
                }
            }
        }
        Ok(entries)
    }
}

/// Truthiness of an optional setting value: absent, null, false, zero, and
/// empty strings, lists, or objects are false.
pub(crate) fn truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().map_or(false, |f| f != 0.0),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(items)) => !items.is_empty(),
        Some(Value::Object(map)) => !map.is_empty(),
    }
}

fn string_list(entry: &str, key: &str, value: &Value) -> Result<Vec<String>> {
    match value {
        Value::String(s) => Ok(vec![s.clone()]),
        Value::Array(items) => items
            .iter()
            .map(|item| {
                item.as_str().map(str::to_string).ok_or_else(|| {
                    HzError::improperly_configured(format!(
                        "{} in {} must be a list of strings",
                        key, entry
                    ))
                })
            })
            .collect(),
        _ => Err(HzError::improperly_configured(format!(
            "{} in {} must be a list of strings",
            key, entry
        ))),
    }
}

impl HzSiteConfig {
    /// Merge enabled-plugin entries into this configuration.
    ///
    /// The resulting dashboard order is the configured order minus disabled
    /// dashboards, followed by enabled dashboards not already configured.
    pub fn apply_enabled_entries<I>(&mut self, entries: I) -> Result<()>
    where
        I: IntoIterator<Item = HzEnabledEntry>,
    {
        let mut disabled = Vec::new();
        let mut enabled = Vec::new();
        let mut apps = Vec::new();

        for entry in entries {
            let config = &entry.config;
            if truthy(config.get("DISABLED")) {
                if let Some(dashboard) = config.get("DASHBOARD").and_then(Value::as_str) {
                    disabled.push(dashboard.to_string());
                }
                log::debug!("config.enabled.disabled: skipping entry - entry={}", entry.name);
                continue;
            }
            if let Some(value) = config.get("ADD_INSTALLED_APPS") {
                apps.extend(string_list(&entry.name, "ADD_INSTALLED_APPS", value)?);
            }
            match config.get("DASHBOARD").and_then(Value::as_str) {
                Some(dashboard) if !dashboard.is_empty() => {
                    enabled.push(dashboard.to_string());
                    if truthy(config.get("DEFAULT")) {
                        self.default_dashboard = Some(dashboard.to_string());
                    }
                }
                _ => {
                    if truthy(config.get("PANEL")) || truthy(config.get("PANEL_GROUP")) {
                        let mut record = config.clone();
                        record.insert("__name__".to_string(), Value::String(entry.name.clone()));
                        self.panel_customization.push(record);
                    }
                }
            }
        }

        let configured = std::mem::take(&mut self.dashboards);
        let mut dashboards = configured
            .iter()
            .filter(|d| !disabled.contains(d))
            .cloned()
            .collect::<Vec<_>>();
        dashboards.extend(enabled.into_iter().filter(|d| !configured.contains(d)));
        self.dashboards = dashboards;

        let mut prepended = Vec::new();
        for app in apps {
            if !self.installed_apps.contains(&app) && !prepended.contains(&app) {
                prepended.push(app);
            }
        }
        prepended.append(&mut self.installed_apps);
        self.installed_apps = prepended;

        log::info!(
            "config.enabled.applied: merged enabled entries - dashboards={:?}, customizations={}",
            self.dashboards,
            self.panel_customization.len()
        );
        Ok(())
    }

    /// [`apply_enabled_entries`](Self::apply_enabled_entries) over the files
    /// of `dir`.
    pub fn apply_enabled_dir(&mut self, dir: impl AsRef<Path>) -> Result<()> {
        let entries = HzEnabledEntry::read_dir(dir)?;
        self.apply_enabled_entries(entries)
    }
}
