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

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::errors::{HzError, Result};

/// Site configuration. Every key is optional when deserializing.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HzSiteConfig {
    pub slug: String,
    pub name: String,
    /// Namespace of the site's route fragment; first segment of every route
    /// name.
    pub namespace: String,
    /// Prefix prepended to reversed paths and stripped before resolution.
    pub url_prefix: String,
    /// Packages scanned by autodiscovery, in order.
    pub installed_apps: Vec<String>,
    /// Dashboard ordering, by slug or class path.
    pub dashboards: Vec<String>,
    pub default_dashboard: Option<String>,
    /// URL, `"module.function"` path, or absent.
    pub user_home: Option<Value>,
    pub panel_customization: Vec<Map<String, Value>>,
    pub customization_module: Option<String>,
    /// Module holding site-level url patterns.
    pub urls: Option<String>,
}

impl Default for HzSiteConfig {
    fn default() -> Self {
        HzSiteConfig {
            slug: "horizon".to_string(),
            name: "Horizon".to_string(),
            namespace: "horizon".to_string(),
            url_prefix: "/".to_string(),
            installed_apps: Vec::new(),
            dashboards: Vec::new(),
            default_dashboard: None,
            user_home: None,
            panel_customization: Vec::new(),
            customization_module: None,
            urls: None,
        }
    }
}

impl HzSiteConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn slug(mut self, slug: impl Into<String>) -> Self {
        self.slug = slug.into();
        self
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    pub fn url_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.url_prefix = prefix.into();
        self
    }

    pub fn installed_apps<I, S>(mut self, apps: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.installed_apps = apps.into_iter().map(Into::into).collect();
        self
    }

    pub fn dashboards<I, S>(mut self, dashboards: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.dashboards = dashboards.into_iter().map(Into::into).collect();
        self
    }

    pub fn default_dashboard(mut self, slug: impl Into<String>) -> Self {
        self.default_dashboard = Some(slug.into());
        self
    }

    pub fn user_home(mut self, user_home: impl Into<Value>) -> Self {
        self.user_home = Some(user_home.into());
        self
    }

    /// Append one customization record. The record must be a JSON object.
    pub fn panel_customization(mut self, record: Value) -> Result<Self> {
        match record {
            Value::Object(map) => {
                self.panel_customization.push(map);
                Ok(self)
            }
            other => Err(HzError::improperly_configured(format!(
                "panel customization records must be objects, got {}",
                other
            ))),
        }
    }

    pub fn customization_module(mut self, module: impl Into<String>) -> Self {
        self.customization_module = Some(module.into());
        self
    }

    pub fn urls(mut self, module: impl Into<String>) -> Self {
        self.urls = Some(module.into());
        self
    }

    pub fn from_json(value: &Value) -> Result<Self> {
        serde_json::from_value(value.clone()).map_err(|err| {
            HzError::improperly_configured(format!("invalid site configuration: {}", err))
        })
    }

    pub fn from_json_str(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    #[cfg(feature = "yaml")]
    pub fn from_yaml_str(text: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(text)?)
    }

    /// Load from a `.json`, `.yaml`, or `.yml` file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)?;
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Self::from_json_str(&text),
            #[cfg(feature = "yaml")]
            Some("yaml") | Some("yml") => Self::from_yaml_str(&text),
            _ => Err(HzError::improperly_configured(format!(
                "unsupported configuration file: {}",
                path.display()
            ))),
        }
    }
}
