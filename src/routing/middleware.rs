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

//! # Middleware Module
//!
//! Access-control decorations are an explicit, ordered list of [`HzLayer`]s
//! attached to every routed handler.
//!
//! ## Layer Order
//!
//! Layers are stored in application order: the first layer pushed wraps the
//! view most tightly. A panel pushes `RequirePerms` then `CurrentPanel`; its
//! dashboard then pushes `RequireAuth` (unless public), `RequirePerms`, and
//! `CurrentDashboard`. Dispatch walks the list from the last layer to the
//! first, so the dashboard marker is set before any check runs.
//!
//! A `RequirePerms` layer checks the union of its own permissions and every
//! `RequirePerms` layer beneath it, so a view requires every permission set
//! from every decoration layer it passed through. Permission layers only
//! check authenticated users; anonymous users are left to `RequireAuth`.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::component::HzUser;
use crate::errors::{HzError, Result};

/// A routed view. Receives the request after every layer has run.
pub type HzViewFn = Arc<dyn Fn(&HzRequest) -> Result<HzResponse> + Send + Sync>;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HzLayer {
    RequireAuth,
    RequirePerms(BTreeSet<String>),
    CurrentDashboard(String),
    CurrentPanel(String),
}

/// Request as seen by routed handlers.
#[derive(Clone, Debug, Default)]
pub struct HzRequest {
    pub path: String,
    pub user: HzUser,
    pub kwargs: BTreeMap<String, String>,
    pub current_dashboard: Option<String>,
    pub current_panel: Option<String>,
}

impl HzRequest {
    pub fn new(path: impl Into<String>, user: HzUser) -> Self {
        HzRequest {
            path: path.into(),
            user,
            ..HzRequest::default()
        }
    }
}

/// Response produced by a routed view.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct HzResponse {
    pub view: String,
    pub current_dashboard: Option<String>,
    pub current_panel: Option<String>,
    pub kwargs: BTreeMap<String, String>,
    pub body: Value,
}

impl HzResponse {
    /// Response echoing the component markers and captured arguments of the
    /// request that produced it.
    pub fn for_request(view: impl Into<String>, request: &HzRequest) -> Self {
        HzResponse {
            view: view.into(),
            current_dashboard: request.current_dashboard.clone(),
            current_panel: request.current_panel.clone(),
            kwargs: request.kwargs.clone(),
            body: Value::Null,
        }
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = body;
        self
    }
}

/// A view together with its access-control layers.
#[derive(Clone)]
pub struct HzHandler {
    name: String,
    view: HzViewFn,
    layers: Vec<HzLayer>,
}

impl HzHandler {
    pub fn new<F>(name: impl Into<String>, view: F) -> Self
    where
        F: Fn(&HzRequest) -> Result<HzResponse> + Send + Sync + 'static,
    {
        HzHandler {
            name: name.into(),
            view: Arc::new(view),
            layers: Vec::new(),
        }
    }

    /// Handler whose view answers with [`HzResponse::for_request`].
    pub fn echo(name: impl Into<String>) -> Self {
        let name = name.into();
        let view_name = name.clone();
        HzHandler::new(name, move |request| {
            Ok(HzResponse::for_request(view_name.clone(), request))
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Layers in application order (innermost first).
    pub fn layers(&self) -> &[HzLayer] {
        &self.layers
    }

    pub fn push_layer(&mut self, layer: HzLayer) {
        self.layers.push(layer);
    }

    pub fn with_layer(mut self, layer: HzLayer) -> Self {
        self.push_layer(layer);
        self
    }

    pub fn requires_auth(&self) -> bool {
        self.layers.iter().any(|l| matches!(l, HzLayer::RequireAuth))
    }

    /// Union of every permission layer.
    pub fn required_perms(&self) -> BTreeSet<String> {
        perms_union(&self.layers)
    }

    /// Run the layer chain outermost first, then the view.
    pub fn call(&self, request: &HzRequest) -> Result<HzResponse> {
        let mut request = request.clone();
        for (idx, layer) in self.layers.iter().enumerate().rev() {
            match layer {
                HzLayer::CurrentDashboard(slug) => {
                    request.current_dashboard = Some(slug.clone());
                }
                HzLayer::CurrentPanel(slug) => {
                    request.current_panel = Some(slug.clone());
                }
                HzLayer::RequireAuth => {
                    if !request.user.authenticated {
                        log::debug!(
                            "routing.dispatch.unauthenticated: login required - view={}, path={}",
                            self.name,
                            request.path
                        );
                        return Err(HzError::NotAuthenticated);
                    }
                }
                HzLayer::RequirePerms(_) => {
                    if !request.user.authenticated {
                        continue;
                    }
                    let required = perms_union(&self.layers[..=idx]);
                    if !request.user.has_perms(&required) {
                        let missing = required
                            .iter()
                            .filter(|p| !request.user.permissions.contains(*p))
                            .cloned()
                            .collect::<Vec<_>>();
                        log::debug!(
                            "routing.dispatch.unauthorized: missing permissions - view={}, missing={:?}",
                            self.name,
                            missing
                        );
                        return Err(HzError::NotAuthorized { missing });
                    }
                }
            }
        }
        (self.view)(&request)
    }
}

fn perms_union(layers: &[HzLayer]) -> BTreeSet<String> {
    layers
        .iter()
        .filter_map(|l| match l {
            HzLayer::RequirePerms(perms) => Some(perms.iter().cloned()),
            _ => None,
        })
        .flatten()
        .collect()
}

impl fmt::Debug for HzHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HzHandler")
            .field("name", &self.name)
            .field("layers", &self.layers)
            .finish()
    }
}
