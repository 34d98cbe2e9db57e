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

//! # Component Module
//!
//! Capabilities shared by every level of the hierarchy (site, dashboard,
//! panel): a required slug, a display name, and an access predicate.
//!
//! ## Access Predicate
//!
//! `policy_rules` on a component are evaluated with OR semantics: each rule is
//! handed to the policy check individually and the first passing rule grants
//! access. Without a policy check or without rules the component is allowed.

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::errors::{HzError, Result};

/// Policy engine hook. Receives a single-rule slice and the user under test.
pub type HzPolicyCheck = Arc<dyn Fn(&[String], &HzUser) -> bool + Send + Sync>;

/// Custom access predicate a plugin class may supply in place of the default
/// policy-rule evaluation.
pub type HzAllowedFn = Arc<dyn Fn(&HzAccessContext) -> bool + Send + Sync>;

/// The user on whose behalf access is evaluated and handlers are dispatched.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HzUser {
    pub username: String,
    pub authenticated: bool,
    pub permissions: BTreeSet<String>,
}

impl HzUser {
    pub fn anonymous() -> Self {
        HzUser::default()
    }

    pub fn authenticated(username: impl Into<String>) -> Self {
        HzUser {
            username: username.into(),
            authenticated: true,
            permissions: BTreeSet::new(),
        }
    }

    pub fn with_permissions<I, S>(mut self, permissions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.permissions
            .extend(permissions.into_iter().map(Into::into));
        self
    }

    /// Anonymous users hold no permissions, whatever their permission set.
    pub fn has_perms<'a, I>(&self, required: I) -> bool
    where
        I: IntoIterator<Item = &'a String>,
    {
        let mut required = required.into_iter().peekable();
        if required.peek().is_none() {
            return true;
        }
        self.authenticated && required.all(|perm| self.permissions.contains(perm))
    }
}

/// Context handed to `allowed` / `can_access`.
#[derive(Clone, Copy)]
pub struct HzAccessContext<'a> {
    pub user: &'a HzUser,
    pub policy_check: Option<&'a HzPolicyCheck>,
}

impl<'a> HzAccessContext<'a> {
    pub fn new(user: &'a HzUser) -> Self {
        HzAccessContext {
            user,
            policy_check: None,
        }
    }

    pub fn with_policy_check(mut self, policy_check: Option<&'a HzPolicyCheck>) -> Self {
        self.policy_check = policy_check;
        self
    }
}

impl fmt::Debug for HzAccessContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HzAccessContext")
            .field("user", &self.user.username)
            .field("policy_check", &self.policy_check.is_some())
            .finish()
    }
}

/// Capability set common to sites, dashboards, and panels.
pub trait HzComponent {
    fn slug(&self) -> &str;

    fn name(&self) -> &str;

    fn policy_rules(&self) -> &[String];

    /// Default policy evaluation: any single rule passing grants access.
    fn policy_allows(&self, ctx: &HzAccessContext) -> bool {
        let rules = self.policy_rules();
        match ctx.policy_check {
            Some(check) if !rules.is_empty() => rules
                .iter()
                .any(|rule| check(std::slice::from_ref(rule), ctx.user)),
            _ => true,
        }
    }

    fn allowed(&self, ctx: &HzAccessContext) -> bool {
        self.policy_allows(ctx)
    }

    fn can_access(&self, ctx: &HzAccessContext) -> bool {
        self.allowed(ctx)
    }
}

/// Every component must carry a non-empty slug.
pub(crate) fn ensure_slug(kind: &str, class_path: &str, slug: &str) -> Result<()> {
    if slug.trim().is_empty() {
        return Err(HzError::improperly_configured(format!(
            "Every {} must have a slug ({}).",
            kind, class_path
        )));
    }
    Ok(())
}
