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

//! # Route Module
//!
//! Composable route fragments. A fragment is the triple
//! `(entries, namespace, slug)`; entries are either leaf routes or includes
//! of nested fragments under a prefix pattern.
//!
//! ## Patterns
//!
//! Patterns are regular expressions anchored with `^`. Leaf patterns usually
//! end with `$`. Named groups (`(?P<name>...)`) become keyword arguments on
//! resolution and are substituted on reversal. Reversal supports literal
//! text, escapes, and named groups only.
//!
//! ## Names
//!
//! Route names are namespaced with `:` by the namespaces of the fragments
//! traversed, e.g. `project:instances:index` relative to the site fragment.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use regex::Regex;

use crate::errors::{HzError, Result};
use crate::routing::middleware::{HzHandler, HzLayer, HzRequest, HzResponse};

/// A leaf route: pattern, optional name, handler.
#[derive(Clone)]
pub struct HzRoute {
    pattern: String,
    regex: Regex,
    name: Option<String>,
    handler: HzHandler,
}

impl HzRoute {
    pub fn new(pattern: &str, handler: HzHandler) -> Result<Self> {
        Ok(HzRoute {
            pattern: pattern.to_string(),
            regex: Regex::new(pattern)?,
            name: None,
            handler,
        })
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn handler(&self) -> &HzHandler {
        &self.handler
    }
}

impl fmt::Debug for HzRoute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HzRoute")
            .field("pattern", &self.pattern)
            .field("name", &self.name)
            .field("handler", &self.handler)
            .finish()
    }
}

/// A nested fragment mounted under a prefix pattern.
#[derive(Clone)]
pub struct HzInclude {
    pattern: String,
    regex: Regex,
    fragment: HzRouteFragment,
}

impl HzInclude {
    pub fn new(pattern: &str, fragment: HzRouteFragment) -> Result<Self> {
        Ok(HzInclude {
            pattern: pattern.to_string(),
            regex: Regex::new(pattern)?,
            fragment,
        })
    }

    /// Mount `fragment` under `^<slug>/`, with dots in the slug turned into
    /// path separators.
    pub fn under_slug(slug: &str, fragment: HzRouteFragment) -> Result<Self> {
        let segments = slug
            .split('.')
            .map(regex::escape)
            .collect::<Vec<_>>()
            .join("/");
        HzInclude::new(&format!("^{}/", segments), fragment)
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn fragment(&self) -> &HzRouteFragment {
        &self.fragment
    }
}

impl fmt::Debug for HzInclude {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HzInclude")
            .field("pattern", &self.pattern)
            .field("fragment", &self.fragment)
            .finish()
    }
}

#[derive(Clone, Debug)]
pub enum HzRouteEntry {
    Route(HzRoute),
    Include(HzInclude),
}

impl From<HzRoute> for HzRouteEntry {
    fn from(route: HzRoute) -> Self {
        HzRouteEntry::Route(route)
    }
}

impl From<HzInclude> for HzRouteEntry {
    fn from(include: HzInclude) -> Self {
        HzRouteEntry::Include(include)
    }
}

/// The composable unit: entries plus the namespace and slug they are
/// included under.
#[derive(Clone, Debug, Default)]
pub struct HzRouteFragment {
    pub entries: Vec<HzRouteEntry>,
    pub namespace: String,
    pub slug: String,
}

/// Result of resolving a path.
#[derive(Clone, Debug)]
pub struct HzResolved {
    pub handler: HzHandler,
    pub kwargs: BTreeMap<String, String>,
    pub namespaces: Vec<String>,
    pub url_name: Option<String>,
}

impl HzResolved {
    /// Fully namespaced route name, if the route is named.
    pub fn view_name(&self) -> Option<String> {
        let name = self.url_name.as_ref()?;
        let mut parts = self.namespaces.clone();
        parts.push(name.clone());
        Some(parts.join(":"))
    }

    /// Dispatch the resolved handler with the captured keyword arguments.
    pub fn call(&self, request: &HzRequest) -> Result<HzResponse> {
        let mut request = request.clone();
        request.kwargs.extend(self.kwargs.clone());
        self.handler.call(&request)
    }
}

impl HzRouteFragment {
    pub fn new(
        entries: Vec<HzRouteEntry>,
        namespace: impl Into<String>,
        slug: impl Into<String>,
    ) -> Self {
        HzRouteFragment {
            entries,
            namespace: namespace.into(),
            slug: slug.into(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, HzRouteEntry> {
        self.entries.iter()
    }

    /// Push `layer` onto every handler, nested includes included.
    pub fn decorate(&mut self, layer: &HzLayer) {
        for entry in &mut self.entries {
            match entry {
                HzRouteEntry::Route(route) => route.handler.push_layer(layer.clone()),
                HzRouteEntry::Include(include) => include.fragment.decorate(layer),
            }
        }
    }

    /// Permission decoration; an empty permission set leaves handlers as-is.
    pub fn require_perms<I, S>(&mut self, permissions: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let perms = permissions
            .into_iter()
            .map(Into::into)
            .collect::<BTreeSet<String>>();
        if !perms.is_empty() {
            self.decorate(&HzLayer::RequirePerms(perms));
        }
    }

    /// Resolve a path (without leading `/`) to its handler.
    pub fn resolve(&self, path: &str) -> Option<HzResolved> {
        resolve_entries(&self.entries, path, &[], &BTreeMap::new())
    }

    /// Reverse a route name relative to this fragment's entries.
    pub fn reverse(&self, name: &str, kwargs: &BTreeMap<String, String>) -> Result<String> {
        let parts = name.split(':').collect::<Vec<_>>();
        let (url_name, namespaces) = match parts.split_last() {
            Some((last, rest)) if !last.is_empty() => (*last, rest),
            _ => return Err(HzError::NoReverseMatch(name.to_string())),
        };
        reverse_entries(&self.entries, namespaces, url_name, kwargs)
            .ok_or_else(|| HzError::NoReverseMatch(name.to_string()))
    }

    /// Every named route, fully namespaced relative to this fragment.
    pub fn route_names(&self) -> Vec<String> {
        let mut names = Vec::new();
        collect_names(&self.entries, &mut Vec::new(), &mut names);
        names
    }
}

impl<'a> IntoIterator for &'a HzRouteFragment {
    type Item = &'a HzRouteEntry;
    type IntoIter = std::slice::Iter<'a, HzRouteEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

fn captured_kwargs(regex: &Regex, caps: &regex::Captures<'_>) -> BTreeMap<String, String> {
    regex
        .capture_names()
        .flatten()
        .filter_map(|name| {
            caps.name(name)
                .map(|m| (name.to_string(), m.as_str().to_string()))
        })
        .collect()
}

fn resolve_entries(
    entries: &[HzRouteEntry],
    path: &str,
    namespaces: &[String],
    kwargs: &BTreeMap<String, String>,
) -> Option<HzResolved> {
    for entry in entries {
        match entry {
            HzRouteEntry::Route(route) => {
                let caps = match route.regex.captures(path) {
                    Some(caps) => caps,
                    None => continue,
                };
                if caps.get(0).map(|m| m.start()) != Some(0) {
                    continue;
                }
                let mut merged = kwargs.clone();
                merged.extend(captured_kwargs(&route.regex, &caps));
                return Some(HzResolved {
                    handler: route.handler.clone(),
                    kwargs: merged,
                    namespaces: namespaces.to_vec(),
                    url_name: route.name.clone(),
                });
            }
            HzRouteEntry::Include(include) => {
                let caps = match include.regex.captures(path) {
                    Some(caps) => caps,
                    None => continue,
                };
                let end = match caps.get(0) {
                    Some(m) if m.start() == 0 => m.end(),
                    _ => continue,
                };
                let mut merged = kwargs.clone();
                merged.extend(captured_kwargs(&include.regex, &caps));
                let mut nested = namespaces.to_vec();
                if !include.fragment.namespace.is_empty() {
                    nested.push(include.fragment.namespace.clone());
                }
                if let Some(found) =
                    resolve_entries(&include.fragment.entries, &path[end..], &nested, &merged)
                {
                    return Some(found);
                }
            }
        }
    }
    None
}

fn reverse_entries(
    entries: &[HzRouteEntry],
    namespaces: &[&str],
    url_name: &str,
    kwargs: &BTreeMap<String, String>,
) -> Option<String> {
    for entry in entries {
        match entry {
            HzRouteEntry::Route(route) => {
                if !namespaces.is_empty() || route.name.as_deref() != Some(url_name) {
                    continue;
                }
                if let Some((path, groups)) = reverse_pattern(&route.pattern, kwargs) {
                    let expected = kwargs.keys().map(String::as_str).collect::<BTreeSet<_>>();
                    let provided = groups.iter().map(String::as_str).collect::<BTreeSet<_>>();
                    if expected == provided && route.regex.is_match(&path) {
                        return Some(path);
                    }
                }
            }
            HzRouteEntry::Include(include) => {
                let child = include.fragment.namespace.as_str();
                let remaining = if child.is_empty() {
                    namespaces
                } else if namespaces.first() == Some(&child) {
                    &namespaces[1..]
                } else {
                    continue;
                };
                let prefix = match reverse_pattern(&include.pattern, &BTreeMap::new()) {
                    Some((prefix, _)) => prefix,
                    None => continue,
                };
                if let Some(rest) =
                    reverse_entries(&include.fragment.entries, remaining, url_name, kwargs)
                {
                    return Some(format!("{}{}", prefix, rest));
                }
            }
        }
    }
    None
}

/// Substitute named groups in `pattern` with `kwargs`. Returns the path and
/// the group names consumed, or `None` when the pattern uses regex features
/// that cannot be reversed.
fn reverse_pattern(
    pattern: &str,
    kwargs: &BTreeMap<String, String>,
) -> Option<(String, Vec<String>)> {
    let chars = pattern.chars().collect::<Vec<_>>();
    let mut out = String::new();
    let mut groups = Vec::new();
    let mut i = 0;
    if chars.first() == Some(&'^') {
        i = 1;
    }
    while i < chars.len() {
        match chars[i] {
            '$' if i + 1 == chars.len() => break,
            '\\' => {
                let escaped = *chars.get(i + 1)?;
                out.push(escaped);
                i += 2;
            }
            '(' => {
                let rest = chars[i..].iter().collect::<String>();
                if !rest.starts_with("(?P<") {
                    return None;
                }
                let name_start = i + 4;
                let name_len = chars[name_start..].iter().position(|c| *c == '>')?;
                let name = chars[name_start..name_start + name_len]
                    .iter()
                    .collect::<String>();
                let mut depth = 1;
                let mut j = name_start + name_len + 1;
                while j < chars.len() && depth > 0 {
                    match chars[j] {
                        '\\' => j += 1,
                        '(' => depth += 1,
                        ')' => depth -= 1,
                        _ => {}
                    }
                    j += 1;
                }
                if depth != 0 {
                    return None;
                }
                out.push_str(kwargs.get(&name)?);
                groups.push(name);
                i = j;
            }
            '^' | '$' | '.' | '*' | '+' | '?' | '[' | ']' | '{' | '}' | '|' | ')' => return None,
            c => {
                out.push(c);
                i += 1;
            }
        }
    }
    Some((out, groups))
}

fn collect_names(entries: &[HzRouteEntry], namespaces: &mut Vec<String>, out: &mut Vec<String>) {
    for entry in entries {
        match entry {
            HzRouteEntry::Route(route) => {
                if let Some(name) = &route.name {
                    let mut parts = namespaces.clone();
                    parts.push(name.clone());
                    out.push(parts.join(":"));
                }
            }
            HzRouteEntry::Include(include) => {
                let pushed = !include.fragment.namespace.is_empty();
                if pushed {
                    namespaces.push(include.fragment.namespace.clone());
                }
                collect_names(&include.fragment.entries, namespaces, out);
                if pushed {
                    namespaces.pop();
                }
            }
        }
    }
}
