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

//! # Registry Module
//!
//! Keyed container mapping a plugin class (by class path) to its single
//! instance. A site owns a registry of dashboards; each dashboard owns a
//! registry of panels.
//!
//! ## Key Components
//!
//! - **HzRegistrable**: Implemented by the instance types a registry holds
//! - **HzClass**: A dashboard or panel class, as handed to `register`
//! - **HzLookup**: Class-or-slug key accepted by lookups
//! - **HzRegistry**: Insertion-ordered `class path -> Arc<instance>` map
//!
//! ## Snapshots
//!
//! Entries sit behind `Arc`, so cloning a registry is a shallow copy that
//! shares every instance. Mutation goes through `Arc::make_mut`, which leaves
//! any outstanding snapshot untouched.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;

use crate::component::{ensure_slug, HzComponent};
use crate::dashboard::HzDashboardClass;
use crate::errors::{HzError, Result};
use crate::panel::HzPanelClass;

/// A plugin class: the static description a registry instantiates.
#[derive(Clone, Debug)]
pub enum HzClass {
    Dashboard(Arc<HzDashboardClass>),
    Panel(Arc<HzPanelClass>),
}

impl HzClass {
    pub fn kind(&self) -> &'static str {
        match self {
            HzClass::Dashboard(_) => "Dashboard",
            HzClass::Panel(_) => "Panel",
        }
    }

    pub fn class_path(&self) -> String {
        match self {
            HzClass::Dashboard(class) => class.class_path(),
            HzClass::Panel(class) => class.class_path(),
        }
    }

    pub fn slug(&self) -> &str {
        match self {
            HzClass::Dashboard(class) => &class.slug,
            HzClass::Panel(class) => &class.slug,
        }
    }
}

impl From<Arc<HzDashboardClass>> for HzClass {
    fn from(class: Arc<HzDashboardClass>) -> Self {
        HzClass::Dashboard(class)
    }
}

impl From<&Arc<HzDashboardClass>> for HzClass {
    fn from(class: &Arc<HzDashboardClass>) -> Self {
        HzClass::Dashboard(Arc::clone(class))
    }
}

impl From<HzDashboardClass> for HzClass {
    fn from(class: HzDashboardClass) -> Self {
        HzClass::Dashboard(Arc::new(class))
    }
}

impl From<Arc<HzPanelClass>> for HzClass {
    fn from(class: Arc<HzPanelClass>) -> Self {
        HzClass::Panel(class)
    }
}

impl From<&Arc<HzPanelClass>> for HzClass {
    fn from(class: &Arc<HzPanelClass>) -> Self {
        HzClass::Panel(Arc::clone(class))
    }
}

impl From<HzPanelClass> for HzClass {
    fn from(class: HzPanelClass) -> Self {
        HzClass::Panel(Arc::new(class))
    }
}

impl From<&HzClass> for HzClass {
    fn from(class: &HzClass) -> Self {
        class.clone()
    }
}

/// Lookup key: a class, or a slug compared against registered instances.
#[derive(Clone, Debug)]
pub enum HzLookup {
    Class(HzClass),
    Slug(String),
}

impl HzLookup {
    fn describe(&self) -> String {
        match self {
            HzLookup::Class(class) => class.class_path(),
            HzLookup::Slug(slug) => slug.clone(),
        }
    }
}

impl From<&str> for HzLookup {
    fn from(slug: &str) -> Self {
        HzLookup::Slug(slug.to_string())
    }
}

impl From<String> for HzLookup {
    fn from(slug: String) -> Self {
        HzLookup::Slug(slug)
    }
}

impl From<&String> for HzLookup {
    fn from(slug: &String) -> Self {
        HzLookup::Slug(slug.clone())
    }
}

impl From<HzClass> for HzLookup {
    fn from(class: HzClass) -> Self {
        HzLookup::Class(class)
    }
}

impl From<&HzClass> for HzLookup {
    fn from(class: &HzClass) -> Self {
        HzLookup::Class(class.clone())
    }
}

impl From<&Arc<HzDashboardClass>> for HzLookup {
    fn from(class: &Arc<HzDashboardClass>) -> Self {
        HzLookup::Class(class.into())
    }
}

impl From<&Arc<HzPanelClass>> for HzLookup {
    fn from(class: &Arc<HzPanelClass>) -> Self {
        HzLookup::Class(class.into())
    }
}

/// Instance types a registry can hold.
pub trait HzRegistrable: HzComponent + Clone + fmt::Debug {
    type Class: fmt::Debug;

    /// Human-readable kind used in error messages.
    const KIND: &'static str;

    /// Extract the class of this registry's kind, if `class` is one.
    fn downcast(class: &HzClass) -> Option<&Arc<Self::Class>>;

    fn class_path_of(class: &Self::Class) -> String;

    fn slug_of(class: &Self::Class) -> &str;

    /// Build the single instance, tagged with the owning component's slug.
    fn instantiate(class: Arc<Self::Class>, registered_with: &str) -> Self;

    fn class(&self) -> &Arc<Self::Class>;
}

#[derive(Clone, Debug)]
pub struct HzRegistry<T: HzRegistrable> {
    owner: Option<(&'static str, String)>,
    entries: IndexMap<String, Arc<T>>,
}

impl<T: HzRegistrable> Default for HzRegistry<T> {
    fn default() -> Self {
        HzRegistry::new()
    }
}

impl<T: HzRegistrable> HzRegistry<T> {
    /// Top-level registry (the site's).
    pub fn new() -> Self {
        HzRegistry {
            owner: None,
            entries: IndexMap::new(),
        }
    }

    /// Registry owned by another component, e.g. a dashboard's panels.
    pub fn nested(owner_kind: &'static str, owner_slug: impl Into<String>) -> Self {
        HzRegistry {
            owner: Some((owner_kind, owner_slug.into())),
            entries: IndexMap::new(),
        }
    }

    fn owner_slug(&self) -> &str {
        self.owner.as_ref().map(|(_, slug)| slug.as_str()).unwrap_or("")
    }

    fn typed<'c>(&self, class: &'c HzClass, action: &str) -> Result<&'c Arc<T::Class>> {
        T::downcast(class).ok_or_else(|| {
            HzError::value(format!(
                "Only {} classes may be {}. Got {} ({}).",
                T::KIND,
                action,
                class.kind(),
                class.class_path()
            ))
        })
    }

    /// Register `class`, instantiating it on first registration. Registering
    /// an already registered class returns the existing instance.
    pub fn register(&mut self, class: impl Into<HzClass>) -> Result<&Arc<T>> {
        let class = class.into();
        let typed = Arc::clone(self.typed(&class, "registered")?);
        let path = T::class_path_of(&typed);
        if !self.entries.contains_key(&path) {
            ensure_slug(T::KIND, &path, T::slug_of(&typed))?;
            let instance = T::instantiate(typed, self.owner_slug());
            self.entries.insert(path.clone(), Arc::new(instance));
        }
        self.entries
            .get(&path)
            .ok_or_else(|| HzError::internal(format!("registry lost entry {}", path)))
    }

    /// Remove `class`; the remaining entries keep their order.
    pub fn unregister(&mut self, class: impl Into<HzClass>) -> Result<bool> {
        let class = class.into();
        let path = T::class_path_of(self.typed(&class, "unregistered")?);
        match self.entries.shift_remove(&path) {
            Some(_) => Ok(true),
            None => Err(HzError::not_registered(format!(
                "{} is not registered",
                path
            ))),
        }
    }

    fn index_of(&self, lookup: &HzLookup) -> Option<usize> {
        match lookup {
            HzLookup::Class(class) => {
                let typed = T::downcast(class)?;
                self.entries.get_index_of(&T::class_path_of(typed))
            }
            HzLookup::Slug(slug) => self.entries.values().position(|item| item.slug() == slug),
        }
    }

    fn missing(&self, lookup: &HzLookup) -> HzError {
        let slug = lookup.describe();
        match &self.owner {
            Some((kind, owner)) => HzError::not_registered(format!(
                "{} with slug \"{}\" is not registered with {} \"{}\".",
                T::KIND,
                slug,
                kind,
                owner
            )),
            None => HzError::not_registered(format!(
                "{} with slug \"{}\" is not registered.",
                T::KIND,
                slug
            )),
        }
    }

    /// Look up by class (map lookup) or slug (scan in registration order).
    pub fn registered(&self, lookup: impl Into<HzLookup>) -> Result<&Arc<T>> {
        let lookup = lookup.into();
        match self.index_of(&lookup) {
            Some(idx) => self
                .entries
                .get_index(idx)
                .map(|(_, item)| item)
                .ok_or_else(|| self.missing(&lookup)),
            None => Err(self.missing(&lookup)),
        }
    }

    /// Mutable access; clones the instance if a snapshot still shares it.
    pub fn registered_mut(&mut self, lookup: impl Into<HzLookup>) -> Result<&mut T> {
        let lookup = lookup.into();
        let idx = self
            .index_of(&lookup)
            .ok_or_else(|| self.missing(&lookup))?;
        match self.entries.get_index_mut(idx) {
            Some((_, item)) => Ok(Arc::make_mut(item)),
            None => Err(HzError::internal(format!(
                "registry index {} out of bounds",
                idx
            ))),
        }
    }

    pub fn contains(&self, lookup: impl Into<HzLookup>) -> bool {
        self.index_of(&lookup.into()).is_some()
    }

    pub fn values(&self) -> impl Iterator<Item = &Arc<T>> {
        self.entries.values()
    }

    pub fn class_paths(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn snapshot(&self) -> Self {
        self.clone()
    }

    pub fn restore(&mut self, snapshot: Self) {
        *self = snapshot;
    }
}
