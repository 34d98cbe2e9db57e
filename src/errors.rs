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

//! # Hzx Error Module
//!
//! This module defines the error types and utilities used throughout Hzx for
//! consistent error handling and reporting.
//!
//! ## Error Categories
//!
//! - **NotRegistered**: Registry lookup misses. Recoverable; callers frequently
//!   treat it as "feature disabled"
//! - **ImproperlyConfigured**: A required attribute (slug) is missing or a
//!   setting has an invalid shape
//! - **Type / Value**: A dotted path names something that is not a class, or a
//!   class of the wrong kind was handed to a registry
//! - **ModuleNotFound / Import**: Failures while importing catalog modules
//!   during autodiscovery
//! - **NoReverseMatch**: A route name could not be reversed into a path
//! - **NotAuthenticated / NotAuthorized**: Raised by the access-control layers
//!   when a routed handler is dispatched
//! - **Io / Serde / Internal**: Ambient failures
//!
//! ## Usage
//!
//! ```rust
//! use hzx::errors::{Result, HzError};
//!
//! fn lookup(slug: &str) -> Result<()> {
//!     Err(HzError::not_registered(format!(
//!         "Dashboard with slug \"{}\" is not registered.",
//!         slug
//!     )))
//! }
//! ```

use std::io;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Convenience result type used throughout Hzx.
pub type Result<T> = std::result::Result<T, HzError>;

/// Canonical error enumeration for Hzx.
#[derive(Clone, Debug, Error, PartialEq, Serialize, Deserialize)]
pub enum HzError {
    /// A dashboard or panel lookup did not match any registered instance.
    #[error("{0}")]
    NotRegistered(String),

    /// A required static attribute is missing or a setting is malformed.
    #[error("improperly configured: {0}")]
    ImproperlyConfigured(String),

    /// A symbol of the wrong nature (not a class) was used where a class was
    /// expected.
    #[error("type error: {0}")]
    Type(String),

    /// A value of the right nature but the wrong kind or shape.
    #[error("value error: {0}")]
    Value(String),

    /// The requested module does not exist in the module catalog.
    #[error("no module named '{0}'")]
    ModuleNotFound(String),

    /// The module exists but failed while being imported.
    #[error("error importing '{module}': {message}")]
    Import { module: String, message: String },

    /// A route name could not be reversed into a path.
    #[error("reverse for '{0}' not found")]
    NoReverseMatch(String),

    /// The handler requires an authenticated user.
    #[error("please log in to continue")]
    NotAuthenticated,

    /// The user lacks one or more permissions required by the handler.
    #[error("not authorized, missing permissions: {}", missing.join(", "))]
    NotAuthorized { missing: Vec<String> },

    /// Errors originating from filesystem IO.
    #[error("io error: {0}")]
    Io(String),

    /// Wrapper for serde-style serialization issues.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Catch-all variant for unexpected situations.
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<io::Error> for HzError {
    fn from(err: io::Error) -> Self {
        HzError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for HzError {
    fn from(err: serde_json::Error) -> Self {
        HzError::Serde(err.to_string())
    }
}

#[cfg(feature = "yaml")]
impl From<serde_yaml::Error> for HzError {
    fn from(err: serde_yaml::Error) -> Self {
        HzError::Serde(err.to_string())
    }
}

impl From<regex::Error> for HzError {
    fn from(err: regex::Error) -> Self {
        HzError::ImproperlyConfigured(format!("invalid route pattern: {}", err))
    }
}

impl HzError {
    /// Helper to construct registry lookup misses.
    pub fn not_registered<T: Into<String>>(message: T) -> Self {
        HzError::NotRegistered(message.into())
    }

    /// Helper to construct configuration errors.
    pub fn improperly_configured<T: Into<String>>(message: T) -> Self {
        HzError::ImproperlyConfigured(message.into())
    }

    pub fn type_error<T: Into<String>>(message: T) -> Self {
        HzError::Type(message.into())
    }

    pub fn value<T: Into<String>>(message: T) -> Self {
        HzError::Value(message.into())
    }

    /// Helper to construct import failures for an existing module.
    pub fn import(module: impl Into<String>, message: impl Into<String>) -> Self {
        HzError::Import {
            module: module.into(),
            message: message.into(),
        }
    }

    /// Helper to construct internal errors.
    pub fn internal<T: Into<String>>(message: T) -> Self {
        HzError::Internal(message.into())
    }

    pub fn is_not_registered(&self) -> bool {
        matches!(self, HzError::NotRegistered(_))
    }
}
