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

//! # Configuration Module
//!
//! Site settings and the loader for "enabled" plugin directories.
//!
//! - **settings**: `HzSiteConfig`, loadable from JSON or YAML
//! - **enabled**: merges per-plugin files (dashboards, panels, panel groups)
//!   into a site configuration

pub mod enabled;
pub mod settings;

pub use enabled::HzEnabledEntry;
pub use settings::HzSiteConfig;
