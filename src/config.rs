// Copyright 2024 FastLabs Developers
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::path::PathBuf;

use crate::LevelFilter;

/// Declarative logger settings, typically loaded from an application config file.
///
/// Turn it into a logger with [`LoggerBuilder::from_config`](crate::LoggerBuilder::from_config).
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default, deny_unknown_fields))]
pub struct Config {
    /// The log file. Standard output when absent.
    pub file: Option<PathBuf>,
    /// Rotate the file past this many megabytes; `0` never rotates.
    pub max_size: u64,
    /// The number of rotated files to keep.
    pub backups: usize,
    /// The threshold.
    pub level: LevelFilter,
    pub prefix: String,
    /// The record template; the default template when absent.
    pub format: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            file: None,
            max_size: 0,
            backups: 0,
            level: LevelFilter::Info,
            prefix: String::new(),
            format: None,
        }
    }
}
