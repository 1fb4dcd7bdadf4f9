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

//! Size-based rotation of the active log file.
//!
//! On-disk layout for an active file at `<path>`:
//!
//! ```text
//! <path>         the active log file
//! <path>.tmp     a just-rotated file waiting to be archived
//! <path>.1       the most recent backup
//! <path>.<n>     older backups, up to the retention limit
//! ```
//!
//! Rotation swaps the active file synchronously. Renumbering and pruning the backups runs on a
//! dedicated worker thread, one per logger.

mod archive;
mod file;

pub(crate) use file::RollingFile;

/// Bytes in one megabyte, the unit of configured file sizes.
pub const MEGABYTE: u64 = 1024 * 1024;
