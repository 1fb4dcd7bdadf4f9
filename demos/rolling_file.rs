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

use std::num::NonZeroU64;

use rotalog::LevelFilter;
use rotalog::Logger;

fn main() {
    let logger = Logger::builder()
        .level(LevelFilter::Debug)
        .prefix("[demo] ")
        .file("logs/demo.log")
        .rollover_size(NonZeroU64::new(4 * 1024).unwrap())
        .max_backups(3)
        .build()
        .unwrap();

    let repeat = 200;

    for i in 0..repeat {
        rotalog::error!(logger, "Hello error! {i}");
        rotalog::warn!(logger, "Hello warn! {i}");
        rotalog::info!(logger; "Hello", "info!", i);
        rotalog::debug!(logger; "Hello", "debug!", i);
    }

    logger.flush();
}
