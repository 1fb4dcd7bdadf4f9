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

//! Tag resolution for templates.
//!
//! | tag            | resolves to                                        |
//! |----------------|----------------------------------------------------|
//! | `time_local`   | local time as `YYYY-MM-DD HH:MM:SS.mmm`            |
//! | `time_rfc3339` | time in RFC 3339                                   |
//! | `level`        | severity name, colorized if enabled                |
//! | `pid`          | process id                                         |
//! | `prefix`       | logger prefix                                      |
//! | `long_file`    | caller source path                                 |
//! | `short_file`   | caller base filename                               |
//! | `mid_file`     | `<parent-dir>/<filename>` of the caller            |
//! | `line`         | caller line                                        |
//! | `message`      | message body                                       |
//!
//! Any other name renders as `[unknown tag <name>]`.

use std::collections::HashMap;
use std::fmt;
use std::io::Write;
use std::sync::Arc;

use crate::record::Record;
use crate::record::pid;

const TIME_LOCAL_FORMAT: &str = "%Y-%m-%d %H:%M:%S.%3f";
const TIME_RFC3339_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%:z";

/// A function appending the value of one tag for a record.
pub type TagResolver = Arc<dyn Fn(&Record<'_>, &mut Vec<u8>) + Send + Sync>;

/// Table from tag name to resolver, built once per logger.
#[derive(Clone)]
pub(crate) struct Tags {
    resolvers: HashMap<String, TagResolver>,
}

impl fmt::Debug for Tags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names = self.resolvers.keys().collect::<Vec<_>>();
        names.sort();
        f.debug_struct("Tags").field("names", &names).finish()
    }
}

impl Default for Tags {
    fn default() -> Self {
        let mut tags = Tags {
            resolvers: HashMap::new(),
        };
        tags.insert("time_local", |r, buf| {
            let _ = write!(buf, "{}", r.time().strftime(TIME_LOCAL_FORMAT));
        });
        tags.insert("time_rfc3339", |r, buf| {
            let _ = write!(buf, "{}", r.time().strftime(TIME_RFC3339_FORMAT));
        });
        tags.insert("level", |r, buf| {
            buf.extend_from_slice(r.level_label().as_bytes())
        });
        tags.insert("pid", |_, buf| buf.extend_from_slice(pid().as_bytes()));
        tags.insert("prefix", |r, buf| buf.extend_from_slice(r.prefix().as_bytes()));
        tags.insert("long_file", |r, buf| buf.extend_from_slice(r.file().as_bytes()));
        tags.insert("short_file", |r, buf| {
            buf.extend_from_slice(r.short_file().as_bytes())
        });
        tags.insert("mid_file", |r, buf| {
            buf.extend_from_slice(r.mid_file().as_bytes())
        });
        tags.insert("line", |r, buf| {
            let _ = write!(buf, "{}", r.line());
        });
        tags.insert("message", |r, buf| {
            buf.extend_from_slice(r.message().as_bytes())
        });
        tags
    }
}

impl Tags {
    pub(crate) fn insert<F>(&mut self, name: impl Into<String>, resolver: F)
    where
        F: Fn(&Record<'_>, &mut Vec<u8>) + Send + Sync + 'static,
    {
        self.resolvers.insert(name.into(), Arc::new(resolver));
    }

    pub(crate) fn resolve(&self, name: &str, record: &Record<'_>, buf: &mut Vec<u8>) {
        match self.resolvers.get(name) {
            Some(resolver) => resolver(record, buf),
            None => {
                let _ = write!(buf, "[unknown tag {name}]");
            }
        }
    }
}
