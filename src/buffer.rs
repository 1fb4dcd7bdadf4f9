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

use crossbeam_channel::Receiver;
use crossbeam_channel::Sender;
use crossbeam_channel::bounded;

const INITIAL_CAPACITY: usize = 256;
const MAX_POOLED_BUFFERS: usize = 8;
// buffers that grew past this (e.g. a fatal stack dump) are dropped instead of pooled
const MAX_RETAINED_CAPACITY: usize = 64 * 1024;

/// A free list of byte buffers used to format records.
///
/// Buffers are cleared on acquire, so a buffer abandoned halfway through formatting never leaks
/// its content into the next record.
#[derive(Debug)]
pub(crate) struct BufferPool {
    sender: Sender<Vec<u8>>,
    receiver: Receiver<Vec<u8>>,
}

impl Default for BufferPool {
    fn default() -> Self {
        let (sender, receiver) = bounded(MAX_POOLED_BUFFERS);
        BufferPool { sender, receiver }
    }
}

impl BufferPool {
    pub(crate) fn acquire(&self) -> Vec<u8> {
        let mut buf = self
            .receiver
            .try_recv()
            .unwrap_or_else(|_| Vec::with_capacity(INITIAL_CAPACITY));
        buf.clear();
        buf
    }

    pub(crate) fn release(&self, buf: Vec<u8>) {
        if buf.capacity() <= MAX_RETAINED_CAPACITY {
            // a full pool drops the buffer
            let _ = self.sender.try_send(buf);
        }
    }
}
