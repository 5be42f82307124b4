// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::lock;
use std::sync::{Arc, Mutex};

/// Collects every value passed to the callback it hands out
#[derive(Clone)]
pub struct RecordingObserver<T> {
    seen: Arc<Mutex<Vec<T>>>,
}

impl<T> Default for RecordingObserver<T> {
    fn default() -> Self {
        Self {
            seen: Arc::new(Mutex::new(vec![])),
        }
    }
}

impl<T: Clone + Send + 'static> RecordingObserver<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn callback(&self) -> Arc<dyn Fn(T) + Send + Sync> {
        let seen = self.seen.clone();
        Arc::new(move |value| lock(&seen).push(value))
    }

    pub fn seen(&self) -> Vec<T> {
        lock(&self.seen).clone()
    }

    pub fn clear(&self) {
        lock(&self.seen).clear();
    }
}
