// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::CancelToken;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, PoisonError};
use strum::{Display, EnumString};
use tracing::debug;

/// Where a client creation currently is
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum ClientStatus {
    Idle,
    SdkLoading,
    SdkLoaded,
    SdkInitializing,
    SdkInitialized,
    Creating,
    Ready,
    Error,
}

impl ClientStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, ClientStatus::Ready | ClientStatus::Error)
    }
}

/// Synchronous sink for status changes
pub type StatusObserver = Arc<dyn Fn(ClientStatus) + Send + Sync>;

/// Forwards status changes to an observer. Goes quiet once the token is cancelled or a
/// terminal status was emitted and never repeats the current status.
pub struct StatusNotifier {
    observer: Option<StatusObserver>,
    cancel: CancelToken,
    current: Mutex<ClientStatus>,
}

impl StatusNotifier {
    pub fn new(observer: Option<StatusObserver>, cancel: CancelToken) -> Self {
        Self {
            observer,
            cancel,
            current: Mutex::new(ClientStatus::Idle),
        }
    }

    pub fn emit(&self, status: ClientStatus) {
        if self.cancel.is_cancelled() {
            return;
        }
        {
            let mut current = self.current.lock().unwrap_or_else(PoisonError::into_inner);
            if current.is_terminal() || *current == status {
                return;
            }
            *current = status;
        }
        debug!(%status, "status changed");
        if let Some(observer) = &self.observer {
            observer(status);
        }
    }

    pub fn current(&self) -> ClientStatus {
        *self.current.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fhevm_test_helpers::RecordingObserver;
    use std::str::FromStr;

    #[test]
    fn test_status_names() {
        assert_eq!(ClientStatus::SdkInitializing.to_string(), "sdk-initializing");
        assert_eq!(
            ClientStatus::from_str("sdk-loaded").unwrap(),
            ClientStatus::SdkLoaded
        );
    }

    #[test]
    fn test_notifier_suppression() {
        let recorder = RecordingObserver::new();
        let cancel = CancelToken::new();
        let notifier = StatusNotifier::new(Some(recorder.callback()), cancel.clone());

        notifier.emit(ClientStatus::SdkLoading);
        notifier.emit(ClientStatus::SdkLoading);
        notifier.emit(ClientStatus::Ready);
        notifier.emit(ClientStatus::Error);
        assert_eq!(
            recorder.seen(),
            vec![ClientStatus::SdkLoading, ClientStatus::Ready]
        );

        let recorder = RecordingObserver::new();
        let notifier = StatusNotifier::new(Some(recorder.callback()), cancel.clone());
        notifier.emit(ClientStatus::SdkLoading);
        cancel.cancel();
        notifier.emit(ClientStatus::SdkLoaded);
        assert_eq!(recorder.seen(), vec![ClientStatus::SdkLoading]);
        assert_eq!(notifier.current(), ClientStatus::SdkLoading);
    }
}
