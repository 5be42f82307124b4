// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::{CancelToken, ClientStatus, CreateOptions, FhevmClient, FhevmEnvironment, FhevmError};
use fhevm_data::{DataStore, InMemoryStore};
use fhevm_relayer::Connection;
use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc, Mutex, PoisonError,
};
use tokio::sync::watch;
use tracing::{debug, warn};

/// Snapshot published to subscribers
pub struct ClientState<S: DataStore = InMemoryStore> {
    /// Creation this snapshot belongs to
    pub generation: u64,
    pub client: Option<Arc<FhevmClient<S>>>,
    pub status: ClientStatus,
    pub error: Option<Arc<FhevmError>>,
}

impl<S: DataStore> Clone for ClientState<S> {
    fn clone(&self) -> Self {
        Self {
            generation: self.generation,
            client: self.client.clone(),
            status: self.status,
            error: self.error.clone(),
        }
    }
}

impl<S: DataStore> Default for ClientState<S> {
    fn default() -> Self {
        Self::idle(0)
    }
}

impl<S: DataStore> ClientState<S> {
    fn idle(generation: u64) -> Self {
        Self {
            generation,
            client: None,
            status: ClientStatus::Idle,
            error: None,
        }
    }
}

/// Apply `update` only while the published state still belongs to `generation`. The check
/// and the write happen under the channel lock so a concurrent restart always wins.
fn publish<S: DataStore>(
    state: &watch::Sender<ClientState<S>>,
    generation: u64,
    update: impl FnOnce(&mut ClientState<S>),
) -> bool {
    state.send_if_modified(|current| {
        if current.generation != generation {
            return false;
        }
        update(current);
        true
    })
}

#[derive(Default)]
struct Target {
    connection: Option<Connection>,
    chain_id: Option<u64>,
    enabled: bool,
    cancel: Option<CancelToken>,
}

/// Owns the client for a changing connection. Every change of connection, chain id or
/// enabled flag, and every `refresh`, cancels the creation in flight and starts over.
/// Completions of superseded creations are dropped.
pub struct ClientController<S: DataStore = InMemoryStore> {
    env: Arc<FhevmEnvironment<S>>,
    target: Mutex<Target>,
    generation: Arc<AtomicU64>,
    state: Arc<watch::Sender<ClientState<S>>>,
}

impl<S: DataStore> ClientController<S> {
    pub fn new(env: Arc<FhevmEnvironment<S>>) -> Self {
        let (state, _) = watch::channel(ClientState::default());
        Self {
            env,
            target: Mutex::new(Target {
                enabled: true,
                ..Default::default()
            }),
            generation: Arc::new(AtomicU64::new(0)),
            state: Arc::new(state),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<ClientState<S>> {
        self.state.subscribe()
    }

    pub fn state(&self) -> ClientState<S> {
        self.state.borrow().clone()
    }

    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// Point the controller at a new connection. `None` tears the client down.
    pub fn set_connection(&self, connection: Option<Connection>, chain_id: Option<u64>) {
        {
            let mut target = self.lock();
            target.connection = connection;
            target.chain_id = chain_id;
        }
        self.restart();
    }

    pub fn set_enabled(&self, enabled: bool) {
        {
            let mut target = self.lock();
            if target.enabled == enabled {
                return;
            }
            target.enabled = enabled;
        }
        self.restart();
    }

    /// Discard the current client and create a new one for the same connection
    pub fn refresh(&self) {
        self.restart();
    }

    /// Wait until the current creation reaches `ready` or `error`
    pub async fn wait_settled(&self) -> ClientState<S> {
        let mut rx = self.subscribe();
        let settled = match rx.wait_for(|s| s.status.is_terminal()).await {
            Ok(state) => state.clone(),
            Err(_) => self.state(),
        };
        settled
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Target> {
        self.target.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn restart(&self) {
        let mut target = self.lock();
        if let Some(cancel) = target.cancel.take() {
            cancel.cancel();
        }
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.state.send_replace(ClientState::idle(generation));

        let Some(connection) = target.connection.clone() else {
            debug!(generation, "no connection, client stays idle");
            return;
        };
        if !target.enabled {
            debug!(generation, "controller disabled, client stays idle");
            return;
        }

        let cancel = CancelToken::new();
        target.cancel = Some(cancel.clone());
        let chain_id = target.chain_id;
        drop(target);

        let is_current = {
            let current = self.generation.clone();
            let cancel = cancel.clone();
            move || current.load(Ordering::SeqCst) == generation && !cancel.is_cancelled()
        };

        let observer = {
            let state = self.state.clone();
            let is_current = is_current.clone();
            // terminal statuses are published together with the result below
            Arc::new(move |status: ClientStatus| {
                if !status.is_terminal() && is_current() {
                    publish(&state, generation, |s| s.status = status);
                }
            })
        };

        let mut options = CreateOptions::new(connection)
            .with_cancel(cancel)
            .on_status_change(observer);
        options.chain_id = chain_id;

        let env = self.env.clone();
        let state = self.state.clone();
        tokio::spawn(async move {
            let result = FhevmClient::create(&env, options).await;
            if !is_current() {
                debug!(generation, "dropping superseded client creation");
                return;
            }
            let published = match result {
                Ok(client) => {
                    let client = Arc::new(client);
                    publish(&state, generation, |s| {
                        s.client = Some(client);
                        s.status = ClientStatus::Ready;
                        s.error = None;
                    })
                }
                Err(FhevmError::OperationCancelled) => return,
                Err(e) => {
                    warn!(error = %e, "client creation failed");
                    let error = Arc::new(e);
                    publish(&state, generation, |s| {
                        s.client = None;
                        s.status = ClientStatus::Error;
                        s.error = Some(error);
                    })
                }
            };
            if !published {
                debug!(generation, "dropping superseded client creation");
            }
        });
    }
}

impl<S: DataStore> Drop for ClientController<S> {
    fn drop(&mut self) {
        if let Some(cancel) = self.lock().cancel.take() {
            cancel.cancel();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stale_generation_cannot_publish() {
        let (state, rx) = watch::channel(ClientState::<InMemoryStore>::idle(2));

        let published = publish(&state, 1, |s| s.status = ClientStatus::Ready);
        assert!(!published);
        assert_eq!(rx.borrow().status, ClientStatus::Idle);
        assert_eq!(rx.borrow().generation, 2);

        let published = publish(&state, 2, |s| s.status = ClientStatus::Creating);
        assert!(published);
        assert_eq!(rx.borrow().status, ClientStatus::Creating);
    }

    #[test]
    fn test_restart_overrides_a_late_result() {
        let (state, rx) = watch::channel(ClientState::<InMemoryStore>::idle(1));

        // restart for generation 2 lands between the result and its publication
        state.send_replace(ClientState::idle(2));
        let published = publish(&state, 1, |s| {
            s.status = ClientStatus::Error;
            s.error = Some(Arc::new(FhevmError::ClientNotReady));
        });

        assert!(!published);
        let current = rx.borrow();
        assert_eq!(current.generation, 2);
        assert_eq!(current.status, ClientStatus::Idle);
        assert!(current.error.is_none());
    }
}
