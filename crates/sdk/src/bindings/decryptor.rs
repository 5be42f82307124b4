// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::{FhevmClient, FhevmError, Result};
use fhevm_data::{DataStore, InMemoryStore};
use fhevm_relayer::{DecryptRequest, DecryptResult, DecryptionSigner};
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc, Mutex, PoisonError,
};

struct InFlight<'a>(&'a AtomicUsize);

impl<'a> InFlight<'a> {
    fn start(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(counter)
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Runs decryptions against the current client and keeps the latest result
pub struct Decryptor<S: DataStore = InMemoryStore> {
    client: Option<Arc<FhevmClient<S>>>,
    signer: Option<Arc<dyn DecryptionSigner>>,
    in_flight: AtomicUsize,
    results: Mutex<Option<DecryptResult>>,
}

impl<S: DataStore> Decryptor<S> {
    pub fn new(
        client: Option<Arc<FhevmClient<S>>>,
        signer: Option<Arc<dyn DecryptionSigner>>,
    ) -> Self {
        Self {
            client,
            signer,
            in_flight: AtomicUsize::new(0),
            results: Mutex::new(None),
        }
    }

    pub fn is_decrypting(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst) > 0
    }

    pub fn results(&self) -> Option<DecryptResult> {
        self.results
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn clear_results(&self) {
        *self.results.lock().unwrap_or_else(PoisonError::into_inner) = None;
    }

    fn store(&self, result: &DecryptResult) {
        *self.results.lock().unwrap_or_else(PoisonError::into_inner) = Some(result.clone());
    }

    fn client(&self) -> Result<&FhevmClient<S>> {
        self.client.as_deref().ok_or(FhevmError::ClientNotReady)
    }

    pub async fn user_decrypt(&self, requests: &[DecryptRequest]) -> Result<DecryptResult> {
        let client = self.client()?;
        let signer = self
            .signer
            .as_deref()
            .ok_or_else(|| FhevmError::SigningRejected("no signer provided".to_string()))?;

        let _guard = InFlight::start(&self.in_flight);
        let result = client.user_decrypt(requests, signer).await?;
        self.store(&result);
        Ok(result)
    }

    pub async fn public_decrypt(&self, handles: &[String]) -> Result<DecryptResult> {
        let client = self.client()?;

        let _guard = InFlight::start(&self.in_flight);
        let result = client.public_decrypt(handles).await?;
        self.store(&result);
        Ok(result)
    }
}
