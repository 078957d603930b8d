//! In-process providers for registry tests.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use crate::providers::providers::ProviderKey;
use crate::providers::{Auth, Endpoint, Error, ErrorKind, LiveModel, ModelHandle, Provider};

pub(crate) struct FakeProvider {
    key: ProviderKey,
    credential: bool,
    live: bool,
    delay: Duration,
    listing: Mutex<Result<Vec<LiveModel>, ErrorKind>>,
    fetches: AtomicUsize,
    endpoint: Endpoint,
}

impl FakeProvider {
    pub(crate) fn new(key: &str) -> FakeProvider {
        FakeProvider {
            key: key.into(),
            credential: true,
            live: true,
            delay: Duration::ZERO,
            listing: Mutex::new(Ok(Vec::new())),
            fetches: AtomicUsize::new(0),
            endpoint: Endpoint::new(&format!("http://{}.invalid/v1", key), Auth::None).unwrap(),
        }
    }

    pub(crate) fn with_models(self, models: &[&str]) -> FakeProvider {
        self.set_models(models);
        self
    }

    pub(crate) fn with_listing(self, models: Vec<LiveModel>) -> FakeProvider {
        *self.listing.lock() = Ok(models);
        self
    }

    pub(crate) fn with_delay(mut self, delay: Duration) -> FakeProvider {
        self.delay = delay;
        self
    }

    pub(crate) fn without_credential(mut self) -> FakeProvider {
        self.credential = false;
        self
    }

    pub(crate) fn configured_only(mut self) -> FakeProvider {
        self.live = false;
        self
    }

    pub(crate) fn set_models(&self, models: &[&str]) {
        *self.listing.lock() = Ok(models.iter().map(|m| LiveModel::new(*m, None)).collect());
    }

    pub(crate) fn fail_with(&self, kind: ErrorKind) {
        *self.listing.lock() = Err(kind);
    }

    pub(crate) fn fetches(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Provider for FakeProvider {
    fn key(&self) -> ProviderKey {
        self.key.clone()
    }

    fn has_credential(&self) -> bool {
        self.credential
    }

    fn build_handle(&self, model: &str) -> Option<ModelHandle> {
        if model.is_empty() {
            return None;
        }

        Some(ModelHandle::new(self.key(), model, self.endpoint.clone()))
    }

    fn lists_live_models(&self) -> bool {
        self.live
    }

    async fn fetch_live_models(&self) -> Result<Vec<LiveModel>, Error> {
        self.fetches.fetch_add(1, Ordering::SeqCst);

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        self.listing.lock().clone().map_err(Error::from_kind)
    }
}
