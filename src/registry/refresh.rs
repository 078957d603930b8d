//! Live catalog refreshes.
//!
//! At most one refresh runs per registry. Callers arriving while one is in
//! flight await the same shared future instead of starting another. The
//! refresh itself runs on a spawned task and always completes, even if every
//! caller waiting on it is dropped.

use futures_util::future::{self, BoxFuture, FutureExt, Shared};
use parking_lot::Mutex;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

use super::catalog::{Capabilities, Catalog, Registration};
use super::directory::ProviderDirectory;
use crate::providers::providers::ProviderKey;
use crate::providers::{Error as ProviderError, ErrorKind, LiveModel};

/// Minimum time between two refreshes that are not forced.
pub(crate) const MIN_REFRESH_INTERVAL: Duration = Duration::from_secs(5 * 60);

/// What a single provider's fetch produced during a refresh.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub(crate) enum FetchOutcome {
    /// The listing succeeded. Zero models leaves the provider's previous
    /// entries in place.
    Listed { models: usize },
    /// No credential is configured; no request was made.
    MissingCredential,
    /// The fetch failed; the provider's previous entries are kept.
    Failed { reason: String },
}

impl fmt::Display for FetchOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchOutcome::Listed { models: 0 } => write!(f, "empty listing, kept previous entries"),
            FetchOutcome::Listed { models } => write!(f, "listed {} models", models),
            FetchOutcome::MissingCredential => write!(f, "skipped, no API key"),
            FetchOutcome::Failed { reason } => write!(f, "failed: {}", reason),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub(crate) struct ProviderRefresh {
    pub provider: ProviderKey,
    #[serde(flatten)]
    pub outcome: FetchOutcome,
}

#[derive(Debug, Clone, Default, Serialize)]
pub(crate) struct RefreshReport {
    pub providers: Vec<ProviderRefresh>,
}

impl RefreshReport {
    #[cfg(test)]
    pub(crate) fn outcome(&self, provider: &ProviderKey) -> Option<&FetchOutcome> {
        self.providers
            .iter()
            .find(|p| p.provider == *provider)
            .map(|p| &p.outcome)
    }
}

#[derive(Debug, Clone)]
pub(crate) enum RefreshOutcome {
    /// The last refresh is recent enough; nothing was fetched.
    Throttled,
    /// A refresh ran, either started by this caller or joined in flight.
    Refreshed(Arc<RefreshReport>),
}

type InFlight = Shared<BoxFuture<'static, Arc<RefreshReport>>>;

#[derive(Default)]
struct RefreshState {
    last_success: Option<Instant>,
    in_flight: Option<InFlight>,
}

pub(crate) struct RefreshCoordinator {
    state: Arc<Mutex<RefreshState>>,
    interval: Duration,
}

impl RefreshCoordinator {
    pub(crate) fn new() -> RefreshCoordinator {
        RefreshCoordinator {
            state: Arc::new(Mutex::new(RefreshState::default())),
            interval: MIN_REFRESH_INTERVAL,
        }
    }

    #[cfg(test)]
    pub(crate) fn last_success(&self) -> Option<Instant> {
        self.state.lock().last_success
    }

    pub(crate) async fn refresh(
        &self,
        force: bool,
        directory: &Arc<ProviderDirectory>,
        catalog: &Arc<Catalog>,
    ) -> RefreshOutcome {
        let flight = {
            let mut state = self.state.lock();

            let fresh = state
                .last_success
                .is_some_and(|at| at.elapsed() < self.interval);

            if !force && fresh {
                return RefreshOutcome::Throttled;
            }

            match &state.in_flight {
                Some(flight) => flight.clone(),
                None => {
                    let flight = self.start(directory.clone(), catalog.clone());
                    state.in_flight = Some(flight.clone());
                    flight
                }
            }
        };

        RefreshOutcome::Refreshed(flight.await)
    }

    // Called with the state lock held; the spawned task takes the same lock
    // to finish, so it cannot clear the slot before it is filled.
    fn start(&self, directory: Arc<ProviderDirectory>, catalog: Arc<Catalog>) -> InFlight {
        let state = self.state.clone();

        let task = tokio::spawn(async move {
            let report = run_refresh(&directory, &catalog).await;

            {
                let mut state = state.lock();
                state.last_success = Some(Instant::now());
                state.in_flight = None;
            }

            report
        });

        let state = self.state.clone();

        async move {
            match task.await {
                Ok(report) => Arc::new(report),
                Err(err) => {
                    tracing::error!(error = %err, "model refresh task failed");
                    state.lock().in_flight = None;
                    Arc::new(RefreshReport::default())
                }
            }
        }
        .boxed()
        .shared()
    }
}

async fn run_refresh(directory: &ProviderDirectory, catalog: &Catalog) -> RefreshReport {
    let started = Instant::now();

    let fetches = directory.live_providers().into_iter().map(|provider| async move {
        let key = provider.key();

        let result = if directory.has_credential(&key) {
            provider.fetch_live_models().await
        } else {
            Err(ProviderError::from_kind(ErrorKind::MissingCredential))
        };

        (provider, result)
    });

    let results: Vec<(_, Result<Vec<LiveModel>, ProviderError>)> = future::join_all(fetches).await;

    let mut report = RefreshReport::default();

    for (provider, result) in results {
        let key = provider.key();

        let outcome = match result {
            Ok(models) if models.is_empty() => {
                tracing::info!(provider = %key, "provider listed no models, keeping previous entries");
                FetchOutcome::Listed { models: 0 }
            }
            Ok(models) => {
                let registrations = models
                    .into_iter()
                    .map(|model| Registration {
                        handle: provider.build_handle(&model.id),
                        model: model.id,
                        capabilities: Capabilities::with_display_name(model.display_name),
                    })
                    .collect();

                let added = catalog.replace_provider(&key, registrations);

                FetchOutcome::Listed { models: added }
            }
            Err(err) if err.kind() == ErrorKind::MissingCredential => {
                tracing::debug!(provider = %key, "no credential, skipping live listing");
                FetchOutcome::MissingCredential
            }
            Err(err) => {
                tracing::warn!(provider = %key, error = %err, "failed to list live models");
                FetchOutcome::Failed {
                    reason: err.to_string(),
                }
            }
        };

        report.providers.push(ProviderRefresh {
            provider: key,
            outcome,
        });
    }

    tracing::debug!(
        elapsed_ms = started.elapsed().as_millis() as u64,
        providers = report.providers.len(),
        entries = catalog.len(),
        "model refresh finished"
    );

    report
}
