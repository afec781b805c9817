use serde_json::Value;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{Mutex, RwLock};

use super::answer::{Answer, DataSource};
use super::errors::ControllerError;
use super::mode::{Mode, ModeConfig};
use crate::analytics::{
    analytics_summary, dashboard_overview, sales_report, AnalyticsResponse, DashboardResponse, SalesQuery,
    SalesReport, SummaryQuery,
};
use crate::calendar::Calendar;
use crate::domain::{CatalogItem, Entity, Order, ValidationError};
use crate::metrics::Metrics;
use crate::query::{run_query, ListQuery, Page};
use crate::remote::{require_keys, RemoteBackend, RemoteOutcome, RemoteRequest};
use crate::store::{Collection, EntityStore};

// ============================================================================
// Data Controller - one entry point, two paths
// ============================================================================
//
// Remote mode: one remote attempt per call. Any failure (transport, status,
// malformed or incomplete body) is logged, counted and answered locally.
// Local mode: the remote backend is never called.
//
// The store lock is only taken on the local path, after the remote attempt
// has resolved, so it is never held across a network await.
//
// ============================================================================

const DASHBOARD_KEYS: &[&str] = &["overview", "recentOrders"];
const SALES_KEYS: &[&str] = &["salesData"];
const ANALYTICS_KEYS: &[&str] = &[
    "summary",
    "trends",
    "topProducts",
    "paymentDistribution",
    "statusDistribution",
];
const ENTITY_KEYS: &[&str] = &["_id"];
const DELETE_KEYS: &[&str] = &["message"];

pub struct DataController {
    store: Arc<Mutex<EntityStore>>,
    remote: Option<Arc<dyn RemoteBackend>>,
    modes: RwLock<ModeConfig>,
    calendar: Calendar,
    metrics: Arc<Metrics>,
}

impl DataController {
    /// Resolve the mode (override > persisted preference > local) and take
    /// ownership of the store
    pub fn new(
        store: EntityStore,
        remote: Option<Arc<dyn RemoteBackend>>,
        override_mode: Option<Mode>,
        calendar: Calendar,
        metrics: Arc<Metrics>,
    ) -> Result<Self, ControllerError> {
        let preferred = match store.load_mode_flag()? {
            Some(flag) => match flag.parse::<Mode>() {
                Ok(mode) => Some(mode),
                Err(reason) => {
                    tracing::warn!(flag = %flag, reason = %reason, "Ignoring unreadable persisted mode flag");
                    None
                }
            },
            None => None,
        };

        let modes = ModeConfig {
            override_mode,
            preferred,
            remote_configured: remote.is_some(),
        };
        if modes.requested() == Mode::Remote && !modes.remote_configured {
            tracing::warn!("Remote mode requested but no remote base URL is configured; running local-only");
        }

        metrics.set_data_mode(modes.effective() == Mode::Remote);
        tracing::info!(
            mode = %modes.effective(),
            override_active = modes.override_mode.is_some(),
            "Data controller ready"
        );

        Ok(Self {
            store: Arc::new(Mutex::new(store.with_calendar(calendar))),
            remote,
            modes: RwLock::new(modes),
            calendar,
            metrics,
        })
    }

    pub async fn mode(&self) -> ModeConfig {
        *self.modes.read().await
    }

    /// Persist the preference. Takes effect at once unless an override is set.
    pub async fn set_preferred_mode(&self, mode: Mode) -> Result<ModeConfig, ControllerError> {
        self.store.lock().await.save_mode_flag(mode.as_str())?;

        let mut modes = self.modes.write().await;
        modes.preferred = Some(mode);

        if modes.override_mode.is_some() {
            tracing::info!(preferred = %mode, effective = %modes.effective(), "Mode preference saved; override still applies");
        } else if modes.effective() != mode {
            tracing::warn!(preferred = %mode, "Remote mode preferred but no remote base URL is configured");
        } else {
            tracing::info!(mode = %mode, "Data mode changed");
        }

        self.metrics.set_data_mode(modes.effective() == Mode::Remote);
        Ok(*modes)
    }

    pub fn metrics(&self) -> &Arc<Metrics> {
        &self.metrics
    }

    // ========================================================================
    // Entities
    // ========================================================================

    pub async fn list<E: Collection>(&self, query: &ListQuery) -> Result<Answer<Page<E>>, ControllerError> {
        let collection = E::KIND.collection_name();
        let request = RemoteRequest::get(collection).query(query.to_pairs());

        self.answer(&format!("{collection}.list"), request, &[collection, "pagination"], |store| {
            Ok(run_query(store.all::<E>(), query, &self.calendar))
        })
        .await
    }

    pub async fn get<E: Collection>(&self, id: &str) -> Result<Answer<E>, ControllerError> {
        let collection = E::KIND.collection_name();
        let request = RemoteRequest::get(collection).segment(id);

        self.answer(&format!("{collection}.get"), request, ENTITY_KEYS, |store| {
            store.get::<E>(id).ok_or_else(|| ControllerError::NotFound {
                kind: E::KIND,
                id: id.to_string(),
            })
        })
        .await
    }

    pub async fn create<E: Collection>(&self, body: Value) -> Result<Answer<E>, ControllerError> {
        let collection = E::KIND.collection_name();
        let request = RemoteRequest::post(collection, body.clone());

        self.answer(&format!("{collection}.create"), request, ENTITY_KEYS, |store| {
            let entity = store.create::<E>(parse_patch::<E>(body)?)?;
            self.metrics.record_store_write(collection, "create");
            tracing::info!(kind = %E::KIND, id = %entity.id(), "Created entity in local store");
            Ok(entity)
        })
        .await
    }

    /// Upsert: a missing id is created
    pub async fn update<E: Collection>(&self, id: &str, body: Value) -> Result<Answer<E>, ControllerError> {
        let collection = E::KIND.collection_name();
        let request = RemoteRequest::put(collection, body.clone()).segment(id);

        self.answer(&format!("{collection}.update"), request, ENTITY_KEYS, |store| {
            let entity = store.update::<E>(id, parse_patch::<E>(body)?)?;
            self.metrics.record_store_write(collection, "update");
            tracing::info!(kind = %E::KIND, id = %id, "Updated entity in local store");
            Ok(entity)
        })
        .await
    }

    /// `Local(false)` when nothing had that id
    pub async fn delete<E: Collection>(&self, id: &str) -> Result<Answer<bool>, ControllerError> {
        let collection = E::KIND.collection_name();
        let request = RemoteRequest::delete(collection).segment(id);

        self.answer(&format!("{collection}.delete"), request, DELETE_KEYS, |store| {
            let deleted = store.delete::<E>(id)?;
            if deleted {
                self.metrics.record_store_write(collection, "delete");
                tracing::info!(kind = %E::KIND, id = %id, "Deleted entity from local store");
            }
            Ok(deleted)
        })
        .await
    }

    // ========================================================================
    // Analytics
    // ========================================================================

    pub async fn dashboard(&self) -> Result<Answer<DashboardResponse>, ControllerError> {
        let request = RemoteRequest::get("/analytics/dashboard");

        self.answer("analytics.dashboard", request, DASHBOARD_KEYS, |store| {
            Ok(dashboard_overview(
                store.all::<Order>(),
                store.all::<CatalogItem>(),
                &self.calendar,
                store.now(),
            ))
        })
        .await
    }

    pub async fn sales(&self, query: &SalesQuery) -> Result<Answer<SalesReport>, ControllerError> {
        let request = RemoteRequest::get("/analytics/sales").query(query.to_pairs());

        self.answer("analytics.sales", request, SALES_KEYS, |store| {
            Ok(sales_report(store.all::<Order>(), query, &self.calendar, store.now()))
        })
        .await
    }

    pub async fn analytics(&self, query: &SummaryQuery) -> Result<Answer<AnalyticsResponse>, ControllerError> {
        let request = RemoteRequest::get("/analytics").query(query.to_pairs());

        self.answer("analytics.summary", request, ANALYTICS_KEYS, |store| {
            Ok(analytics_summary(
                store.all::<Order>(),
                store.all::<CatalogItem>(),
                query,
                &self.calendar,
                store.now(),
            ))
        })
        .await
    }

    // ========================================================================
    // Path selection
    // ========================================================================

    async fn answer<T, F>(
        &self,
        endpoint: &str,
        request: RemoteRequest,
        required: &[&str],
        local: F,
    ) -> Result<Answer<T>, ControllerError>
    where
        F: FnOnce(&mut EntityStore) -> Result<T, ControllerError>,
    {
        if let Some(body) = self.attempt_remote(endpoint, request, required).await {
            return Ok(Answer::Remote(body));
        }

        let started = Instant::now();
        let result = {
            let mut store = self.store.lock().await;
            local(&mut *store)
        };

        self.metrics.record_local_query(endpoint);
        self.metrics
            .record_query_duration(endpoint, DataSource::Local.as_str(), started.elapsed().as_secs_f64());

        if let Err(e) = &result {
            match e {
                ControllerError::NotFound { .. } => tracing::debug!(endpoint = %endpoint, "{}", e),
                e if e.is_invalid_input() => tracing::debug!(endpoint = %endpoint, error = %e, "Rejected input"),
                e => tracing::error!(endpoint = %endpoint, error = %e, "Local path failed"),
            }
        }

        result.map(Answer::Local)
    }

    /// `Some(body)` only when remote mode is effective and the single attempt
    /// produced a body carrying every required key
    async fn attempt_remote(&self, endpoint: &str, request: RemoteRequest, required: &[&str]) -> Option<Value> {
        let mode = self.modes.read().await.effective();
        let remote = match (mode, &self.remote) {
            (Mode::Remote, Some(remote)) => remote,
            _ => return None,
        };

        let started = Instant::now();
        let outcome = remote
            .send(request)
            .await
            .and_then(|body| require_keys(body, required));

        match outcome {
            RemoteOutcome::Success(body) => {
                self.metrics.record_remote_attempt(endpoint, true);
                self.metrics
                    .record_query_duration(endpoint, DataSource::Remote.as_str(), started.elapsed().as_secs_f64());
                tracing::debug!(endpoint = %endpoint, "Answered from remote backend");
                Some(body)
            }
            RemoteOutcome::Failure(failure) => {
                self.metrics.record_remote_attempt(endpoint, false);
                self.metrics.record_fallback(endpoint, failure.reason_label());
                tracing::warn!(
                    endpoint = %endpoint,
                    reason = failure.reason_label(),
                    error = %failure,
                    "Remote attempt failed, falling back to local store"
                );
                None
            }
        }
    }
}

fn parse_patch<E: Entity>(body: Value) -> Result<E::Patch, ValidationError> {
    serde_json::from_value(body).map_err(|e| ValidationError::malformed(E::KIND, e))
}
