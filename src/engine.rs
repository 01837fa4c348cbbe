//! Analytics engine facade.
//!
//! Wires the pure components to a host-supplied [`RecordStore`]:
//! recording a session initializes its review state, completing or
//! graduating a review loads, transitions, and saves the record, and the
//! dashboard queries read through the store. Every time-dependent call takes
//! `now` explicitly.

use chrono::{DateTime, NaiveDate, Utc};
use tracing::{debug, info};

use crate::config::EngineConfig;
use crate::error::{EngineError, EngineResult};
use crate::predictor::{analyze_space, PerformancePredictor, SpaceReport};
use crate::queue::{forgetting_archive, partition_records, ArchiveEntry, ReviewQueue};
use crate::scheduler::ReviewScheduler;
use crate::stats::{self, DaySummary, SubjectOverview, SubjectPlan, VolumeSince};
use crate::store::RecordStore;
use crate::types::{
    PredictionInputs, PredictionResult, ReviewState, SessionRecord, Stats, TestObservation,
};

pub struct AnalyticsEngine<S: RecordStore> {
    config: EngineConfig,
    scheduler: ReviewScheduler,
    predictor: PerformancePredictor,
    store: S,
}

impl<S: RecordStore> AnalyticsEngine<S> {
    pub fn new(config: EngineConfig, store: S) -> Self {
        let config = config.normalized();
        Self {
            scheduler: ReviewScheduler::from_config(&config),
            predictor: PerformancePredictor::from_config(&config),
            config,
            store,
        }
    }

    pub fn with_store(store: S) -> Self {
        Self::new(EngineConfig::default(), store)
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    pub fn scheduler(&self) -> &ReviewScheduler {
        &self.scheduler
    }

    pub fn predictor(&self) -> &PerformancePredictor {
        &self.predictor
    }

    // ========== Sessions ==========

    /// Append a new session with a freshly initialized review state
    pub fn record_session(
        &mut self,
        subject_id: &str,
        quantity: f64,
        duration_minutes: f64,
        observed_at: DateTime<Utc>,
    ) -> EngineResult<SessionRecord> {
        let review = self.scheduler.initialize(observed_at);
        let record = SessionRecord::new(subject_id, quantity, duration_minutes, observed_at, review);
        self.store.save(&record)?;

        debug!(
            session_id = %record.id,
            subject_id = %subject_id,
            next_due_at = %record.review.next_due_at,
            "Session recorded"
        );
        Ok(record)
    }

    fn load_session(&self, session_id: &str) -> EngineResult<SessionRecord> {
        self.store
            .load(session_id)?
            .ok_or_else(|| EngineError::SessionNotFound(session_id.to_string()))
    }

    fn transition<F>(&mut self, session_id: &str, apply: F) -> EngineResult<ReviewState>
    where
        F: FnOnce(&ReviewScheduler, ReviewState) -> ReviewState,
    {
        let mut record = self.load_session(session_id)?;
        let next = apply(&self.scheduler, record.review);
        if next != record.review {
            record.review = next;
            self.store.save(&record)?;
        }
        Ok(next)
    }

    /// Mark the pending review of a session as done
    pub fn complete_review(
        &mut self,
        session_id: &str,
        now: DateTime<Utc>,
    ) -> EngineResult<ReviewState> {
        let state = self.transition(session_id, |scheduler, state| scheduler.complete(state, now))?;
        debug!(session_id = %session_id, step = state.step, "Review completed");
        Ok(state)
    }

    /// Permanently retire a session from review scheduling
    pub fn graduate_session(&mut self, session_id: &str) -> EngineResult<ReviewState> {
        let state = self.transition(session_id, |scheduler, state| scheduler.graduate(state))?;
        info!(session_id = %session_id, step = state.step, "Session graduated");
        Ok(state)
    }

    // ========== Dashboards ==========

    pub fn subject_stats(&self, subject_id: &str, remaining_quantity: f64) -> EngineResult<Stats> {
        let records = self.store.load_by_subject(subject_id)?;
        Ok(stats::aggregate_records(&records, remaining_quantity))
    }

    pub fn subject_overview(
        &self,
        subject_id: &str,
        plan: &SubjectPlan,
        now: DateTime<Utc>,
    ) -> EngineResult<SubjectOverview> {
        let records = self.store.load_by_subject(subject_id)?;
        Ok(stats::subject_overview(&records, plan, now))
    }

    pub fn day_summary(&self, day: NaiveDate) -> EngineResult<DaySummary> {
        let records = self.store.load_all()?;
        Ok(stats::day_summary(&records, day))
    }

    /// Volume and hours studied for a subject since the given observation time
    pub fn volume_since(
        &self,
        subject_id: &str,
        since: Option<DateTime<Utc>>,
    ) -> EngineResult<VolumeSince> {
        let records = self.store.load_by_subject(subject_id)?;
        Ok(stats::volume_since(&records, subject_id, since))
    }

    // ========== Predictions ==========

    pub fn predict(&self, inputs: &PredictionInputs) -> PredictionResult {
        self.predictor.predict(inputs)
    }

    pub fn analyze_space(&self, observations: &[TestObservation], h3: f64) -> SpaceReport {
        analyze_space(&self.predictor, observations, h3)
    }

    // ========== Review Queue ==========

    pub fn review_queue(&self, now: DateTime<Utc>) -> EngineResult<ReviewQueue<String>> {
        let records = self.store.load_all()?;
        Ok(partition_records(&records, now))
    }

    pub fn forgetting_archive(
        &self,
        now: DateTime<Utc>,
        limit: usize,
    ) -> EngineResult<Vec<ArchiveEntry>> {
        let records = self.store.load_all()?;
        Ok(forgetting_archive(&records, now, limit))
    }
}
