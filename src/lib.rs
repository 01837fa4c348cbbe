//! # studywise-algo - 学习分析核心算法库
//!
//! Pure Rust analytics behind a personal study tracker:
//!
//! - **Pace Statistics** - mean / spread of minutes per unit, remaining-time estimate
//! - **Performance Predictor** - linear and cubic volume projections, arc-length effort index, mental burden
//! - **Spaced Review Scheduler** - graduated interval table with an absorbing "graduated" state
//! - **Review Queue** - due / upcoming partition ordered by next due time
//!
//! ## 设计理念
//!
//! - **纯函数** - every computation takes its inputs (including `now`) explicitly
//! - **不抛错** - degenerate numeric input yields zeroed "not computable" results
//! - **可持久化** - every output is a serde value object the host can store verbatim
//!
//! ## 模块结构
//!
//! - [`stats`] - pace statistics and planner helpers
//! - [`predictor`] - score-growth projections and effort curve integration
//! - [`scheduler`] - review state machine and retention estimate
//! - [`queue`] - due / upcoming partition and forgetting archive
//! - [`migrate`] - versioned persisted records, legacy normalization
//! - [`store`] - host storage seam
//! - [`engine`] - facade wiring the above to a store
//! - [`sanitize`] - numeric guards
//! - [`types`] - shared types and constants
//!
//! ## 使用示例
//!
//! ```rust
//! use chrono::{Duration, TimeZone, Utc};
//! use studywise_algo::{AnalyticsEngine, MemoryStore, PredictionInputs};
//!
//! let t0 = Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap();
//! let mut engine = AnalyticsEngine::with_store(MemoryStore::new());
//!
//! let session = engine.record_session("math", 12.0, 45.0, t0).unwrap();
//! let queue = engine.review_queue(t0 + Duration::hours(3)).unwrap();
//! assert_eq!(queue.due, vec![session.id.clone()]);
//!
//! let prediction = engine.predict(&PredictionInputs {
//!     h1: 50.0,
//!     h2: 10.0,
//!     h3: 10.0,
//!     b: 20.0,
//!     t_study: 5.0,
//!     t_test: 90.0,
//!     t_rec: 60.0,
//! });
//! assert!(prediction.computable);
//! ```

// ============================================================================
// 模块声明
// ============================================================================

pub mod config;
pub mod engine;
pub mod error;
pub mod logging;
pub mod migrate;
pub mod predictor;
pub mod queue;
pub mod sanitize;
pub mod scheduler;
pub mod stats;
pub mod store;
pub mod types;

// ============================================================================
// 重新导出
// ============================================================================

/// 重新导出所有公共类型
pub use types::*;

pub use config::EngineConfig;
pub use engine::AnalyticsEngine;
pub use error::{EngineError, EngineResult};

/// 重新导出统计模块
pub use stats::{aggregate, DaySummary, SubjectOverview, SubjectPlan, VolumeSince};

/// 重新导出预测模块
pub use predictor::{
    cubic_volume, density_coefficient, effort_index, linear_volume, mental_burden,
    PerformancePredictor, SpaceReport, SpaceSummary,
};

/// 重新导出复习调度
pub use scheduler::{interval_for_step, retention_percent, ReviewScheduler};

pub use queue::{partition, ArchiveEntry, ReviewQueue};

pub use migrate::{PersistedSessionRecord, CURRENT_RECORD_VERSION};

pub use store::{MemoryStore, RecordStore, StoreError, StoreResult};
