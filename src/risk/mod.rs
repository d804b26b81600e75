//! Market-risk snapshots and the sources that produce them.

pub mod error;
pub mod http;
pub mod jitter;
pub mod mock;
pub mod retry;
pub mod service;
pub mod snapshot;
pub mod source;

pub use error::{RiskError, RiskResult};
pub use http::HttpRiskSource;
pub use jitter::{compose_score, FixedJitter, Jitter, SeededJitter, UniformJitter};
pub use mock::MockRiskSource;
pub use retry::RetryConfig;
pub use service::RiskService;
pub use snapshot::{RiskCategory, RiskSnapshot, VolatilityRegime};
pub use source::{FallbackSource, RiskDataSource, RiskSourceKind};
