//! Analysis service boundary.
//!
//! This crate provides:
//! - The [`AnalysisService`] trait the orchestrator and HTTP endpoint talk to
//! - Pluggable [`ScoringStrategy`] implementations (currently the mock scorer)
//! - Injectable [`DelayProvider`]s so simulated latency can be disabled in tests
//! - [`LocalAnalysisService`] for in-process analysis
//! - [`HttpAnalysisClient`] for a remote analysis endpoint (multipart upload)

pub mod client;
pub mod delay;
pub mod error;
pub mod local;
pub mod request;
pub mod scoring;
pub mod service;

pub use client::{HttpAnalysisClient, ANALYZE_VIDEO_PATH};
pub use delay::{DelayBounds, DelayProvider, FixedDelay, RandomDelay, VirtualDelay};
pub use error::{ServiceError, ServiceResult};
pub use local::LocalAnalysisService;
pub use request::{AnalysisInput, AnalysisRequest, UploadedVideo};
pub use scoring::{build_strategy, MockScoringStrategy, ScoringStrategy, StrategyKind};
pub use service::AnalysisService;
