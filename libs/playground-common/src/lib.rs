//! Client side of the code playground: the execution client, the run
//! controller that drives a run from trigger to rendered output, and the
//! pieces around them (language registry, notifications, preferences).

pub mod client;
pub mod config;
pub mod controller;
pub mod editor;
pub mod error;
pub mod languages;
pub mod notify;
pub mod render;
pub mod selector;
pub mod storage;
pub mod theme;
pub mod types;

pub use client::{ExecutionClient, HttpExecutionClient};
pub use config::ClientConfig;
pub use controller::{RunController, RunOutcome, SkipReason};
pub use error::ClientError;
pub use types::{ExecutionRequest, ExecutionResult, RateLimitState, RunLifecycleState};
