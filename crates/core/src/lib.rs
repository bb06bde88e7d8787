//! Domain core for the freelance marketplace job completion workflow.
//!
//! - [`completion`]: completion records, status transitions, validation.
//! - [`credentials`]: client credential lookup and job ownership.
//! - [`store`]: the in-memory completion registry.
//! - [`latency`]: injectable, cancellation-aware simulated latency.
//! - [`service`]: [`CompletionService`], the workflow entry point.

pub mod completion;
pub mod credentials;
pub mod error;
pub mod latency;
pub mod service;
pub mod store;
pub mod types;

pub use service::CompletionService;
