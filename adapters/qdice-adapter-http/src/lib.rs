//! qdice HTTP Engine Adapter
//!
//! This crate connects the view layer to the quantum dice service over its
//! JSON REST API. [`HttpEngine`] implements [`qdice_view::Engine`], so a
//! [`qdice_view::Session`] can drive it directly.
//!
//! # Configuration
//!
//! The service location comes from [`qdice_view::EngineConfig`]; the
//! `QDICE_ENGINE_URL` environment variable overrides it when the config is
//! loaded through [`qdice_view::ViewConfig::load`].
//!
//! # Example
//!
//! ```ignore
//! use qdice_adapter_http::HttpEngine;
//! use qdice_view::{Method, Session, ViewConfig};
//!
//! let config = ViewConfig::load(None)?;
//! let engine = HttpEngine::new(&config.engine)?;
//!
//! let mut session = Session::new(config);
//! session.set_params(6, Method::Rejection);
//! session.refresh(&engine).await;
//! session.roll_batch(&engine).await;
//! ```

pub mod api;
mod engine;
pub mod error;

pub use api::EngineClient;
pub use engine::{HttpEngine, combine};
pub use error::{HttpEngineError, HttpEngineResult};
