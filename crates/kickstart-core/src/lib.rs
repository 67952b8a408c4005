//! Kickstart Core - Hexagonal Architecture Implementation
//!
//! This crate provides the domain and application layers for the Kickstart
//! bootstrap runtime, following hexagonal (ports and adapters) architecture.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │          kickstart-cli (CLI)            │
//! │     (Implements Driving Ports)          │
//! └──────────────────┬──────────────────────┘
//!                    │ calls
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │         Application Services            │
//! │ (ScriptOrchestrator, ConfigStore, ...)  │
//! └──────────────────┬──────────────────────┘
//!                    │ uses
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │      Application Ports (Traits)         │
//! │ (Filesystem, ToolProbe, CommandRunner)  │
//! └──────────────────┬──────────────────────┘
//!                    │ implemented by
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │    kickstart-adapters (Infrastructure)  │
//! └─────────────────────────────────────────┘
//!                    │
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │         Domain Layer (Pure Logic)       │
//! │ (ScriptManifest, reconcile, plan order) │
//! └─────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use kickstart_core::prelude::*;
//!
//! let orchestrator = ScriptOrchestrator::new(store, fs, probe, runner, renderer, clock);
//! let plan = orchestrator.plan(&[], &[])?;
//! let summary = orchestrator.run(root, &plan, &config)?;
//! ```

pub mod domain;

pub mod application;

pub mod error;

// Public API - what external crates should use
pub mod prelude {
    pub use crate::application::{
        ConfigStore, RunFailure, RunSummary, ScriptOrchestrator,
        ports::{
            Clock, CommandRunner, ConfigStorage, Filesystem, ScriptStore, TemplateRenderer,
            ToolProbe,
        },
    };
    pub use crate::domain::{
        AnswersOverride, ConfigKey, ExecutionPlan, ExecutionReport, RenderContext,
        ScriptDefinition, ScriptManifest,
    };
    pub use crate::error::{KickstartError, KickstartResult};
}

// Version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
