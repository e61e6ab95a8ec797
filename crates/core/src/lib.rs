#![warn(clippy::all, missing_docs)]

//! Core domain logic for the mixed-reality real-estate showcase.
//!
//! This crate hosts the domain models, the seeded mock ledger,
//! compliance rules, input-target resolution, selection coordination,
//! and the investment flow used by the terminal UI and any future
//! frontends.

pub mod compliance;
pub mod config;
pub mod invest;
pub mod ledger;
pub mod models;
pub mod scene;
pub mod selection;

pub use config::AppConfig;
pub use invest::{FlowPhase, InvestFlow, InvestOutcome};
pub use ledger::{LedgerError, LedgerService, MonitorEvent, NetworkMonitor};
pub use models::{Investor, NetworkStatus, Property, Transaction};
pub use scene::{InputEvent, InputKind, NodeId, SceneGraph};
pub use selection::{Highlighter, PanelMode, PanelSink, SelectionCoordinator};
