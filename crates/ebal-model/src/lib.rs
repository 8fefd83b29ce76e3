//! # ebal-model: Energy-System Dispatch Models
//!
//! Builds small energy systems as typed graphs and dispatches them at
//! least cost with an LP solver.
//!
//! ## Design Philosophy
//!
//! Systems are modeled as **directed graphs** where:
//! - **Nodes**: Buses, Sources, Sinks, Transformers, Storages
//! - **Edges**: Flows with capacity, costs, and optional fixed profiles
//!
//! The LP formulation and solve are fully delegated to `good_lp`; this
//! crate only assembles variables and constraints from the graph and turns
//! the solution back into an [`ebal_core::FlowTable`]. Callers plot or
//! inspect the table without ever seeing the solver.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use chrono::{TimeZone, Utc};
//! use ebal_core::TimeIndex;
//! use ebal_model::{solve_dispatch, EnergySystem, FlowSpec};
//!
//! let mut system = EnergySystem::new();
//! system.add_bus("bel")?;
//! system.add_source("wind")?;
//! system.add_sink("demand")?;
//! system.add_flow("wind", "bel", FlowSpec::new().with_nominal_value(10.0))?;
//! system.add_flow("bel", "demand", FlowSpec::new()
//!     .with_nominal_value(8.0)
//!     .with_profile(vec![1.0; 24]))?;
//!
//! let start = Utc.with_ymd_and_hms(2012, 1, 1, 0, 0, 0).unwrap();
//! let outcome = solve_dispatch(&system, &TimeIndex::hourly(start, 24))?;
//! println!("total costs: {:.2}", outcome.objective);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod dispatch;
pub mod error;
pub mod system;

pub use dispatch::{solve_dispatch, DispatchOutcome};
pub use error::{DispatchError, ModelError};
pub use system::{Capacity, EnergySystem, FlowSpec, Node, StorageSpec};
