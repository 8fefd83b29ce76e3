//! # ebal-core: Bus-Balance Results Model
//!
//! Provides the normalized in-memory form of energy-system optimization
//! results and the operations that prepare them for plotting.
//!
//! ## Design Philosophy
//!
//! An optimization run (whatever solver produced it) is reduced to a
//! [`FlowTable`]: one time-indexed sequence per directed flow between two
//! labeled nodes, plus optional scalar summaries. Everything downstream is a
//! pure derivation:
//!
//! - [`partition`] splits the table into the in- and outflows of one bus
//!   ([`BalanceView`]): complete, disjoint, in first-seen order
//! - [`slice`] restricts a table to a [`TimeWindow`], clipping out-of-range
//!   bounds instead of failing
//!
//! There is no global registry and no hidden state: every operation takes
//! its inputs as arguments and returns a freshly built value.
//!
//! ## Quick Start
//!
//! ```rust
//! use chrono::{TimeZone, Utc};
//! use ebal_core::{partition, FlowKey, FlowSeries, FlowTable, TimeIndex};
//!
//! let start = Utc.with_ymd_and_hms(2012, 1, 1, 0, 0, 0).unwrap();
//! let mut table = FlowTable::new(TimeIndex::hourly(start, 3));
//! table.insert(FlowSeries::new(FlowKey::new("wind", "bel"), vec![1.0, 2.0, 3.0]))?;
//! table.insert(FlowSeries::new(FlowKey::new("bel", "demand"), vec![1.0, 2.0, 3.0]))?;
//!
//! let view = partition(&table, &"bel".into())?;
//! assert_eq!(view.inflows.len(), 1);
//! assert_eq!(view.outflows.len(), 1);
//! # Ok::<(), ebal_core::BalanceError>(())
//! ```
//!
//! ## Invariants
//!
//! - A table's time index is strictly increasing and shared by all series
//! - `inflows ∩ outflows = ∅`, and their union is every key touching the bus
//! - A flow with source == target == bus is rejected as corrupt input

pub mod balance;
pub mod error;
pub mod table;
pub mod window;

pub use balance::{partition, BalanceView};
pub use error::{BalanceError, CoreResult};
pub use table::{FlowKey, FlowSeries, FlowTable, NodeLabel, ScalarKey, TimeIndex};
pub use window::{slice, TimeWindow};
