//! Domain types for timinggate

pub mod bar;
pub mod signal;
pub mod table;

pub use bar::{BarError, PriceBar};
pub use signal::{DebugValue, Signal, SignalResult, WaitReason};
pub use table::{Column, PriceTable};
