//! Domain types for the EMA/ADX backtester

pub mod bar;
pub mod position;

pub use bar::Bar;
pub use position::Position;
