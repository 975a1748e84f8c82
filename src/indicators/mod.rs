// Technical indicators module
pub mod rsi;

pub use rsi::wilder_rsi;
