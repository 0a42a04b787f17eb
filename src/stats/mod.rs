//! Stats module - Derived metrics and summary reductions

mod calculator;

pub use calculator::{BalanceRow, GrowthRow, StatsCalculator, StatsError, TradeBalance};
