//! Splitting policies and the share calculator.

pub mod calculator;
pub mod policy;
