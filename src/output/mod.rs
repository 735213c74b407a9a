#![forbid(unsafe_code)]

pub mod chart;
pub mod table;
