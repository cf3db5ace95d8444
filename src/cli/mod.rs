//! Support code for the lsnmpvs command-line tools.

pub mod args;
pub mod output;
