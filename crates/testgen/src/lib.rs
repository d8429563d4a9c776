//! Random workload generation for isolation-level allocation.

pub mod generator;
