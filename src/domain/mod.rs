//! Ownership, binding and access rules for tags, modules and connections.
//!
//! Operations take the caller identity explicitly and run each mutation as
//! a single store transaction.

pub mod binder;
pub mod gate;
pub mod ledger;
pub mod registry;

#[cfg(test)]
mod testing;
