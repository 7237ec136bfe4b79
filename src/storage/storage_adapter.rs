//! Storage adapters.
//!
//! A storage adapter wraps a store (or another adapter) and exposes the same storage traits.

pub mod usage_log;

pub use usage_log::UsageLogStorageAdapter;
