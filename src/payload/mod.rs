// src/payload/mod.rs

//! Getting the payload onto disk in a runnable state.
//!
//! - [`materialize`] copies the bundled asset into the writable store.
//! - [`permissions`] marks the copy executable and decides what to do when
//!   that fails.

pub mod materialize;
pub mod permissions;

pub use materialize::{CHUNK_SIZE, Materialized, copy_chunked, materialize_payload};
pub use permissions::{PermissionPolicy, grant_executable};
