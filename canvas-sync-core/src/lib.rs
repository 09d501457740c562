#![doc = "canvas-sync-core: core synchronization logic for canvas-sync."]

//! This crate contains the hierarchy model, the recursive traversal and all
//! supporting pipeline pieces for mirroring a Canvas course hierarchy into a
//! local folder. CLI glue (argument parsing, config file loading, secret
//! injection) lives in the `canvas-sync` binary crate.
//!
//! # Usage
//! Construct a [`hierarchy::Synchronizer`] from [`config::SyncSettings`] and
//! run it against any [`contract::CanvasApi`] implementation, either the real
//! [`api::InstructureClient`] or the generated mock in tests.

pub mod api;
pub mod config;
pub mod contract;
pub mod error;
pub mod hierarchy;
pub mod ledger;
pub mod naming;
pub mod report;
pub mod shortcut;
pub mod tree;
