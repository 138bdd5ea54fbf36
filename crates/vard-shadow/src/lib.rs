//! Shadow-repository checkpoint engine.
//!
//! Commits the entire project working tree into a hidden git repository
//! bound to the project via `core.worktree`, and layers listing, restore,
//! rename, favorite, and retention semantics on top of that append-only
//! history. Soft deletes, renames, and favorites live in small overlay
//! files next to the shadow repository; commit history is never rewritten.

pub mod codec;
pub mod config;
pub mod engine;
pub mod error;
pub mod git;
pub mod ignore;
pub mod overlay;
pub mod paths;
pub mod repo;
pub mod retry;

pub use codec::Checkpoint;
pub use config::EngineConfig;
pub use engine::{CheckpointEngine, DiffFileInfo, DiffStatus, SnapshotOutcome};
pub use error::ShadowError;
