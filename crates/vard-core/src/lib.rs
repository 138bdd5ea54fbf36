//! Pure helpers shared across the vard workspace: hashing, repository
//! identity derivation, and the display date formatter. No I/O.

pub mod datefmt;
pub mod hash;
pub mod identity;
