// # State Store Implementations
//
// This module provides the file-backed implementation of the StateStore trait.

pub mod file;

pub use file::FileStateStore;
