/// State management module
///
/// This module handles all application state, including:
/// - The artwork table and its connection (store.rs)
/// - Shared data structures (data.rs)
/// - Store error taxonomy (error.rs)
/// - Gallery browsing: selection, zoom and list-view sync (gallery.rs)

pub mod data;
pub mod error;
pub mod gallery;
pub mod store;
