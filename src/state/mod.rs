/// State management module
///
/// This module handles all gallery state, including:
/// - Shared data structures (data.rs)
/// - Key-value backends (store.rs)
/// - The typed repository over a backend (library.rs)
/// - Manifest loading and folder scanning (catalog.rs)
/// - The view controller (view.rs)

pub mod catalog;
pub mod data;
pub mod library;
pub mod store;
pub mod view;
