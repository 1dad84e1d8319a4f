//! Image gallery viewer: a manifest-driven catalog with persisted
//! descriptions, comments and rotations, plus the view controller and
//! view model the desktop shell renders.

pub mod config;
pub mod error;
pub mod state;
pub mod ui;
