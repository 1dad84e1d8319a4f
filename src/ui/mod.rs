/// User interface module
///
/// - View model built from the controller (gallery.rs)

pub mod gallery;
