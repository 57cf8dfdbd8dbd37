//! Lectern — login screen model with a persisted dark/light theme preference.
//!
//! ARCHITECTURE
//! ============
//! `prefs` owns durable key-value storage, `theme` bridges that storage to a
//! synchronously readable observable, and `screen` is the toolkit-free
//! presentation model that reads the observable and calls the theme setter.

pub mod config;
pub mod prefs;
pub mod screen;
pub mod theme;
