// Startpage shared type definitions
// Each submodule defines types used across the application.

pub mod bookmark;
pub mod calendar;
pub mod errors;
pub mod icon;
pub mod identity;
pub mod item;
pub mod settings;
pub mod task;
