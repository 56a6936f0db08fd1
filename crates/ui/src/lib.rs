#![deny(unsafe_code)]

//! Nexus desktop views built with GPUI and gpui-component.

/// Shell, global actions and orchestration of the core state.
pub mod app;
pub mod chat;
pub mod dashboard;
pub mod login;
pub mod navigation;
pub mod settings;
pub mod tasks;
