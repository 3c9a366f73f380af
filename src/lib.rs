//! cfsd panel - a terminal control panel for a chroot jail
//!
//! This library provides the jailed command factory and dispatcher, the
//! content renderers (plain text, markdown, images) and the message-driven
//! terminal UI that ties them together.

pub mod config;
pub mod render;
pub mod sandbox;
pub mod ui;
