//! Data models for upstream API entities.
//!
//! Optional fields use `#[serde(default)]` so partial upstream payloads still parse.

mod project;

pub use project::{Project, Projects};
