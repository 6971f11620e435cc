//! Configuration module for billmerge
//!
//! This module provides configuration management including:
//! - Settings directory resolution
//! - Pipeline file locations
//! - User settings persistence

pub mod paths;
pub mod settings;

pub use paths::{AppPaths, PipelinePaths};
pub use settings::{Settings, SourceFormat, Sources};
