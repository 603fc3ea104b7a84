//! Motus Common Library
//!
//! Shared vocabulary for the motus controller workspace. Everything the
//! controller core talks to through a narrow capability lives here, so the
//! core never depends on a concrete backend.
//!
//! # Module Structure
//!
//! - [`hal`] - Joint state, joint handles and the resource directory capability
//! - [`device`] - Control-law device capability
//! - [`script`] - Scripting interpreter capability and result tokens
//! - [`params`] - Parameter source (untyped configuration tree)
//! - [`lifecycle`] - Controller lifecycle phases
//! - [`config`] - Configuration loading traits and types
//! - [`consts`] - Workspace-wide constants
//! - [`prelude`] - Common re-exports for convenience
//!
//! # Usage
//!
//! ```toml
//! [dependencies]
//! motus_common = { path = "../motus_common" }
//! ```
//!
//! ```rust
//! use motus_common::prelude::*;
//! ```

pub mod config;
pub mod consts;
pub mod device;
pub mod hal;
pub mod lifecycle;
pub mod params;
pub mod prelude;
pub mod script;
