//! Configuration module for the App Link resolver
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! Every key is optional; a missing file section falls back to the defaults.
//!
//! # Example
//!
//! ```no_run
//! use applink_resolver::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("applink.toml")).unwrap();
//! println!("Following at most {} redirects", config.resolver.max_redirects);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, ResolverConfig, TransportConfig};

// Re-export parser functions
pub use parser::{load_config, parse_config};
