//! nodetree: a composite structure of leaf and container nodes.
//!
//! Entities are addressed by a code and carry a renderer identifier.
//! A [`domain::Structure`] holds root entities and answers lookups and
//! counts across every nested level.
//!
//! Layers:
//! - `domain`: entities, structure, errors (no I/O)
//! - `application`: building structures from TOML definitions
//! - `config`: layered settings
//! - `cli`: argument parsing and command dispatch

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod util;
