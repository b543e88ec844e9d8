//! Modstamp: Content-Addressed Module Manifests and Update Stamps
//!
//! Maintains a per-module file manifest (`filelist.csv`), a per-module version
//! descriptor (`<module>.upd`), and a consolidated update index (`Updates.csv`)
//! for a tree of distributable module directories.

pub mod cli;
pub mod config;
pub mod digest;
pub mod error;
pub mod index;
pub mod logging;
pub mod manifest;
pub mod publish;
pub mod reconcile;
pub mod registry;
pub mod scan;
pub mod stamp;
pub mod status;
