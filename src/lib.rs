//! pdorchestra - ProjectDiscovery enumeration orchestrator
//!
//! Installs Go plus subfinder, httpx, urlfinder and nuclei, then runs
//! subfinder → httpx → urlfinder → nuclei for each domain, writing one
//! plain-text file per tool under `output/<domain>/`.

pub mod batch;
pub mod config;
pub mod environment;
pub mod error;
pub mod pipeline;
pub mod progress;
pub mod runner;
pub mod search_path;
pub mod tools;

pub use error::{Error, Result};
