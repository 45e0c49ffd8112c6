//! Fallback terminator for platforms without a generation probe.

use crate::domain::TerminationOutcome;
use crate::error::{Error, Result};

use super::Terminator;

/// Terminator that refuses every request.
pub struct UnsupportedTerminator;

impl UnsupportedTerminator {
    pub fn new() -> Self {
        Self
    }
}

impl Default for UnsupportedTerminator {
    fn default() -> Self {
        Self::new()
    }
}

impl Terminator for UnsupportedTerminator {
    async fn generation_of(&self, _pid: u32) -> Result<Option<u64>> {
        Err(Error::UnsupportedPlatform(format!(
            "no process generation probe for {}",
            std::env::consts::OS
        )))
    }

    async fn terminate(&self, _pid: u32, _generation: u64) -> Result<TerminationOutcome> {
        Err(Error::UnsupportedPlatform(format!(
            "generation-checked kill is not available on {}",
            std::env::consts::OS
        )))
    }
}
