//! Process terminator adapters.
//!
//! Platform-specific implementations of generation-checked process kills.

#[cfg(any(target_os = "linux", target_os = "macos"))]
mod signal;

#[cfg(target_os = "linux")]
mod linux;

#[cfg(target_os = "macos")]
mod darwin;

#[cfg(not(any(target_os = "linux", target_os = "macos")))]
mod unsupported;

use crate::domain::TerminationOutcome;
use crate::error::Result;
use crate::ports::ProcessTerminatorPort;

/// The host terminator that uses platform-specific implementations.
pub struct SignalTerminator {
    #[cfg(target_os = "linux")]
    inner: linux::LinuxTerminator,

    #[cfg(target_os = "macos")]
    inner: darwin::DarwinTerminator,

    #[cfg(not(any(target_os = "linux", target_os = "macos")))]
    inner: unsupported::UnsupportedTerminator,
}

impl SignalTerminator {
    /// Create a new terminator for the current platform.
    pub fn new() -> Self {
        Self {
            #[cfg(target_os = "linux")]
            inner: linux::LinuxTerminator::new(),

            #[cfg(target_os = "macos")]
            inner: darwin::DarwinTerminator::new(),

            #[cfg(not(any(target_os = "linux", target_os = "macos")))]
            inner: unsupported::UnsupportedTerminator::new(),
        }
    }

    /// Current generation token of `pid`, or `None` if no such process exists.
    pub async fn generation_of(&self, pid: u32) -> Result<Option<u64>> {
        self.inner.generation_of(pid).await
    }
}

impl Default for SignalTerminator {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessTerminatorPort for SignalTerminator {
    async fn terminate(&self, pid: u32, generation: u64) -> Result<TerminationOutcome> {
        self.inner.terminate(pid, generation).await
    }
}

/// Internal trait for platform-specific implementations.
trait Terminator: Send + Sync {
    fn generation_of(
        &self,
        pid: u32,
    ) -> impl std::future::Future<Output = Result<Option<u64>>> + Send;

    fn terminate(
        &self,
        pid: u32,
        generation: u64,
    ) -> impl std::future::Future<Output = Result<TerminationOutcome>> + Send;
}
