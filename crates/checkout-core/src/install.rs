//! Installability Activation
//!
//! Registers the background worker script after a successful charge. The
//! outcome travels only through the terminal `pwa-installed` event; it
//! never reopens the error region and never reverts an authorized payment.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Name of the terminal DOM event.
pub const PWA_INSTALLED_EVENT: &str = "pwa-installed";

/// Result of one worker-registration attempt; doubles as the terminal
/// event detail.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstallReport {
    pub success: bool,
}

/// Port for worker-script registration.
///
/// Must not fail at the type level; every outcome is a report.
#[async_trait(?Send)]
pub trait InstallabilityActivator {
    /// Register the worker script; the report says whether it took.
    async fn activate(&self, worker_script_url: &str) -> InstallReport;
}
