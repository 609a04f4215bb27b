//! Build history lookups
//!
//! Provides:
//! - Computing the name of the build that ran before the current one
//! - The [`BuildStatusSource`] seam used by the suppression policy
//! - A Concourse API client implementing it

mod client;

pub use client::ConcourseClient;

use async_trait::async_trait;

use crate::error::HistoryError;

/// Identifies a build (and its job) on a Concourse server
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildCoordinates {
    pub host: String,
    pub team: String,
    pub pipeline: String,
    pub job: String,
    /// `<n>` or `<n>.<rerun>`
    pub build_name: String,
    /// Encoded instance vars query including the leading `?`, or empty
    pub instance_vars: String,
}

impl BuildCoordinates {
    pub fn is_first_build(&self) -> bool {
        self.build_name == "1"
    }
}

/// Something that can report the status of a build of the same job.
#[async_trait]
pub trait BuildStatusSource: Send + Sync {
    /// Status token (`succeeded`, `failed`, ...) of build `build_name` of the
    /// job identified by `coords`.
    async fn build_status(
        &self,
        coords: &BuildCoordinates,
        build_name: &str,
    ) -> Result<String, HistoryError>;
}

/// Name of the build that ran before `current`.
///
/// `6` -> `5`, `6.2` -> `6.1`, `6.1` -> `6`.
pub fn previous_build_name(current: &str) -> Result<String, HistoryError> {
    let invalid = || HistoryError::InvalidBuildName(current.to_string());

    match current.split_once('.') {
        None => {
            let n: u64 = current.parse().map_err(|_| invalid())?;
            let previous = n.checked_sub(1).ok_or_else(invalid)?;
            Ok(previous.to_string())
        }
        Some((base, rerun)) => {
            let base: u64 = base.parse().map_err(|_| invalid())?;
            let rerun: u64 = rerun.parse().map_err(|_| invalid())?;
            match rerun.checked_sub(1).ok_or_else(invalid)? {
                0 => Ok(base.to_string()),
                previous => Ok(format!("{}.{}", base, previous)),
            }
        }
    }
}

/// Status of the build before `coords`.
pub async fn previous_build_status(
    source: &dyn BuildStatusSource,
    coords: &BuildCoordinates,
) -> Result<String, HistoryError> {
    let previous = previous_build_name(&coords.build_name)?;
    source.build_status(coords, &previous).await
}
