//! Status-change suppression for `fixed` and `broke` alerts

use tracing::{debug, info};

use crate::alert::AlertType;
use crate::error::HistoryError;
use crate::history::{previous_build_status, BuildCoordinates, BuildStatusSource};

const SUCCEEDED: &str = "succeeded";

/// Decide whether a `fixed`/`broke` alert is redundant given the previous build.
///
/// The first build of a job is never suppressed and never triggers a lookup.
/// Other alert types are never suppressed.
pub async fn should_suppress(
    alert_type: AlertType,
    coords: &BuildCoordinates,
    source: &dyn BuildStatusSource,
) -> Result<bool, HistoryError> {
    if !alert_type.is_transition() {
        return Ok(false);
    }

    if coords.is_first_build() {
        debug!(alert_type = %alert_type, "first build of job, nothing to compare against");
        return Ok(false);
    }

    let previous = previous_build_status(source, coords).await?;
    let suppressed = is_redundant(alert_type, &previous);

    if suppressed {
        info!(
            alert_type = %alert_type,
            previous_status = %previous,
            "status did not change, suppressing alert"
        );
    }
    Ok(suppressed)
}

fn is_redundant(alert_type: AlertType, previous_status: &str) -> bool {
    match alert_type {
        AlertType::Fixed => previous_status == SUCCEEDED,
        AlertType::Broke => previous_status != SUCCEEDED,
        _ => false,
    }
}
