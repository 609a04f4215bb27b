//! The `out` step: resolve, check history, format, deliver

use std::path::PathBuf;

use tracing::info;

use crate::alert::Alert;
use crate::config::BuildMetadata;
use crate::error::OutError;
use crate::history::{BuildStatusSource, ConcourseClient};
use crate::notifications::{build_message, Dispatcher};
use crate::resource::{OutRequest, OutResponse};
use crate::suppression::should_suppress;

/// Everything `out` needs besides the request itself
pub struct OutContext {
    pub metadata: BuildMetadata,
    /// Directory with the build's inputs, anchors `message_file`/`text_file`
    pub sources_dir: PathBuf,
    pub dispatcher: Dispatcher,
    /// Replaces the Concourse client built from the source credentials
    pub history: Option<Box<dyn BuildStatusSource>>,
}

impl OutContext {
    pub fn new(metadata: BuildMetadata, sources_dir: impl Into<PathBuf>) -> Self {
        Self {
            metadata,
            sources_dir: sources_dir.into(),
            dispatcher: Dispatcher::default(),
            history: None,
        }
    }

    pub fn with_dispatcher(mut self, dispatcher: Dispatcher) -> Self {
        self.dispatcher = dispatcher;
        self
    }

    pub fn with_history(mut self, history: Box<dyn BuildStatusSource>) -> Self {
        self.history = Some(history);
        self
    }
}

/// Run the `out` step for one request.
pub async fn out(request: &OutRequest, ctx: &OutContext) -> Result<OutResponse, OutError> {
    if request.source.url.is_empty() {
        return Err(OutError::MissingWebhookUrl);
    }

    let alert = Alert::resolve(request, &ctx.sources_dir);
    let alert_type = alert.alert_type;
    info!(
        alert_type = %alert_type,
        build = %ctx.metadata.build_name,
        build_id = %ctx.metadata.id,
        "resolved alert"
    );

    if alert.suppressed {
        info!("alert disabled");
        return Ok(OutResponse::new(alert_type.as_str(), false));
    }

    if alert_type.is_transition() {
        let coords = ctx.metadata.coordinates();
        let suppressed = match &ctx.history {
            Some(history) => should_suppress(alert_type, &coords, &**history).await?,
            None => {
                let client = ConcourseClient::new(&request.source.username, &request.source.password);
                should_suppress(alert_type, &coords, &client).await?
            }
        };
        if suppressed {
            return Ok(OutResponse::new(alert_type.as_str(), false));
        }
    }

    let message = build_message(&alert, &ctx.metadata);
    ctx.dispatcher.send(&request.source.url, &message).await?;

    Ok(OutResponse::new(alert_type.as_str(), true))
}
