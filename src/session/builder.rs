//! Builder for ChipseqSession

use std::sync::Arc;

use super::ChipseqSession;
use crate::annotation::AnnotationLookup;
use crate::config::DisplayConfig;
use crate::error::{ChipseqError, Result};
use crate::signal::SignalSource;

/// Builder for [`ChipseqSession`]
///
/// # Example
///
/// ```ignore
/// let session = ChipseqSession::builder()
///     .ip(Arc::new(ip_signal))
///     .control(Arc::new(control_signal))
///     .annotations(Arc::new(GtfAnnotationDb::from_path("genes.gtf")?))
///     .build()?;
/// ```
#[derive(Default)]
pub struct ChipseqSessionBuilder {
    ip: Option<Arc<dyn SignalSource>>,
    control: Option<Arc<dyn SignalSource>>,
    annotations: Option<Arc<dyn AnnotationLookup>>,
    config: Option<DisplayConfig>,
}

impl ChipseqSessionBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the immunoprecipitation signal (required)
    pub fn ip(mut self, source: Arc<dyn SignalSource>) -> Self {
        self.ip = Some(source);
        self
    }

    /// Set the control signal (required)
    pub fn control(mut self, source: Arc<dyn SignalSource>) -> Self {
        self.control = Some(source);
        self
    }

    /// Gene annotations; detail views show gene models when set
    pub fn annotations(mut self, lookup: Arc<dyn AnnotationLookup>) -> Self {
        self.annotations = Some(lookup);
        self
    }

    pub fn config(mut self, config: DisplayConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Build the session
    ///
    /// Returns an error if either signal source is missing
    pub fn build(self) -> Result<ChipseqSession> {
        let ip = self.ip.ok_or_else(|| ChipseqError::InvalidInput {
            reason: "ip signal is required".to_string(),
        })?;
        let control = self.control.ok_or_else(|| ChipseqError::InvalidInput {
            reason: "control signal is required".to_string(),
        })?;
        let config = self.config.unwrap_or_default();
        if config.selection_limit == 0 {
            log::warn!("Selection limit is 0; every selection will be rejected");
        }
        Ok(ChipseqSession::new(ip, control, self.annotations, config))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signal::ReadCoverageSignal;

    #[test]
    fn test_missing_sources() {
        let err = ChipseqSessionBuilder::new().build().err().unwrap();
        assert!(err.to_string().contains("ip signal is required"));

        let err = ChipseqSessionBuilder::new()
            .ip(Arc::new(ReadCoverageSignal::new(Vec::new())))
            .build()
            .err()
            .unwrap();
        assert!(err.to_string().contains("control signal is required"));
    }

    #[test]
    fn test_config_defaults_applied() {
        let session = ChipseqSessionBuilder::new()
            .ip(Arc::new(ReadCoverageSignal::new(Vec::new())))
            .control(Arc::new(ReadCoverageSignal::new(Vec::new())))
            .build()
            .unwrap();
        assert_eq!(session.config(), &DisplayConfig::default());
        assert!(!session.has_annotations());
    }
}
