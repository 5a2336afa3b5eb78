//! Provisioning result and where it gets written

use serde::Serialize;
use std::convert::Infallible;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::info;

use crate::error::ProvisionError;

/// Identifiers of the provisioned queues, shaped as Terraform variables
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProvisioningResult {
    pub existing_queue_url: String,
    pub existing_queue_arn: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub existing_dlq_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub existing_dlq_arn: Option<String>,
}

impl ProvisioningResult {
    pub fn new(queue_url: impl Into<String>, queue_arn: impl Into<String>) -> Self {
        Self {
            existing_queue_url: queue_url.into(),
            existing_queue_arn: queue_arn.into(),
            existing_dlq_url: None,
            existing_dlq_arn: None,
        }
    }

    pub fn with_dead_letter(mut self, dlq_url: impl Into<String>, dlq_arn: impl Into<String>) -> Self {
        self.existing_dlq_url = Some(dlq_url.into());
        self.existing_dlq_arn = Some(dlq_arn.into());
        self
    }

    /// Indented JSON, no trailing newline
    pub fn render(&self) -> Result<String, ProvisionError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Write the rendered document followed by a single newline
    pub fn write_document<W: Write>(&self, writer: &mut W) -> Result<(), ProvisionError> {
        let rendered = self.render()?;
        write_rendered(&rendered, writer).map_err(|source| ProvisionError::Output {
            path: PathBuf::from(STDOUT_MARKER),
            source,
        })
    }

    pub fn write_to(&self, target: &OutputTarget) -> Result<(), ProvisionError> {
        match target {
            OutputTarget::Stdout => self.write_document(&mut std::io::stdout().lock()),
            OutputTarget::File(path) => self.write_file(path),
        }
    }

    fn write_file(&self, path: &Path) -> Result<(), ProvisionError> {
        let rendered = self.render()?;
        let output_error = |source| ProvisionError::Output {
            path: path.to_path_buf(),
            source,
        };

        // The handle is dropped, and the file closed, on every return path.
        let mut file = File::create(path).map_err(output_error)?;
        write_rendered(&rendered, &mut file).map_err(output_error)?;

        info!(path = %path.display(), "Wrote provisioning result");
        Ok(())
    }
}

fn write_rendered<W: Write>(rendered: &str, writer: &mut W) -> std::io::Result<()> {
    writeln!(writer, "{rendered}")?;
    writer.flush()
}

const STDOUT_MARKER: &str = "-";

/// Destination of the provisioning result
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum OutputTarget {
    #[default]
    Stdout,
    File(PathBuf),
}

impl FromStr for OutputTarget {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(if s == STDOUT_MARKER {
            Self::Stdout
        } else {
            Self::File(PathBuf::from(s))
        })
    }
}
