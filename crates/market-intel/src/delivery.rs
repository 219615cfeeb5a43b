//! Report delivery sinks
//!
//! Sinks receive a finished [`Delivery`] and hand it off. Failures are
//! reported to the caller once; sinks never retry.

use crate::error::{IntelError, Result};
use crate::report::Report;
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

/// A message ready to be sent
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Delivery {
    pub date: NaiveDate,
    pub subject: String,
    pub body: String,
    pub recipient: Option<String>,
    /// Files to attach, passed through untouched
    pub attachments: Vec<PathBuf>,
}

impl Delivery {
    pub fn from_report(report: &Report, recipient: Option<String>) -> Self {
        Self {
            date: report.date(),
            subject: report.subject(),
            body: report.render(),
            recipient,
            attachments: Vec::new(),
        }
    }

    pub fn with_attachments(mut self, attachments: Vec<PathBuf>) -> Self {
        self.attachments = attachments;
        self
    }

    /// Header block followed by the body
    fn to_text(&self) -> String {
        let mut out = format!("Subject: {}\n", self.subject);
        if let Some(recipient) = &self.recipient {
            out.push_str(&format!("To: {recipient}\n"));
        }
        for attachment in &self.attachments {
            out.push_str(&format!("Attachment: {}\n", attachment.display()));
        }
        out.push('\n');
        out.push_str(&self.body);
        out.push('\n');
        out
    }
}

/// Destination for composed reports
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DeliverySink: Send + Sync {
    async fn deliver(&self, delivery: &Delivery) -> Result<()>;
}

/// Prints the report to standard output
#[derive(Debug, Default, Clone, Copy)]
pub struct StdoutSink;

#[async_trait]
impl DeliverySink for StdoutSink {
    async fn deliver(&self, delivery: &Delivery) -> Result<()> {
        println!("{}", delivery.to_text());
        Ok(())
    }
}

/// Writes `<dir>/<yyyy-mm-dd>-report.txt`
#[derive(Debug, Clone)]
pub struct FileSink {
    dir: PathBuf,
}

impl FileSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, date: NaiveDate) -> PathBuf {
        self.dir
            .join(format!("{}-report.txt", date.format("%Y-%m-%d")))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

#[async_trait]
impl DeliverySink for FileSink {
    async fn deliver(&self, delivery: &Delivery) -> Result<()> {
        let path = self.path_for(delivery.date);

        tokio::fs::create_dir_all(&self.dir).await.map_err(|e| {
            IntelError::DeliveryError(format!("cannot create {}: {e}", self.dir.display()))
        })?;
        tokio::fs::write(&path, delivery.to_text())
            .await
            .map_err(|e| IntelError::DeliveryError(format!("cannot write {}: {e}", path.display())))?;

        info!("Report written to {}", path.display());
        Ok(())
    }
}
