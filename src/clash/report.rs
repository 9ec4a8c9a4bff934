// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Clashframe Inc.

//! Report shapes for clash records and the sinks that receive them

use super::record::{group_by_reference, ClashRecord};
use anyhow::{Context, Result};
use colored::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::{self, Write};
use std::str::FromStr;
use tracing::{info, warn};

/// One reportable unit attached to a set of model objects
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    pub category: String,
    pub object_ids: Vec<String>,
    pub message: String,
}

impl Finding {
    pub fn new(category: impl Into<String>, object_ids: Vec<String>, message: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            object_ids,
            message: message.into(),
        }
    }
}

/// Turns clash records into findings without touching geometry
pub trait ClashAggregator {
    fn findings(&self, records: &[ClashRecord]) -> Vec<Finding>;
}

/// One "Clash" finding per reference element, numbered from 1 in order of
/// first appearance. The message is the group number.
#[derive(Debug, Clone, Copy, Default)]
pub struct GroupedAggregator;

impl ClashAggregator for GroupedAggregator {
    fn findings(&self, records: &[ClashRecord]) -> Vec<Finding> {
        group_by_reference(records)
            .into_iter()
            .map(|group| Finding::new("Clash", group.object_ids(), group.number.to_string()))
            .collect()
    }
}

/// One finding per record, categorised by severity
#[derive(Debug, Clone, Copy, Default)]
pub struct PerClashAggregator;

impl ClashAggregator for PerClashAggregator {
    fn findings(&self, records: &[ClashRecord]) -> Vec<Finding> {
        let width = records.len().to_string().len();
        records
            .iter()
            .enumerate()
            .map(|(i, record)| {
                let severity = record
                    .severity
                    .map(|s| format!("{s:.2}"))
                    .unwrap_or_else(|| "n/a".to_string());
                let message = format!(
                    "Clash {:0width$}: {} ↔ {} (severity {})",
                    i + 1,
                    record.reference_id,
                    record.candidate_id,
                    severity,
                    width = width
                );
                Finding::new(
                    record.level().as_str(),
                    vec![record.reference_id.clone(), record.candidate_id.clone()],
                    message,
                )
            })
            .collect()
    }
}

/// Selects the aggregation strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReportFormat {
    #[default]
    Grouped,
    PerClash,
}

impl ReportFormat {
    pub fn aggregator(self) -> Box<dyn ClashAggregator> {
        match self {
            Self::Grouped => Box::new(GroupedAggregator),
            Self::PerClash => Box::new(PerClashAggregator),
        }
    }
}

impl fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Grouped => f.write_str("grouped"),
            Self::PerClash => f.write_str("per-clash"),
        }
    }
}

impl FromStr for ReportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "grouped" => Ok(Self::Grouped),
            "per-clash" | "perclash" => Ok(Self::PerClash),
            other => Err(format!("unknown report format '{other}' (expected grouped or per-clash)")),
        }
    }
}

/// Destination for findings
pub trait ReportSink {
    fn report(&mut self, finding: &Finding) -> Result<()>;
}

/// Send every finding to `sink` once, in order. The first sink error stops
/// emission and is returned; nothing is retried.
pub fn emit(aggregator: &dyn ClashAggregator, records: &[ClashRecord], sink: &mut dyn ReportSink) -> Result<usize> {
    let findings = aggregator.findings(records);
    for (i, finding) in findings.iter().enumerate() {
        sink.report(finding)
            .with_context(|| format!("failed to report finding {} of {}", i + 1, findings.len()))?;
    }
    Ok(findings.len())
}

/// Collects findings in memory
#[derive(Debug, Default)]
pub struct MemorySink {
    pub findings: Vec<Finding>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ReportSink for MemorySink {
    fn report(&mut self, finding: &Finding) -> Result<()> {
        self.findings.push(finding.clone());
        Ok(())
    }
}

/// Coloured terminal output
pub struct ConsoleSink<W: Write = io::Stdout> {
    out: W,
}

impl ConsoleSink<io::Stdout> {
    pub fn stdout() -> Self {
        Self { out: io::stdout() }
    }
}

impl<W: Write> ConsoleSink<W> {
    pub fn with_writer(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn category_label(category: &str) -> ColoredString {
        match category {
            "High" => category.red().bold(),
            "Medium" => category.yellow().bold(),
            "Low" => category.green(),
            "Unscored" => category.bright_black(),
            _ => category.magenta().bold(),
        }
    }
}

impl<W: Write> ReportSink for ConsoleSink<W> {
    fn report(&mut self, finding: &Finding) -> Result<()> {
        let ids: Vec<String> = finding.object_ids.iter().map(|id| id.cyan().to_string()).collect();
        writeln!(
            self.out,
            "  {} {} {}",
            Self::category_label(&finding.category),
            finding.message.bold(),
            format!("[{}]", ids.join(", ")).bright_black()
        )
        .context("failed to write finding to the console")
    }
}

/// Emits findings as structured log events
#[derive(Debug, Default)]
pub struct LogSink;

impl ReportSink for LogSink {
    fn report(&mut self, finding: &Finding) -> Result<()> {
        match finding.category.as_str() {
            "High" => warn!(
                category = %finding.category,
                objects = ?finding.object_ids,
                "{}",
                finding.message
            ),
            _ => info!(
                category = %finding.category,
                objects = ?finding.object_ids,
                "{}",
                finding.message
            ),
        }
        Ok(())
    }
}
