// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Clashframe Inc.

//! Clash detection and reporting

mod detector;
mod record;
mod report;
mod summary;

pub use detector::{ClashDetector, DetectOptions};
pub use record::{group_by_reference, severity, ClashGroup, ClashRecord, SeverityLevel};
pub use report::{
    emit, ClashAggregator, ConsoleSink, Finding, GroupedAggregator, LogSink, MemorySink, PerClashAggregator,
    ReportFormat, ReportSink,
};
pub use summary::RunSummary;
