// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Clashframe Inc.

//! Run configuration
//!
//! Values come from `clash.toml` when present, then from `CLASH_*`
//! environment variables. The binary applies its flags last.

use crate::boolean::BackendKind;
use crate::clash::{DetectOptions, ReportFormat};
use crate::io::{all_of, is_displayable_rule, speckle_type_rule, ElementRule};
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;

pub const DEFAULT_CONFIG_FILE: &str = "clash.toml";

/// Clash run configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClashConfig {
    /// Clearance tolerance, logged with each run
    pub tolerance: f64,
    pub tolerance_unit: String,
    /// Maximum parallel workers
    pub parallelism: Option<usize>,
    pub backend: BackendKind,
    pub report_format: ReportFormat,
    /// Bounding-box rejection before the exact intersection
    pub broad_phase: bool,
    /// Accepted `speckle_type` values in the reference model
    pub reference_types: Vec<String>,
    /// Accepted `speckle_type` values in the candidate model
    pub candidate_types: Vec<String>,
    /// Only keep objects with display geometry
    pub require_displayable: bool,
}

impl Default for ClashConfig {
    fn default() -> Self {
        Self {
            tolerance: 25.0,
            tolerance_unit: "mm".to_string(),
            parallelism: None, // Auto-detect
            backend: BackendKind::default(),
            report_format: ReportFormat::default(),
            broad_phase: true,
            reference_types: vec!["Objects.BuiltElements.Beam:Objects.BuiltElements.Revit.RevitBeam".to_string()],
            candidate_types: [
                "Objects.BuiltElements.Duct",
                "Objects.BuiltElements.Duct:Objects.BuiltElements.Revit.RevitDuct",
                "Objects.BuiltElements.Duct:Objects.BuiltElements.Revit.RevitDuct:Objects.BuiltElements.Revit.RevitFlexDuct",
                "Objects.Other.Revit.RevitInstance:Objects.BuiltElements.Revit.RevitMEPFamilyInstance",
                "Objects.BuiltElements.Revit.RevitElementType:Objects.BuiltElements.Revit.RevitSymbolElementType",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            require_displayable: true,
        }
    }
}

impl ClashConfig {
    /// Load configuration from file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {:?}", path.as_ref()))?;
        let config: ClashConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path.as_ref()))?;
        Ok(config)
    }

    /// Load `path`, or `clash.toml` in the working directory when no path is
    /// given, then apply environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None if PathBuf::from(DEFAULT_CONFIG_FILE).exists() => Self::from_file(DEFAULT_CONFIG_FILE)?,
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Apply `CLASH_*` overrides read through `lookup`
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(tolerance) = lookup("CLASH_TOLERANCE") {
            self.tolerance = parse_var("CLASH_TOLERANCE", &tolerance)?;
        }

        if let Some(parallelism) = lookup("CLASH_PARALLELISM") {
            let threads: usize = parse_var("CLASH_PARALLELISM", &parallelism)?;
            self.parallelism = (threads > 0).then_some(threads);
        }

        if let Some(backend) = lookup("CLASH_BACKEND") {
            self.backend = parse_var("CLASH_BACKEND", &backend)?;
        }

        if let Some(format) = lookup("CLASH_REPORT_FORMAT") {
            self.report_format = parse_var("CLASH_REPORT_FORMAT", &format)?;
        }

        Ok(())
    }

    /// Save configuration to file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(path.as_ref(), content)
            .with_context(|| format!("Failed to write config file: {:?}", path.as_ref()))?;
        Ok(())
    }

    pub fn detect_options(&self, show_progress: bool) -> DetectOptions {
        DetectOptions {
            tolerance: self.tolerance,
            tolerance_unit: self.tolerance_unit.clone(),
            parallelism: self.parallelism,
            broad_phase: self.broad_phase,
            show_progress,
        }
    }

    pub fn reference_rule(&self) -> ElementRule {
        self.rule_for(&self.reference_types)
    }

    pub fn candidate_rule(&self) -> ElementRule {
        self.rule_for(&self.candidate_types)
    }

    fn rule_for(&self, types: &[String]) -> ElementRule {
        let mut rules = vec![speckle_type_rule(types.iter().cloned())];
        if self.require_displayable {
            rules.push(is_displayable_rule());
        }
        all_of(rules)
    }
}

fn parse_var<T>(key: &str, value: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|err| anyhow!("{err}"))
        .with_context(|| format!("Invalid value for {key}: {value:?}"))
}
