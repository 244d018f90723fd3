// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

//! Log subscriber setup. The terminal belongs to the UI, so records go to
//! an append-only file instead of stderr.
//!
//! Filter priority, highest first: `ROSTER_LOG`, `RUST_LOG`, `[log].level`,
//! then `--verbose` (debug) or the `info` default.

use anyhow::{Context, Result};
use std::env;
use std::fs::{self, OpenOptions};
use std::path::Path;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;

pub const LOG_ENV: &str = "ROSTER_LOG";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    Normal,
    Verbose,
}

impl Verbosity {
    pub const fn from_flag(verbose: bool) -> Self {
        if verbose { Self::Verbose } else { Self::Normal }
    }

    const fn default_directive(self) -> &'static str {
        match self {
            Self::Normal => "info",
            Self::Verbose => "debug",
        }
    }
}

pub fn init(log_file: &Path, config_level: Option<&str>, verbosity: Verbosity) -> Result<()> {
    if let Some(parent) = log_file.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)
            .with_context(|| format!("create log directory {}", parent.display()))?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_file)
        .with_context(|| format!("open log file {}", log_file.display()))?;

    let directive = filter_directive(config_level, verbosity);
    let filter = EnvFilter::try_new(&directive)
        .unwrap_or_else(|_| EnvFilter::new(verbosity.default_directive()));

    let fmt_layer = fmt::layer()
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(true)
        .with_level(true);

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init()
        .context("install log subscriber")?;
    Ok(())
}

/// Picks the first usable directive along the priority chain. Unparseable
/// values fall through to the next source instead of failing startup.
fn filter_directive(config_level: Option<&str>, verbosity: Verbosity) -> String {
    [
        env::var(LOG_ENV).ok(),
        env::var("RUST_LOG").ok(),
        config_level.map(str::to_owned),
    ]
    .into_iter()
    .flatten()
    .map(|directive| directive.trim().to_owned())
    .find(|directive| !directive.is_empty() && EnvFilter::try_new(directive).is_ok())
    .unwrap_or_else(|| verbosity.default_directive().to_owned())
}

#[cfg(test)]
mod tests {
    use super::{LOG_ENV, Verbosity, filter_directive};
    use crate::env_lock;

    fn set_log_env(roster: Option<&str>, rust: Option<&str>) {
        // SAFETY: test-only process-local env mutation, serialized by env_lock.
        unsafe {
            match roster {
                Some(value) => std::env::set_var(LOG_ENV, value),
                None => std::env::remove_var(LOG_ENV),
            }
            match rust {
                Some(value) => std::env::set_var("RUST_LOG", value),
                None => std::env::remove_var("RUST_LOG"),
            }
        }
    }

    #[test]
    fn verbosity_from_flag() {
        assert_eq!(Verbosity::from_flag(false), Verbosity::Normal);
        assert_eq!(Verbosity::from_flag(true), Verbosity::Verbose);
    }

    #[test]
    fn defaults_follow_verbosity() {
        let _guard = env_lock();
        set_log_env(None, None);
        assert_eq!(filter_directive(None, Verbosity::Normal), "info");
        assert_eq!(filter_directive(None, Verbosity::Verbose), "debug");
    }

    #[test]
    fn config_level_beats_verbose_flag() {
        let _guard = env_lock();
        set_log_env(None, None);
        assert_eq!(filter_directive(Some("warn"), Verbosity::Verbose), "warn");
    }

    #[test]
    fn env_vars_beat_config_in_order() {
        let _guard = env_lock();
        set_log_env(Some("roster_store=trace"), Some("error"));
        let project = filter_directive(Some("warn"), Verbosity::Normal);
        set_log_env(None, Some("error"));
        let rust = filter_directive(Some("warn"), Verbosity::Normal);
        set_log_env(None, None);

        assert_eq!(project, "roster_store=trace");
        assert_eq!(rust, "error");
    }

    #[test]
    fn unparseable_env_falls_through() {
        let _guard = env_lock();
        set_log_env(Some("roster=loud"), Some("  "));
        let directive = filter_directive(Some("warn"), Verbosity::Normal);
        set_log_env(None, None);

        assert_eq!(directive, "warn");
    }
}
