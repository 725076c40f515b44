//! Walk Logging and Tracing
//!
//! Structured events for heap traversals, useful for:
//! - Diagnosing damaged snapshots
//! - Comparing walks across dump producers
//!
//! Log Levels:
//! - WARN: Corrupt objects, abandoned extents
//! - INFO: Walk start and completion
//! - DEBUG: Extent transitions
//!
//! Point diagnostics that are not part of a walk go through the `log` facade.

use crate::stats::WalkStats;
use crate::util::format_address;
use std::collections::VecDeque;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use std::time::Instant;

/// Log level for walk events
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Error = 0,
    Warn = 1,
    Info = 2,
    Debug = 3,
    Trace = 4,
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "error" => Ok(LogLevel::Error),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "info" => Ok(LogLevel::Info),
            "debug" => Ok(LogLevel::Debug),
            "trace" => Ok(LogLevel::Trace),
            other => Err(format!("unknown log level: {}", other)),
        }
    }
}

/// Walk event types
#[derive(Debug, Clone, PartialEq)]
pub enum WalkEvent {
    /// Walker created over a region
    WalkStart { region: String, extents: usize },

    /// Cursor moved onto a non-empty extent
    ExtentEntered {
        region: String,
        base: u64,
        size: u64,
        resident_objects: usize,
    },

    /// Object could not be decoded
    CorruptObject {
        region: String,
        address: u64,
        reason: String,
    },

    /// Remaining objects of an extent were dropped
    ExtentAbandoned {
        region: String,
        base: u64,
        skipped_objects: usize,
    },

    /// Walk reached the end of the extent list
    WalkComplete {
        region: String,
        duration_ms: f64,
        stats: WalkStats,
    },
}

impl WalkEvent {
    /// Level the event is logged at
    pub fn level(&self) -> LogLevel {
        match self {
            WalkEvent::CorruptObject { .. } | WalkEvent::ExtentAbandoned { .. } => LogLevel::Warn,
            WalkEvent::WalkStart { .. } | WalkEvent::WalkComplete { .. } => LogLevel::Info,
            WalkEvent::ExtentEntered { .. } => LogLevel::Debug,
        }
    }
}

/// Walk logger configuration
#[derive(Debug, Clone, PartialEq)]
pub struct WalkLoggerConfig {
    /// Minimum log level
    pub level: LogLevel,

    /// Enable console output
    pub console: bool,

    /// Append events to this file
    pub file: Option<String>,

    /// Enable JSON format
    pub json: bool,

    /// Enable timestamps
    pub timestamps: bool,

    /// Events retained in memory; the oldest are dropped first
    pub capacity: usize,
}

impl Default for WalkLoggerConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            console: false,
            file: None,
            json: false,
            timestamps: true,
            capacity: 4096,
        }
    }
}

impl WalkLoggerConfig {
    /// Build configuration from environment variables
    ///
    /// - `SNAPHEAP_LOG_LEVEL`: error, warn, info, debug or trace
    /// - `SNAPHEAP_LOG_JSON`: `1`/`true` for JSON lines
    /// - `SNAPHEAP_LOG_CONSOLE`: `1`/`true` to print events
    ///
    /// Unset or unparsable variables keep their defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(level) = lookup("SNAPHEAP_LOG_LEVEL") {
            match level.parse() {
                Ok(level) => config.level = level,
                Err(err) => log::warn!("Ignoring SNAPHEAP_LOG_LEVEL: {}", err),
            }
        }
        if let Some(json) = lookup("SNAPHEAP_LOG_JSON") {
            config.json = parse_flag(&json);
        }
        if let Some(console) = lookup("SNAPHEAP_LOG_CONSOLE") {
            config.console = parse_flag(&console);
        }

        config
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

/// Walk Logger - centralized logging for heap traversals
pub struct WalkLogger {
    config: WalkLoggerConfig,
    events: Mutex<VecDeque<(Instant, WalkEvent)>>,
    file: Mutex<Option<File>>,
    enabled: AtomicBool,
}

impl WalkLogger {
    /// Create new walk logger
    ///
    /// A log file that cannot be opened is reported through `log::warn!`
    /// and file output is skipped.
    pub fn new(config: WalkLoggerConfig) -> Self {
        let file = config.file.as_ref().and_then(|path| {
            OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map_err(|err| log::warn!("Cannot open walk log {}: {}", path, err))
                .ok()
        });

        Self {
            config,
            events: Mutex::new(VecDeque::new()),
            file: Mutex::new(file),
            enabled: AtomicBool::new(true),
        }
    }

    /// Enable logging
    pub fn enable(&self) {
        self.enabled.store(true, Ordering::Relaxed);
    }

    /// Disable logging
    pub fn disable(&self) {
        self.enabled.store(false, Ordering::Relaxed);
    }

    /// Check if logging is enabled
    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Relaxed)
    }

    /// Active configuration
    pub fn config(&self) -> &WalkLoggerConfig {
        &self.config
    }

    /// Log a walk event
    pub fn log(&self, event: WalkEvent) {
        if !self.is_enabled() || event.level() > self.config.level {
            return;
        }

        if self.config.console || self.config.file.is_some() {
            let line = self.render(&event);
            if self.config.console {
                println!("{}", line);
            }
            if let Ok(mut file) = self.file.lock() {
                if let Some(file) = file.as_mut() {
                    if let Err(err) = writeln!(file, "{}", line) {
                        log::warn!("Failed to write walk log: {}", err);
                    }
                }
            }
        }

        if let Ok(mut events) = self.events.lock() {
            if self.config.capacity == 0 {
                return;
            }
            while events.len() >= self.config.capacity {
                events.pop_front();
            }
            events.push_back((Instant::now(), event));
        }
    }

    /// Render one output line
    fn render(&self, event: &WalkEvent) -> String {
        let body = if self.config.json {
            Self::format_json(event)
        } else {
            Self::format_human(event)
        };

        if self.config.timestamps {
            let now = chrono::Local::now();
            format!("[{}] {}", now.format("%Y-%m-%d %H:%M:%S%.3f"), body)
        } else {
            body
        }
    }

    /// Human-readable format
    fn format_human(event: &WalkEvent) -> String {
        match event {
            WalkEvent::WalkStart { region, extents } => {
                format!("[WALK] {}: started over {} extents", region, extents)
            },
            WalkEvent::ExtentEntered {
                region,
                base,
                size,
                resident_objects,
            } => format!(
                "[WALK] {}: extent {} ({} bytes, {} objects)",
                region,
                format_address(*base),
                size,
                resident_objects
            ),
            WalkEvent::CorruptObject {
                region,
                address,
                reason,
            } => format!(
                "[WALK] {}: corrupt object at {}: {}",
                region,
                format_address(*address),
                reason
            ),
            WalkEvent::ExtentAbandoned {
                region,
                base,
                skipped_objects,
            } => format!(
                "[WALK] {}: abandoned extent {} ({} objects skipped)",
                region,
                format_address(*base),
                skipped_objects
            ),
            WalkEvent::WalkComplete {
                region,
                duration_ms,
                stats,
            } => format!(
                "[WALK] {}: completed ({:.2}ms, {} objects, {} corrupt, {} bytes)",
                region, duration_ms, stats.objects, stats.corrupt_markers, stats.bytes_consumed
            ),
        }
    }

    /// JSON format
    fn format_json(event: &WalkEvent) -> String {
        let json = match event {
            WalkEvent::WalkStart { region, extents } => serde_json::json!({
                "type": "walk_start",
                "region": region,
                "extents": extents
            }),
            WalkEvent::ExtentEntered {
                region,
                base,
                size,
                resident_objects,
            } => serde_json::json!({
                "type": "extent_entered",
                "region": region,
                "base": format_address(*base),
                "size": size,
                "resident_objects": resident_objects
            }),
            WalkEvent::CorruptObject {
                region,
                address,
                reason,
            } => serde_json::json!({
                "type": "corrupt_object",
                "region": region,
                "address": format_address(*address),
                "reason": reason
            }),
            WalkEvent::ExtentAbandoned {
                region,
                base,
                skipped_objects,
            } => serde_json::json!({
                "type": "extent_abandoned",
                "region": region,
                "base": format_address(*base),
                "skipped_objects": skipped_objects
            }),
            WalkEvent::WalkComplete {
                region,
                duration_ms,
                stats,
            } => serde_json::json!({
                "type": "walk_complete",
                "region": region,
                "duration_ms": duration_ms,
                "stats": stats
            }),
        };

        json.to_string()
    }

    /// Get all events
    pub fn get_events(&self) -> Vec<(Instant, WalkEvent)> {
        if let Ok(events) = self.events.lock() {
            events.iter().cloned().collect()
        } else {
            Vec::new()
        }
    }

    /// Clear all events
    pub fn clear_events(&self) {
        if let Ok(mut events) = self.events.lock() {
            events.clear();
        }
    }

    /// Get event count
    pub fn event_count(&self) -> usize {
        if let Ok(events) = self.events.lock() {
            events.len()
        } else {
            0
        }
    }
}

impl Default for WalkLogger {
    fn default() -> Self {
        Self::new(WalkLoggerConfig::default())
    }
}

/// Global walk logger
lazy_static::lazy_static! {
    static ref GLOBAL_LOGGER: Mutex<WalkLogger> = Mutex::new(WalkLogger::new(WalkLoggerConfig::from_env()));
}

/// Log a walk event to global logger
pub fn log_event(event: WalkEvent) {
    if let Ok(logger) = GLOBAL_LOGGER.lock() {
        logger.log(event);
    }
}

/// Configure global logger
pub fn configure_logger(config: WalkLoggerConfig) {
    if let Ok(mut logger) = GLOBAL_LOGGER.lock() {
        *logger = WalkLogger::new(config);
    }
}

/// Get global logger event count
pub fn get_event_count() -> usize {
    if let Ok(logger) = GLOBAL_LOGGER.lock() {
        logger.event_count()
    } else {
        0
    }
}

/// Drain the events recorded by the global logger
pub fn take_events() -> Vec<WalkEvent> {
    if let Ok(logger) = GLOBAL_LOGGER.lock() {
        let events = logger.get_events().into_iter().map(|(_, e)| e).collect();
        logger.clear_events();
        events
    } else {
        Vec::new()
    }
}
