//! Action logging with pattern-based filtering and in-memory storage
//!
//! Filters match against action type strings, so `REQUEST_*` selects every
//! request and `*_USER` every action of the `user` entity.
//!
//! # Example
//!
//! ```ignore
//! use entity_dispatch_core::logger::{ActionLoggerConfig, ActionLoggerMiddleware, ActionLogConfig};
//!
//! // Only errors, tracing output only
//! let middleware = ActionLoggerMiddleware::new(ActionLoggerConfig::new(Some("ERROR_*"), None));
//!
//! // Everything, kept in a ring buffer as well
//! let middleware = ActionLoggerMiddleware::with_log(ActionLogConfig::default());
//! ```

use std::collections::VecDeque;
use std::time::Instant;

use crate::action::EntityAction;
use crate::store::Middleware;

/// Glob filters over action type strings.
///
/// - `*` matches any sequence of characters
/// - `?` matches any single character
#[derive(Debug, Clone, Default)]
pub struct ActionLoggerConfig {
    /// If non-empty, only log actions matching these patterns
    pub include_patterns: Vec<String>,
    /// Exclude actions matching these patterns (applied after include)
    pub exclude_patterns: Vec<String>,
}

impl ActionLoggerConfig {
    /// Build a config from comma-separated pattern lists.
    ///
    /// ```
    /// use entity_dispatch_core::logger::ActionLoggerConfig;
    ///
    /// let config = ActionLoggerConfig::new(Some("REQUEST_*,ERROR_*"), Some("*_SESSION"));
    /// assert!(config.should_log("ERROR_LOAD_USER"));
    /// assert!(!config.should_log("RESPONSE_LOAD_USER"));
    /// assert!(!config.should_log("REQUEST_LOAD_SESSION"));
    /// ```
    pub fn new(include: Option<&str>, exclude: Option<&str>) -> Self {
        Self {
            include_patterns: include.map(split_patterns).unwrap_or_default(),
            exclude_patterns: exclude.map(split_patterns).unwrap_or_default(),
        }
    }

    /// Whether `action_type` passes the include list and misses every exclude.
    pub fn should_log(&self, action_type: &str) -> bool {
        if !self.include_patterns.is_empty()
            && !self
                .include_patterns
                .iter()
                .any(|p| glob_match(p, action_type))
        {
            return false;
        }

        !self
            .exclude_patterns
            .iter()
            .any(|p| glob_match(p, action_type))
    }
}

fn split_patterns(s: &str) -> Vec<String> {
    s.split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(String::from)
        .collect()
}

// ============================================================================
// In-Memory Action Log
// ============================================================================

#[derive(Debug, Clone)]
pub struct ActionLogEntry {
    pub action_type: String,
    pub entity_path: String,
    pub timestamp: Instant,
    /// Sequence number for ordering
    pub sequence: u64,
    /// Set once the reducer has run
    pub state_changed: Option<bool>,
}

impl ActionLogEntry {
    fn new(action: &EntityAction, sequence: u64) -> Self {
        Self {
            action_type: action.kind.clone(),
            entity_path: action.entity_path.clone(),
            timestamp: Instant::now(),
            sequence,
            state_changed: None,
        }
    }

    /// Elapsed time for display (e.g. "2.3s", "150ms")
    pub fn elapsed_display(&self) -> String {
        let elapsed = self.timestamp.elapsed();
        if elapsed.as_secs() >= 1 {
            format!("{:.1}s", elapsed.as_secs_f64())
        } else {
            format!("{}ms", elapsed.as_millis())
        }
    }
}

#[derive(Debug, Clone)]
pub struct ActionLogConfig {
    /// Maximum number of entries to keep
    pub capacity: usize,
    pub filter: ActionLoggerConfig,
}

impl Default for ActionLogConfig {
    fn default() -> Self {
        Self {
            capacity: 100,
            filter: ActionLoggerConfig::default(),
        }
    }
}

impl ActionLogConfig {
    pub fn new(capacity: usize, filter: ActionLoggerConfig) -> Self {
        Self { capacity, filter }
    }
}

/// Ring buffer of recent actions. Oldest entries drop out at capacity.
#[derive(Debug, Clone)]
pub struct ActionLog {
    entries: VecDeque<ActionLogEntry>,
    config: ActionLogConfig,
    next_sequence: u64,
}

impl Default for ActionLog {
    fn default() -> Self {
        Self::new(ActionLogConfig::default())
    }
}

impl ActionLog {
    pub fn new(config: ActionLogConfig) -> Self {
        Self {
            entries: VecDeque::with_capacity(config.capacity),
            config,
            next_sequence: 0,
        }
    }

    /// Record `action` if it passes the filter.
    pub fn log(&mut self, action: &EntityAction) -> Option<&ActionLogEntry> {
        if self.config.capacity == 0 || !self.config.filter.should_log(&action.kind) {
            return None;
        }

        let entry = ActionLogEntry::new(action, self.next_sequence);
        self.next_sequence += 1;

        if self.entries.len() >= self.config.capacity {
            self.entries.pop_front();
        }

        self.entries.push_back(entry);
        self.entries.back()
    }

    pub fn update_last_state_changed(&mut self, changed: bool) {
        if let Some(entry) = self.entries.back_mut() {
            entry.state_changed = Some(changed);
        }
    }

    /// Oldest first
    pub fn entries(&self) -> impl Iterator<Item = &ActionLogEntry> {
        self.entries.iter()
    }

    /// Most recent `count` entries, newest first
    pub fn recent(&self, count: usize) -> impl Iterator<Item = &ActionLogEntry> {
        self.entries.iter().rev().take(count)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ============================================================================
// Middleware
// ============================================================================

/// Middleware that logs entity actions through `tracing`, optionally keeping
/// them in an [`ActionLog`].
#[derive(Debug, Clone)]
pub struct ActionLoggerMiddleware {
    config: ActionLoggerConfig,
    log: Option<ActionLog>,
    last_action_logged: bool,
    active: bool,
}

impl Default for ActionLoggerMiddleware {
    fn default() -> Self {
        Self::new(ActionLoggerConfig::default())
    }
}

impl ActionLoggerMiddleware {
    /// Tracing output only.
    pub fn new(config: ActionLoggerConfig) -> Self {
        Self {
            config,
            log: None,
            last_action_logged: false,
            active: true,
        }
    }

    /// Tracing output plus in-memory storage.
    pub fn with_log(config: ActionLogConfig) -> Self {
        Self {
            config: config.filter.clone(),
            log: Some(ActionLog::new(config)),
            last_action_logged: false,
            active: true,
        }
    }

    /// When inactive, every hook is a no-op.
    pub fn active(mut self, active: bool) -> Self {
        self.active = active;
        self
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn log(&self) -> Option<&ActionLog> {
        self.log.as_ref()
    }

    pub fn config(&self) -> &ActionLoggerConfig {
        &self.config
    }
}

impl Middleware<EntityAction> for ActionLoggerMiddleware {
    fn before(&mut self, action: &EntityAction) {
        if !self.active {
            return;
        }

        if self.config.should_log(&action.kind) {
            tracing::debug!(
                action = %action.kind,
                entity = %action.entity_path,
                has_payload = action.payload.is_some(),
                "action"
            );
        }

        self.last_action_logged = false;
        if let Some(ref mut log) = self.log {
            self.last_action_logged = log.log(action).is_some();
        }
    }

    fn after(&mut self, _action: &EntityAction, state_changed: bool) {
        if !self.active || !self.last_action_logged {
            return;
        }

        if let Some(ref mut log) = self.log {
            log.update_last_state_changed(state_changed);
        }
    }
}

/// Simple glob pattern matching supporting `*` and `?`.
pub fn glob_match(pattern: &str, text: &str) -> bool {
    let pattern: Vec<char> = pattern.chars().collect();
    let text: Vec<char> = text.chars().collect();

    let mut pi = 0;
    let mut ti = 0;
    let mut star: Option<(usize, usize)> = None;

    while ti < text.len() {
        match pattern.get(pi) {
            Some(&c) if c == '?' || c == text[ti] => {
                pi += 1;
                ti += 1;
            }
            Some(&'*') => {
                star = Some((pi, ti));
                pi += 1;
            }
            _ => match star {
                // backtrack: let the last star swallow one more char
                Some((spi, sti)) => {
                    star = Some((spi, sti + 1));
                    pi = spi + 1;
                    ti = sti + 1;
                }
                None => return false,
            },
        }
    }

    pattern[pi..].iter().all(|&c| c == '*')
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_glob_match() {
        assert!(glob_match("REQUEST_LOAD_USER", "REQUEST_LOAD_USER"));
        assert!(!glob_match("REQUEST_LOAD_USER", "REQUEST_LOAD_USERS"));

        assert!(glob_match("REQUEST_*", "REQUEST_SAVE_ORDER"));
        assert!(!glob_match("REQUEST_*", "RESPONSE_SAVE_ORDER"));
        assert!(glob_match("*_USER", "ERROR_DELETE_USER"));
        assert!(glob_match("*_LOAD_*", "RESPONSE_LOAD_USER"));

        assert!(glob_match("ERROR_????_USER", "ERROR_LOAD_USER"));
        assert!(!glob_match("ERROR_????_USER", "ERROR_DELETE_USER"));
    }

    #[test]
    fn test_config_include_and_exclude() {
        let config = ActionLoggerConfig::new(Some("*_LOAD_*"), Some("REQUEST_*"));
        assert!(config.should_log("RESPONSE_LOAD_USER"));
        assert!(config.should_log("ERROR_LOAD_USER"));
        assert!(!config.should_log("REQUEST_LOAD_USER"));
        assert!(!config.should_log("RESPONSE_SAVE_USER"));
    }

    #[test]
    fn test_config_default_logs_everything() {
        let config = ActionLoggerConfig::default();
        assert!(config.should_log("REQUEST_LOAD_USER"));
        assert!(config.should_log("anything"));
    }

    #[test]
    fn test_action_log_capacity() {
        let mut log = ActionLog::new(ActionLogConfig::new(2, ActionLoggerConfig::default()));

        for _ in 0..3 {
            log.log(&EntityAction::bare("REQUEST_LOAD_USER", "user"));
        }

        assert_eq!(log.len(), 2);
        assert_eq!(log.entries().next().map(|e| e.sequence), Some(1));
        let recent: Vec<_> = log.recent(1).map(|e| e.sequence).collect();
        assert_eq!(recent, vec![2]);
    }

    #[test]
    fn test_middleware_records_state_changed() {
        let mut middleware = ActionLoggerMiddleware::with_log(ActionLogConfig::new(
            10,
            ActionLoggerConfig::new(None, Some("REQUEST_*")),
        ));

        let response = EntityAction::with_payload("RESPONSE_LOAD_USER", json!(1), "user");
        middleware.before(&response);
        middleware.after(&response, true);

        let request = EntityAction::bare("REQUEST_LOAD_USER", "user");
        middleware.before(&request);
        middleware.after(&request, false);

        let log = middleware.log().unwrap();
        assert_eq!(log.len(), 1);
        let entry = log.entries().next().unwrap();
        assert_eq!(entry.action_type, "RESPONSE_LOAD_USER");
        assert_eq!(entry.entity_path, "user");
        assert_eq!(entry.state_changed, Some(true));
    }

    #[test]
    fn test_inactive_middleware_records_nothing() {
        let mut middleware =
            ActionLoggerMiddleware::with_log(ActionLogConfig::default()).active(false);

        let action = EntityAction::bare("REQUEST_LOAD_USER", "user");
        middleware.before(&action);
        middleware.after(&action, true);

        assert!(middleware.log().unwrap().is_empty());
    }

    #[test]
    fn test_tracing_only_middleware_keeps_no_log() {
        let mut middleware =
            ActionLoggerMiddleware::new(ActionLoggerConfig::new(Some("ERROR_*"), None));

        let action = EntityAction::with_payload("ERROR_SAVE_USER", json!("denied"), "user");
        middleware.before(&action);
        middleware.after(&action, true);

        assert!(middleware.is_active());
        assert!(middleware.log().is_none());
        assert_eq!(middleware.config().include_patterns, vec!["ERROR_*"]);
    }
}
