// src/state.rs

use crate::config::ServerConfig;
use crate::core::breach::BreachChecker;
use crate::core::classifier::PhishingModel;
use crate::core::history::HistoryStore;
use crate::core::progress::ProgressTracker;
use chrono::{DateTime, Utc};
use std::sync::Arc;

/// Shared application state handed to every request handler.
///
/// The model and breach dataset are loaded once at startup; the history
/// store sits behind a trait so the persistence strategy stays swappable.
#[derive(Clone)]
pub struct AppState {
    pub model: Arc<PhishingModel>,
    pub breach_checker: Arc<BreachChecker>,
    pub tracker: Arc<ProgressTracker>,
    pub history: Arc<dyn HistoryStore>,
    pub config: Arc<ServerConfig>,
    pub start_time: DateTime<Utc>,
}
