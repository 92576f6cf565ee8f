//! Casual visit counting from browser signals.
//!
//! The token is a heuristic: different browsers may share one (undercount)
//! and any change in screen size, locale or rendering yields a new one
//! (overcount). Only a single last-seen token is kept, so browsers that
//! alternate both count. Do not treat the total as unique visitors.

use crate::models::FingerprintSignals;
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::info;

const TOKEN_LEN: usize = 20;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VisitorState {
    pub total_visitors: u64,
    pub last_visit_date: Option<NaiveDate>,
    pub user_fingerprint: Option<String>,
}

pub fn fingerprint_token(signals: &FingerprintSignals) -> String {
    let joined = format!(
        "{}{}{}x{}{}{}",
        signals.user_agent,
        signals.language,
        signals.screen_width,
        signals.screen_height,
        signals.timezone_offset,
        signals.canvas,
    );
    let hash = blake3::hash(joined.as_bytes()).to_hex();
    hash.as_str()[..TOKEN_LEN].to_string()
}

/// Returns whether this load counts as a new visit.
pub fn record_visit(state: &mut VisitorState, token: &str) -> bool {
    record_visit_at(state, token, Local::now().date_naive())
}

pub fn record_visit_at(state: &mut VisitorState, token: &str, today: NaiveDate) -> bool {
    let same_browser = state.user_fingerprint.as_deref() == Some(token);
    let same_day = state.last_visit_date == Some(today);
    if same_browser && same_day {
        return false;
    }

    state.total_visitors = state.total_visitors.saturating_add(1);
    state.last_visit_date = Some(today);
    state.user_fingerprint = Some(token.to_string());
    info!(total = state.total_visitors, "new visitor");
    true
}
