//! Trading-session time filter (UTC).

use chrono::{DateTime, Duration, NaiveTime, Utc};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TradingSession {
    pub name: String,
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl TradingSession {
    pub fn new(name: &str, start: NaiveTime, end: NaiveTime) -> Self {
        Self {
            name: name.to_string(),
            start,
            end,
        }
    }

    /// Inclusive on both ends.
    pub fn contains(&self, time: NaiveTime) -> bool {
        self.start <= time && time <= self.end
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TradingSessions {
    pub enabled: bool,
    pub sessions: Vec<TradingSession>,
}

impl Default for TradingSessions {
    fn default() -> Self {
        Self {
            enabled: true,
            sessions: vec![
                TradingSession::new("London", hm(7, 0), hm(16, 0)),
                TradingSession::new("New York", hm(12, 0), hm(21, 0)),
            ],
        }
    }
}

impl TradingSessions {
    pub fn new(enabled: bool, sessions: Vec<TradingSession>) -> Self {
        Self { enabled, sessions }
    }

    pub fn always_open() -> Self {
        Self {
            enabled: false,
            sessions: Vec::new(),
        }
    }

    pub fn is_trading_time(&self, now: DateTime<Utc>) -> bool {
        !self.enabled || self.current_session(now).is_some()
    }

    /// First configured session containing `now`.
    pub fn current_session(&self, now: DateTime<Utc>) -> Option<&TradingSession> {
        let time = now.time();
        self.sessions.iter().find(|s| s.contains(time))
    }

    /// Start of the next session strictly after `now`, possibly tomorrow.
    /// `None` when the filter is disabled or no sessions are configured.
    pub fn next_session_start(&self, now: DateTime<Utc>) -> Option<(&TradingSession, DateTime<Utc>)> {
        if !self.enabled {
            return None;
        }
        let today = now.date_naive();
        self.sessions
            .iter()
            .map(|session| {
                let mut start = today.and_time(session.start).and_utc();
                if start <= now {
                    start += Duration::days(1);
                }
                (session, start)
            })
            .min_by_key(|(_, start)| *start)
    }

    pub fn describe(&self, now: DateTime<Utc>) -> String {
        if !self.enabled {
            return "all hours".to_string();
        }
        match self.current_session(now) {
            Some(session) => format!("{} session", session.name),
            None => "outside trading hours".to_string(),
        }
    }
}

fn hm(hour: u32, minute: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, minute, 0).unwrap_or(NaiveTime::MIN)
}
