//! Notification sink for emitted signals and operational messages.

use crate::models::signal::{Signal, SignalKind};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::info;

const RULE: &str = "━━━━━━━━━━━━━━━━━━━━";

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("messaging API rejected the message ({status}): {body}")]
    Rejected { status: u16, body: String },
}

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send_text(&self, text: &str) -> Result<(), NotifyError>;

    async fn send_signal(&self, signal: &Signal) -> Result<(), NotifyError> {
        self.send_text(&format_signal(signal)).await
    }

    async fn send_startup(
        &self,
        symbols: &[String],
        interval_seconds: u64,
        at: DateTime<Utc>,
    ) -> Result<(), NotifyError> {
        self.send_text(&format_startup(symbols, interval_seconds, at)).await
    }

    async fn send_error(&self, error: &str, at: DateTime<Utc>) -> Result<(), NotifyError> {
        self.send_text(&format_error(error, at)).await
    }
}

/// Writes every message to the log. Used when no messaging API is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send_text(&self, text: &str) -> Result<(), NotifyError> {
        info!(message = %text, "notification");
        Ok(())
    }
}

pub fn signal_icon(kind: SignalKind) -> &'static str {
    match kind {
        SignalKind::ReadyBuy | SignalKind::ReadySell => "🟡",
        SignalKind::EntryBuy => "🟢",
        SignalKind::EntrySell => "🔴",
    }
}

/// Escape the three characters Telegram's HTML parse mode treats specially.
pub fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

pub fn format_signal(signal: &Signal) -> String {
    let icon = signal_icon(signal.kind);
    let mut message = format!(
        "{icon} <b>{kind}</b> {icon}\n{RULE}\n\n\
         💱 <b>Pair:</b> {symbol}\n\
         💰 <b>Price:</b> {price:.5}\n\
         ⏰ <b>Time:</b> {time} UTC\n",
        icon = icon,
        kind = signal.kind,
        RULE = RULE,
        symbol = escape_html(&signal.symbol),
        price = signal.price,
        time = signal.timestamp.format("%Y-%m-%d %H:%M:%S"),
    );
    if let Some(levels) = &signal.levels {
        message.push_str(&format!(
            "🛑 <b>Stop loss:</b> {:.5}\n🎯 <b>Take profit:</b> {:.5}\n",
            levels.stop_loss, levels.take_profit
        ));
    }
    message.push_str(&format!(
        "\n📊 <b>Analysis:</b>\n{}\n\n{}",
        escape_html(&signal.rationale),
        RULE
    ));
    message
}

pub fn format_startup(symbols: &[String], interval_seconds: u64, at: DateTime<Utc>) -> String {
    format!(
        "🚀 <b>Signal worker started</b> 🚀\n{RULE}\n\n\
         ⏰ Time: {time} UTC\n\
         📊 Pairs: {count} ({pairs})\n\
         🔄 Update every {interval} s\n{RULE}",
        RULE = RULE,
        time = at.format("%Y-%m-%d %H:%M:%S"),
        count = symbols.len(),
        pairs = escape_html(&symbols.join(", ")),
        interval = interval_seconds,
    )
}

pub fn format_error(error: &str, at: DateTime<Utc>) -> String {
    format!(
        "❌ <b>Worker error</b> ❌\n{RULE}\n\n\
         ⏰ Time: {time} UTC\n\
         📝 Error: {error}\n{RULE}",
        RULE = RULE,
        time = at.format("%Y-%m-%d %H:%M:%S"),
        error = escape_html(error),
    )
}
