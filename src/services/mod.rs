//! External collaborators: market data in, notifications out.

pub mod market_data;
pub mod notifier;
pub mod telegram;
pub mod twelve_data;

pub use market_data::{MarketDataError, MarketDataProvider};
pub use notifier::{LogNotifier, Notifier, NotifyError};
pub use telegram::TelegramNotifier;
pub use twelve_data::TwelveDataProvider;
