//! Outbound chat messaging for Apteka Engine
//!
//! Replies are sent one message per pharmacy. Messaging platforms throttle
//! bots that post in bursts, so every message goes through a
//! [`DispatchThrottler`] that spaces deliveries and drops what cannot be sent
//! before the batch deadline.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use chat_dispatch::{DispatchThrottler, TelegramMessenger};
//! use config_engine::{DispatchSettings, TelegramSettings};
//!
//! # async fn example() -> Result<(), chat_dispatch::DispatchError> {
//! let messenger = Arc::new(TelegramMessenger::new(&TelegramSettings::default())?);
//! let (throttler, _worker) = DispatchThrottler::spawn(messenger, &DispatchSettings::default());
//!
//! let receipt = throttler.dispatch(42, vec!["Аптека: Ромашка".to_string()]).await?;
//! let report = receipt.wait().await?;
//! println!("delivered {}", report.delivered);
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod messenger;
pub mod throttler;

pub use error::{DispatchError, DispatchResult};
pub use messenger::{Messenger, TelegramMessenger};
pub use throttler::{DeliveryReceipt, DeliveryReport, DispatchThrottler};
