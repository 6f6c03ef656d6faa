use async_trait::async_trait;
use chat_dispatch::{DispatchResult, Messenger};

/// Prints replies to stdout, for running handlers without a bot token
#[derive(Debug, Default)]
pub struct StdoutMessenger;

#[async_trait]
impl Messenger for StdoutMessenger {
    async fn send_text(&self, chat_id: i64, text: &str) -> DispatchResult<()> {
        println!("── chat {} ──\n{}\n", chat_id, text);
        Ok(())
    }
}
