//! Operations CLI and chat handlers for Apteka Engine
//!
//! This crate is the composition root: it wires the catalog store, the search
//! pipeline, voice transcription and the dispatch throttler into handlers, and
//! exposes them through the `apteka` command-line tool.
//!
//! # Example Usage
//!
//! ```bash
//! # Schema and connectivity
//! apteka migrate
//! apteka health
//!
//! # Catalog maintenance
//! apteka catalog add-medicine "Парацетамол" --alias Paracetamol
//! apteka catalog add-alias --medicine-id <uuid> "Панадол"
//! apteka catalog stock --pharmacy-id <uuid> --medicine-id <uuid>
//!
//! # Queries and registration
//! apteka search --text "Парацетомол, тайлолхот"
//! apteka search --text "Тримол" --chat-id -1001234567890
//! apteka voice --file message.ogg --duration 7 --chat-id 123456
//! apteka register --chat-id 123456 --payload '{"name":"Ромашка","address":"ул. Ленина, 1","phone":"+7 900 123-45-67"}'
//! ```

pub mod console;
pub mod handlers;
pub mod replies;

pub use console::StdoutMessenger;
pub use handlers::{HandlerResult, QueryHandler, RegistrationHandler};
