pub mod client;
pub mod language;
pub mod network;
pub mod protocol;

pub use client::MossClient;
pub use language::ALLOWED_LANGUAGES;
pub use network::{Channel, Connector, MOSS_PORT, MOSS_SERVER};
pub use protocol::MossError;
