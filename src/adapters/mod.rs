// Adapters layer: concrete implementations of the domain ports.

pub mod http;
pub mod smtp;

pub use http::{FetchSettings, ReqwestFetcher};
pub use smtp::{SmtpNotifier, SmtpSettings};
