pub mod webhook;

pub use webhook::{NotifyError, WebhookNotifier, WebhookPayload};
