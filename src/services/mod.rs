pub mod api_client;
pub mod console;
pub mod document;
pub mod notifier;
pub mod render;
pub mod search;
