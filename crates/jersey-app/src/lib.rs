// Orchestration layer: the async event loop, the message protocol shared
// with the TUI and the form-submission client.

pub mod app;
pub mod protocol;
pub mod submit;
