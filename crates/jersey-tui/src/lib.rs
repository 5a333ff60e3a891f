// Terminal front end for the jersey picker. The binary in `main.rs` wires
// it to the app orchestrator; the library target exists so the TUI can be
// tested without a terminal.

pub mod tui;
