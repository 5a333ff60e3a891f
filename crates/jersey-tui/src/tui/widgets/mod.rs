// TUI widget modules for each screen zone.

pub mod card;
pub mod carousel;
pub mod confirmation;
pub mod form;
pub mod help_bar;
pub mod indicators;
pub mod quit_confirm;
pub mod status_bar;
pub mod votes;
