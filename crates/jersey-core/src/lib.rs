// Domain core for the jersey picker: the catalog, the carousel engine, the
// selection flow, the vote store and configuration. No terminal or network
// code lives here.

pub mod carousel;
pub mod catalog;
pub mod config;
pub mod selection;
pub mod votes;
