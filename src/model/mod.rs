pub mod config;
pub mod ident;
