//! Identifier types shared by the directory, specs and the registry.

pub mod ident;
