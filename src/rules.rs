//! Built-in rule packs.
//!
//! Rules are plain data (see [`Rule`](crate::Rule)); packs are just
//! functions returning a `Vec<Rule>` that callers feed into
//! [`Engine::add`](crate::Engine::add). The bundled smalltalk pack doubles
//! as the CLI's demo ruleset and as end-to-end test material.

pub(crate) mod smalltalk;
