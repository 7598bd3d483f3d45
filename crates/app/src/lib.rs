//! Grocer application services: persistence, caching and courier integration
//! around the `grocer` pricing engine.

pub mod cache;
pub mod context;
pub mod database;
pub mod domain;
pub mod money;

#[cfg(test)]
mod test;
