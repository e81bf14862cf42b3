//! Test helpers shared across crates in the mergefs workspace.
//!
//! - [`backends`] wraps a [`mergefs::Backend`] to observe or restrict how the
//!   merge filesystem uses it.
//! - [`fixtures`] seeds the datasources and aliases most tests merge.
//! - [`figment`] runs configuration tests inside a [`::figment::Jail`].

pub mod backends;
pub mod figment;
pub mod fixtures;
