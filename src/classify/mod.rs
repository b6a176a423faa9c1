//! Classification of contributors by historical patch count.

mod tier;

pub use tier::Tier;
