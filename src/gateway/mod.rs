//! Pipeline construction

mod builder;

pub use builder::{Advocate, AdvocateBuilder};
