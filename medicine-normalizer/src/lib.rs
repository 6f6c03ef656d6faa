//! Medicine name normalization for Apteka Engine
//!
//! Shared by the persistence layer (which stores a normalized `name_key` for
//! every canonical name and alias) and the resolver (which normalizes every
//! query token) so both sides of a comparison use the same rules.
//!
//! # Example
//!
//! ```rust
//! use medicine_normalizer::{normalize, TrigramIndex};
//!
//! assert_eq!(normalize("  Тайлол-Хот "), "тайлолхот");
//!
//! let mut index = TrigramIndex::new();
//! index.insert(1, "Парацетамол");
//! assert_eq!(index.candidates("парацетомол", 0.3, 5)[0].0, 1);
//! ```

pub mod normalize;
pub mod trigram;

pub use normalize::*;
pub use trigram::*;
