//! Template Common
//!
//! Shared building blocks for the template parser: the two-coordinate
//! cursor position, the fragment sequence it walks, and the fingerprint
//! that identifies a static template independently of its values.

pub mod fingerprint;
pub mod fragments;
pub mod position;

pub use fingerprint::Fingerprint;
pub use fragments::Fragments;
pub use position::Position;
