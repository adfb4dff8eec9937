//! Generic document trees and their JSON form.

mod json;
pub mod node;

pub use node::{NodeKind, UNode};
