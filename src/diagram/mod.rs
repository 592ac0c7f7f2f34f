//! Diagram module - Feynman diagram state and phonon propagators.

mod feynman;
mod phonon;

pub use feynman::{Diagram, DiagramParams};
pub use phonon::{Phonon, PhononFactory};
