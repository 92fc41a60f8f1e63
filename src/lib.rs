// 2D soft-body sandbox: a mass-spring physics core, a lattice generator and
// the input and timing plumbing that drives them

pub mod core;
pub mod engine;
pub mod game;
