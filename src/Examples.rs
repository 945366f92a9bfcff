/// Numbered demonstrations of the plasma kinetics engine
pub mod plasma_examples;
