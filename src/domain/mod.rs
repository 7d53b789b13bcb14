pub mod board;
pub mod moves;
pub mod rules;
pub mod spawn;
