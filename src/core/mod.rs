pub mod command;
pub mod engine;
pub mod game;
pub mod rules;  // Level scaling formulas
