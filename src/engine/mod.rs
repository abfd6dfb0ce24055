pub mod compiler;
pub mod converter;
pub mod executor;
pub mod flags;
pub mod generator;
pub mod resolver;
