pub mod config;
pub mod data;
pub mod drawing;
pub mod errors;
pub mod etl;
pub mod geometry;
pub mod render;
pub mod services;
pub mod session;

#[cfg(test)]
mod testing;
