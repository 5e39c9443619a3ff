pub mod camera;
pub mod config;
pub mod controller;
pub mod phase;
pub mod run;
pub mod screenshot;
pub mod ticker;

#[cfg(test)]
pub(crate) mod testing;
