//! Fixed-capacity entity simulation for a small-screen vertical shooter.
//!
//! The core never allocates after start-up: every entity lives in an
//! [`pool::EntityPool`] of compile-time capacity, and the whole game state is
//! one [`compute::GameWorld`] passed explicitly through the frame.  Display,
//! buttons and clock are reached only through the traits in [`platform`].

pub mod collision;
pub mod compute;
pub mod config;
pub mod driver;
pub mod entities;
pub mod motion;
pub mod platform;
pub mod pool;
pub mod render;
pub mod rng;
pub mod spawn;
