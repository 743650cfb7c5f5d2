//! # duskmode
//!
//! Library behind the `duskmode` binary: switches the desktop between light
//! and dark mode on a solar or fixed daily schedule.
//!
//! The crate is split so the binary only parses arguments and dispatches:
//!
//! - **Entry Point**: [`Duskmode`] acquires resources and runs the scheduler
//! - **Core Logic**: `core` holds the evaluate, apply and plan loop
//! - **Scheduling**: `schedule` decides the current mode and next switch;
//!   `refresh` plans the next wake instant
//! - **Astronomy**: `geo` for sunrise/sunset, polar days and time zones
//! - **Desktop**: `theme` appliers and `location` providers (GeoClue)
//! - **Configuration**: `config` for TOML settings with hot reload
//! - **Commands**: `commands` for `status`, `week`, `apply`, `reload`, `stop`
//! - **Infrastructure**: signals, D-Bus monitors, lock file, logging

// Import macros from logger module for use in all submodules
#[macro_use]
pub mod logger;

pub mod args;
pub mod commands;
pub mod config;
pub mod constants;
pub mod core;
pub mod display;
pub mod geo;
pub mod io;
pub mod location;
pub mod refresh;
pub mod schedule;
pub mod theme;
pub mod time_source;
pub mod utils;

mod duskmode;

pub use duskmode::Duskmode;
