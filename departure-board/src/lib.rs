//! Live departure board sensor.
//!
//! Polls transport.opendata.ch for each configured station on a fixed
//! interval and exposes "minutes until the next departure", together with
//! the upcoming departures, as a sensor value over HTTP.

pub mod config;
pub mod coordinator;
pub mod domain;
pub mod opendata;
pub mod registry;
pub mod setup;
pub mod web;
