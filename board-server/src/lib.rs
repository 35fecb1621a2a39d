//! Live departure boards.
//!
//! Polls a schedule endpoint for the station on screen and serves the
//! result as auto-refreshing boards in three layouts.

pub mod board;
pub mod config;
pub mod poll;
pub mod schedule;
pub mod ticker;
pub mod transform;
pub mod web;

#[cfg(test)]
mod fixtures;
