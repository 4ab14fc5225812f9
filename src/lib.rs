//! Billing engine for studio and academy back-offices
//!
//! This crate computes class entitlements and outstanding balances for
//! student subscriptions, settles instructor pay from attendance, and keeps
//! a cash book with the value-added tax split out of gross amounts.

#![warn(missing_docs)]

pub mod api;
pub mod calculation;
pub mod clock;
pub mod config;
pub mod engine;
pub mod error;
pub mod models;
pub mod store;
