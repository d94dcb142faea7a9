//! bdcrm: a business-development pipeline CRM.
//!
//! Contacts move through a six-stage funnel driven by engagement points and
//! manual stage changes (`pipeline`). The SQLite store (`db`) persists
//! contacts, follow-ups, deals, expenses, events, users and an append-only
//! audit log; `services` combine the two, and `reports` tally KPIs.

pub mod audit;
pub mod cli;
pub mod config;
pub mod contacts;
pub mod db;
pub mod error;
pub mod events;
pub mod finance;
pub mod followups;
mod migrations;
pub mod pipeline;
pub mod reports;
pub mod services;
pub mod types;
pub mod users;
