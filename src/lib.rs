//! Vigil - a careers-page change monitor and an AI-content detection bot.
//!
//! # Overview
//!
//! Two independent subsystems share this crate, shipped as two binaries:
//!
//! - `vigil-monitor` polls a target page on a fixed interval, fingerprints
//!   the content (SHA-256 digest or extracted job-id set), compares against
//!   persisted state, and notifies an admin over Twilio WhatsApp/SMS on
//!   change. A daily-summary state machine sends at most one "no changes
//!   today" message per UTC day, suppressed on days where a change
//!   notification already fired.
//! - `vigil-bot` serves webhook endpoints for WhatsApp Cloud API and
//!   Twilio. Inbound images and videos run through an ordered fallback
//!   chain of remote classification models, scores are aggregated into an
//!   AI-vs-authentic verdict with clamped confidence, and the verdict goes
//!   back as a formatted reply.
//!
//! # Modules
//!
//! - [`monitor`], [`fingerprint`], [`storage`]: the change monitor
//! - [`api`], [`webhook`], [`classify`], [`media`], [`video`], [`reply`],
//!   [`stats`]: the detection bot
//! - [`config`], [`error`], [`messaging`], [`model`]: shared plumbing

pub mod api;
pub mod classify;
pub mod config;
pub mod error;
pub mod fingerprint;
pub mod media;
pub mod messaging;
pub mod model;
pub mod monitor;
pub mod reply;
pub mod stats;
pub mod storage;
pub mod video;
pub mod webhook;
