//! `agrobase-api` — HTTP surface for the producer registry.

pub mod app;
