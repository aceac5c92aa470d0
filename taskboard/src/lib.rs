//! `Taskboard` — terminal Kanban client library.
//!
//! Moving a card between columns is applied locally first and persisted in
//! the background; see [`board`] for how local state is reconciled with
//! the backend afterwards.

pub mod api;
pub mod app;
pub mod board;
pub mod config;
pub mod notice;
pub mod projects;
pub mod session;
pub mod ui;
