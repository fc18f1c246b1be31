//! fff-client — async client for the fantasy football stats API.
//!
//! Built around two small pieces: a [`toasts::ToastStore`] holding transient
//! user-facing notifications, and an [`client::ApiClient`] whose failure
//! classifier turns every failed request into exactly one toast before
//! re-signaling the error to the caller. On top of those sit typed wrappers
//! for the read endpoints ([`api`]) and SSE chat streaming ([`chat`]).

pub mod api;
pub mod chat;
pub mod client;
pub mod config;
pub mod error;
pub mod toasts;
