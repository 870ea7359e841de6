//! Synchronous client for the Easypanel server-management API.
//!
//! # Overview
//! Easypanel exposes its operations as tRPC procedures under
//! `{base}/api/trpc/{group}.{procedure}`. This crate wraps them in typed
//! resource handles that validate input locally, build a parameter bag and
//! issue exactly one HTTP call.
//!
//! # Design
//! - [`Easypanel`] is the facade. It owns one [`HttpClient`] and hands out
//!   lazily built, memoized resource handles, by typed accessor or by name
//!   through [`Easypanel::resolve`].
//! - `HttpClient` is split into `build_request` and `parse_response` around
//!   a [`Transport`], so the exact wire shape is testable without a network.
//!   The default transport is blocking `ureq`.
//! - Failed input checks raise [`Error::Validation`] before anything is sent.
//! - Responses are returned as raw `serde_json::Value`; callers pick the
//!   fields they need.

pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod registry;
pub mod resources;
pub mod rpc;
pub mod validation;

#[cfg(test)]
mod testing;

pub use client::HttpClient;
pub use config::{ClientConfig, ConfigError, Settings};
pub use error::{Error, ErrorKind, FieldErrors, Result, TransportError};
pub use http::{HttpMethod, HttpRequest, HttpResponse, Transport, UreqTransport};
pub use registry::{Capability, Easypanel, Resource};
pub use rpc::{Endpoint, Params};
