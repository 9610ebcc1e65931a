//! Client core for the users administration console.
//!
//! # Overview
//! Builds `HttpRequest` values and parses `HttpResponse` values without
//! touching the network (host-does-IO pattern), and keeps one page of user
//! records in step with the server across create, update and delete.
//!
//! # Design
//! - `UserClient` and `HealthClient` are stateless request builders and
//!   response parsers.
//! - `Console` is the only stateful piece: it owns the page (`UserList`),
//!   the add/edit form (`EditForm`) and the confirmations
//!   (`Notifications`), and announces changes to subscribers.
//! - Time is passed in, never read, so timers are deterministic under test.
//! - `Session` runs round trips through any `Transport` for blocking hosts.
//!   The `ureq` feature adds `transport::UreqTransport`.

pub mod client;
pub mod config;
pub mod console;
pub mod error;
pub mod form;
pub mod health;
pub mod http;
pub mod notify;
pub mod session;
pub mod sync;
#[cfg(feature = "ureq")]
pub mod transport;
pub mod types;

pub use client::UserClient;
pub use config::Config;
pub use console::{Console, ConsoleEvent, MutationKind, PendingLoad, PendingMutation, SubscriptionId};
pub use error::{ClientError, ValidationError};
pub use form::{DraftField, EditForm, FormMode, FormState, Submission, UserDraft};
pub use health::{HealthClient, HealthReport, HealthSummary};
pub use http::{HttpMethod, HttpRequest, HttpResponse, Transport, TransportError};
pub use notify::{NotificationKind, Notifications};
pub use session::Session;
pub use sync::{LoadOutcome, LoadTicket, UserList};
pub use types::{NewUser, User, UserId, UserPage, UserUpdate};
