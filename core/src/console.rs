//! The console's single state container.
//!
//! # Design
//! `Console` owns the page (`UserList`), the add/edit form (`EditForm`) and
//! the confirmations (`Notifications`). Display layers never mutate these
//! directly: they call the operations below, execute the returned requests,
//! and feed the responses back through `complete_load` / `complete_mutation`.
//! Every state change is announced to subscribers as a `ConsoleEvent`;
//! subscribers re-read whatever derived values they show.
//!
//! Mutations are not ordered against each other. If two target the same
//! record, whichever completes last is what the page shows.
//!
//! After `teardown` timers are cancelled, listeners dropped, and late
//! completions are ignored.

use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::client::{settle, UserClient};
use crate::config::Config;
use crate::error::{ClientError, ValidationError};
use crate::form::{DraftField, EditForm, FormMode};
use crate::http::{HttpRequest, HttpResponse, TransportError};
use crate::notify::{NotificationKind, Notifications};
use crate::sync::{LoadOutcome, LoadTicket, UserList};
use crate::types::{User, UserId, UserUpdate};

/// Something observable changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleEvent {
    PageLoading { page: u32 },
    PageLoaded { page: u32 },
    LoadFailed { message: String },
    FormOpened { mode: FormMode },
    FormChanged,
    FormInvalid(ValidationError),
    FormClosed,
    RecordAppended(UserId),
    RecordReplaced(UserId),
    RecordRemoved(UserId),
    MutationFailed { message: String },
    NotificationShown(NotificationKind),
    NotificationCleared(NotificationKind),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubscriptionId(u64);

type Listener = Box<dyn FnMut(&ConsoleEvent)>;

/// A page load waiting for its response.
#[derive(Debug, Clone)]
pub struct PendingLoad {
    ticket: LoadTicket,
    request: HttpRequest,
}

impl PendingLoad {
    pub fn request(&self) -> &HttpRequest {
        &self.request
    }

    pub fn page(&self) -> u32 {
        self.ticket.page()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MutationKind {
    Create,
    Update { id: UserId, update: UserUpdate },
    Delete { id: UserId },
}

/// A create, update or delete waiting for its response.
#[derive(Debug, Clone)]
pub struct PendingMutation {
    kind: MutationKind,
    request: HttpRequest,
}

impl PendingMutation {
    pub fn request(&self) -> &HttpRequest {
        &self.request
    }

    pub fn kind(&self) -> &MutationKind {
        &self.kind
    }
}

pub struct Console {
    client: UserClient,
    list: UserList,
    form: EditForm,
    notifications: Notifications,
    listeners: Vec<(SubscriptionId, Listener)>,
    next_subscription: u64,
    disposed: bool,
}

impl Console {
    pub fn new(client: UserClient, page_size: u32, notification_ttl: Duration) -> Result<Self, ValidationError> {
        Ok(Self {
            client,
            list: UserList::new(page_size)?,
            form: EditForm::new(),
            notifications: Notifications::new(notification_ttl),
            listeners: Vec::new(),
            next_subscription: 0,
            disposed: false,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, ValidationError> {
        Self::new(
            UserClient::new(&config.api_url),
            config.page_size,
            config.notification_ttl(),
        )
    }

    pub fn list(&self) -> &UserList {
        &self.list
    }

    pub fn form(&self) -> &EditForm {
        &self.form
    }

    pub fn notifications(&self) -> &Notifications {
        &self.notifications
    }

    pub fn client(&self) -> &UserClient {
        &self.client
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    pub fn subscribe(&mut self, listener: impl FnMut(&ConsoleEvent) + 'static) -> SubscriptionId {
        self.next_subscription += 1;
        let id = SubscriptionId(self.next_subscription);
        self.listeners.push((id, Box::new(listener)));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(sub, _)| *sub != id);
        self.listeners.len() != before
    }

    fn emit(&mut self, event: ConsoleEvent) {
        for (_, listener) in &mut self.listeners {
            listener(&event);
        }
    }

    pub fn load_page(&mut self, page: u32) -> Result<PendingLoad, ValidationError> {
        let ticket = self.list.request_page(page)?;
        Ok(self.pending_load(ticket))
    }

    pub fn reload(&mut self) -> PendingLoad {
        let ticket = self.list.reload();
        self.pending_load(ticket)
    }

    pub fn next_page(&mut self) -> Result<PendingLoad, ValidationError> {
        if !self.list.can_go_next() {
            return Err(ValidationError::PageOutOfRange {
                page: self.list.page().saturating_add(1),
                last: self.list.total_pages().unwrap_or(1).max(1),
            });
        }
        self.load_page(self.list.page() + 1)
    }

    pub fn previous_page(&mut self) -> Result<PendingLoad, ValidationError> {
        self.load_page(self.list.page().saturating_sub(1))
    }

    pub fn set_page_size(&mut self, page_size: u32) -> Result<PendingLoad, ValidationError> {
        let ticket = self.list.set_page_size(page_size)?;
        Ok(self.pending_load(ticket))
    }

    fn pending_load(&mut self, ticket: LoadTicket) -> PendingLoad {
        let request = self.client.build_list_users(ticket.page(), ticket.page_size());
        self.emit(ConsoleEvent::PageLoading { page: ticket.page() });
        PendingLoad { ticket, request }
    }

    pub fn complete_load(
        &mut self,
        pending: PendingLoad,
        result: Result<HttpResponse, TransportError>,
    ) -> LoadOutcome {
        if self.disposed {
            debug!("Ignoring page load completed after teardown");
            return LoadOutcome::Stale;
        }
        let parsed = settle(result, |response| self.client.parse_list_users(response));
        let outcome = self.list.complete_load(pending.ticket, parsed);
        match &outcome {
            LoadOutcome::Applied => self.emit(ConsoleEvent::PageLoaded {
                page: pending.ticket.page(),
            }),
            LoadOutcome::Failed(message) => self.emit(ConsoleEvent::LoadFailed {
                message: message.clone(),
            }),
            LoadOutcome::Stale => {}
        }
        outcome
    }

    pub fn open_add(&mut self) {
        self.form.open_add();
        self.emit(ConsoleEvent::FormOpened { mode: FormMode::Add });
    }

    /// Open the form on a record of the current page.
    pub fn open_edit(&mut self, id: UserId) -> Result<(), ValidationError> {
        let user = self.list.get(id).ok_or(ValidationError::UnknownRecord(id))?;
        self.form.open_edit(user);
        self.emit(ConsoleEvent::FormOpened {
            mode: FormMode::Edit(id),
        });
        Ok(())
    }

    pub fn set_field(&mut self, field: DraftField, value: Option<&str>) -> Result<(), ValidationError> {
        self.form.set_field(field, value)?;
        self.emit(ConsoleEvent::FormChanged);
        Ok(())
    }

    pub fn set_photo(&mut self, photo: Option<Vec<u8>>) -> Result<(), ValidationError> {
        self.form.set_photo(photo)?;
        self.emit(ConsoleEvent::FormChanged);
        Ok(())
    }

    pub fn close_form(&mut self) {
        self.form.close();
        self.emit(ConsoleEvent::FormClosed);
    }

    /// Validate the open form and turn it into a create or update request.
    ///
    /// On validation failure the form stays open. Otherwise the form is
    /// closed before the request is returned.
    pub fn submit_form(&mut self) -> Result<PendingMutation, ClientError> {
        let submission = match self.form.submit() {
            Ok(submission) => submission,
            Err(err) => {
                self.emit(ConsoleEvent::FormInvalid(err.clone()));
                return Err(err.into());
            }
        };
        self.emit(ConsoleEvent::FormClosed);

        let built = match submission.mode {
            FormMode::Add => self
                .client
                .build_create_user(&submission.draft.to_new_user())
                .map(|request| PendingMutation {
                    kind: MutationKind::Create,
                    request,
                }),
            FormMode::Edit(id) => {
                let update = submission.draft.to_update();
                self.client
                    .build_update_user(id, &update)
                    .map(|request| PendingMutation {
                        kind: MutationKind::Update { id, update },
                        request,
                    })
            }
        };
        built.map_err(|err| self.fail_mutation(err))
    }

    pub fn request_delete(&mut self, id: UserId) -> PendingMutation {
        info!("Deleting user {}", id);
        PendingMutation {
            kind: MutationKind::Delete { id },
            request: self.client.build_delete_user(id),
        }
    }

    /// Apply a mutation's outcome: patch the page and show a confirmation on
    /// success, record the message on failure.
    pub fn complete_mutation(
        &mut self,
        pending: PendingMutation,
        result: Result<HttpResponse, TransportError>,
        now: Instant,
    ) -> Result<(), ClientError> {
        if self.disposed {
            debug!("Ignoring mutation completed after teardown");
            return Ok(());
        }
        match pending.kind {
            MutationKind::Create => {
                let user: User = settle(result, |response| self.client.parse_create_user(response))
                    .map_err(|err| self.fail_mutation(err))?;
                let id = user.id;
                info!("Created user {}", id);
                self.list.clear_error();
                self.list.append(user);
                self.emit(ConsoleEvent::RecordAppended(id));
                self.notify(NotificationKind::Saved, now);
            }
            MutationKind::Update { id, update } => {
                settle(result, |response| self.client.parse_update_user(response))
                    .map_err(|err| self.fail_mutation(err))?;
                info!("Updated user {}", id);
                self.list.clear_error();
                if self.list.replace(id, &update) {
                    self.emit(ConsoleEvent::RecordReplaced(id));
                } else {
                    debug!("Updated user {} is no longer on the current page", id);
                }
                self.notify(NotificationKind::Saved, now);
            }
            MutationKind::Delete { id } => {
                settle(result, |response| self.client.parse_delete_user(response))
                    .map_err(|err| self.fail_mutation(err))?;
                self.list.clear_error();
                if self.list.remove(id) {
                    self.emit(ConsoleEvent::RecordRemoved(id));
                }
                self.notify(NotificationKind::Deleted, now);
            }
        }
        Ok(())
    }

    fn fail_mutation(&mut self, err: ClientError) -> ClientError {
        warn!("Mutation failed: {}", err);
        let message = err.user_message();
        self.list.set_error(message.clone());
        self.emit(ConsoleEvent::MutationFailed { message });
        err
    }

    fn notify(&mut self, kind: NotificationKind, now: Instant) {
        self.notifications.fire(kind, now);
        self.emit(ConsoleEvent::NotificationShown(kind));
    }

    /// Run notification clears due at `now`.
    pub fn tick(&mut self, now: Instant) {
        if self.disposed {
            return;
        }
        for kind in self.notifications.advance(now) {
            self.emit(ConsoleEvent::NotificationCleared(kind));
        }
    }

    pub fn teardown(&mut self) {
        self.notifications.cancel_all();
        self.listeners.clear();
        self.disposed = true;
        debug!("Console torn down");
    }
}

impl Drop for Console {
    fn drop(&mut self) {
        if !self.disposed {
            self.teardown();
        }
    }
}
