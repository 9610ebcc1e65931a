//! Blocking driver that runs console round trips through a `Transport`.
//!
//! Hosts that can afford to wait on each request (the CLI, tests) use
//! `Session` instead of shuttling `PendingLoad` / `PendingMutation` values
//! themselves. Timestamps come from `Instant::now()`.

use std::time::Instant;

use crate::console::Console;
use crate::error::{ClientError, ValidationError};
use crate::health::{HealthClient, HealthSummary};
use crate::http::Transport;
use crate::sync::LoadOutcome;
use crate::types::UserId;

pub struct Session<T> {
    console: Console,
    health: HealthClient,
    transport: T,
}

impl<T: Transport> Session<T> {
    pub fn new(console: Console, transport: T) -> Self {
        let health = HealthClient::new(console.client().base_url());
        Self {
            console,
            health,
            transport,
        }
    }

    pub fn console(&self) -> &Console {
        &self.console
    }

    /// Form edits and subscriptions go through the console directly.
    pub fn console_mut(&mut self) -> &mut Console {
        &mut self.console
    }

    pub fn load_page(&mut self, page: u32) -> Result<LoadOutcome, ValidationError> {
        let pending = self.console.load_page(page)?;
        let result = self.transport.execute(pending.request());
        Ok(self.console.complete_load(pending, result))
    }

    pub fn reload(&mut self) -> LoadOutcome {
        let pending = self.console.reload();
        let result = self.transport.execute(pending.request());
        self.console.complete_load(pending, result)
    }

    pub fn next_page(&mut self) -> Result<LoadOutcome, ValidationError> {
        let pending = self.console.next_page()?;
        let result = self.transport.execute(pending.request());
        Ok(self.console.complete_load(pending, result))
    }

    pub fn previous_page(&mut self) -> Result<LoadOutcome, ValidationError> {
        let pending = self.console.previous_page()?;
        let result = self.transport.execute(pending.request());
        Ok(self.console.complete_load(pending, result))
    }

    pub fn set_page_size(&mut self, page_size: u32) -> Result<LoadOutcome, ValidationError> {
        let pending = self.console.set_page_size(page_size)?;
        let result = self.transport.execute(pending.request());
        Ok(self.console.complete_load(pending, result))
    }

    pub fn submit_form(&mut self) -> Result<(), ClientError> {
        let pending = self.console.submit_form()?;
        let result = self.transport.execute(pending.request());
        self.console.complete_mutation(pending, result, Instant::now())
    }

    pub fn delete(&mut self, id: UserId) -> Result<(), ClientError> {
        let pending = self.console.request_delete(id);
        let result = self.transport.execute(pending.request());
        self.console.complete_mutation(pending, result, Instant::now())
    }

    pub fn tick(&mut self) {
        self.console.tick(Instant::now());
    }

    pub fn check_health(&self) -> HealthSummary {
        self.health.check_all(&self.transport)
    }
}
