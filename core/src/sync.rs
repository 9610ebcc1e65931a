//! Paginated user list kept in step with the server.
//!
//! # Design
//! `UserList` owns the current page and is changed in two ways only:
//! a page load (request a `LoadTicket`, then complete it with the result)
//! and the three local patches applied after a successful mutation
//! (`append`, `replace`, `remove`). Patches never re-fetch, re-sort or touch
//! `total_count`, so the total may read stale until the next load.
//!
//! Loads are not cancellable. Each ticket carries a token and only the most
//! recently issued ticket may complete; older responses are dropped as
//! stale. A failed load keeps the previously shown records, page and page
//! size, and records the error message beside them.

use tracing::{debug, warn};

use crate::error::{ClientError, ValidationError};
use crate::types::{User, UserId, UserPage, UserUpdate};

pub const DEFAULT_PAGE_SIZE: u32 = 6;
pub const MAX_PAGE_SIZE: u32 = 100;

/// Handle for one in-flight page load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket {
    token: u64,
    page: u32,
    page_size: u32,
}

impl LoadTicket {
    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    Applied,
    Failed(String),
    /// A newer load was requested after this one; the result was dropped.
    Stale,
}

#[derive(Debug, Clone)]
pub struct UserList {
    page: u32,
    page_size: u32,
    total_count: Option<u64>,
    records: Vec<User>,
    loading: bool,
    error: Option<String>,
    latest_token: u64,
}

impl Default for UserList {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
            total_count: None,
            records: Vec::new(),
            loading: false,
            error: None,
            latest_token: 0,
        }
    }
}

impl UserList {
    pub fn new(page_size: u32) -> Result<Self, ValidationError> {
        check_page_size(page_size)?;
        Ok(Self {
            page_size,
            ..Self::default()
        })
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// `None` until the first load completes.
    pub fn total_count(&self) -> Option<u64> {
        self.total_count
    }

    /// `ceil(total_count / page_size)`, or `None` before the first load.
    pub fn total_pages(&self) -> Option<u32> {
        self.total_count.map(|total| {
            let pages = total.div_ceil(u64::from(self.page_size));
            u32::try_from(pages).unwrap_or(u32::MAX)
        })
    }

    pub fn records(&self) -> &[User] {
        &self.records
    }

    pub fn get(&self, id: UserId) -> Option<&User> {
        self.records.iter().find(|user| user.id == id)
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn can_go_previous(&self) -> bool {
        self.page > 1
    }

    pub fn can_go_next(&self) -> bool {
        self.total_pages().is_some_and(|last| self.page < last)
    }

    /// Start loading `page`.
    ///
    /// Pages below 1 are rejected, as are pages past the last one once the
    /// total is known. An empty collection still has page 1. The cursor only
    /// moves when the load succeeds.
    pub fn request_page(&mut self, page: u32) -> Result<LoadTicket, ValidationError> {
        let last = self.total_pages().map(|pages| pages.max(1));
        if page < 1 || last.is_some_and(|last| page > last) {
            return Err(ValidationError::PageOutOfRange {
                page,
                last: last.unwrap_or(1),
            });
        }
        Ok(self.issue_ticket(page, self.page_size))
    }

    /// Reload the current page.
    pub fn reload(&mut self) -> LoadTicket {
        self.issue_ticket(self.page, self.page_size)
    }

    /// Load page 1 at a new page size. The size is kept once the load succeeds.
    pub fn set_page_size(&mut self, page_size: u32) -> Result<LoadTicket, ValidationError> {
        check_page_size(page_size)?;
        Ok(self.issue_ticket(1, page_size))
    }

    fn issue_ticket(&mut self, page: u32, page_size: u32) -> LoadTicket {
        self.latest_token += 1;
        self.loading = true;
        debug!("Loading page {} (size {})", page, page_size);
        LoadTicket {
            token: self.latest_token,
            page,
            page_size,
        }
    }

    pub fn complete_load(&mut self, ticket: LoadTicket, result: Result<UserPage, ClientError>) -> LoadOutcome {
        if ticket.token != self.latest_token {
            debug!("Dropping stale response for page {}", ticket.page);
            return LoadOutcome::Stale;
        }
        self.loading = false;
        match result {
            Ok(page) => {
                debug!(
                    "Loaded page {}: {} records of {}",
                    ticket.page,
                    page.data.len(),
                    page.total_count
                );
                self.page = ticket.page;
                self.page_size = ticket.page_size;
                self.records = page.data;
                self.total_count = Some(page.total_count);
                self.error = None;
                LoadOutcome::Applied
            }
            Err(err) => {
                warn!("Loading page {} failed: {}", ticket.page, err);
                let message = err.user_message();
                self.error = Some(message.clone());
                LoadOutcome::Failed(message)
            }
        }
    }

    /// Add a newly created record at the end of the current page.
    pub fn append(&mut self, user: User) {
        self.records.push(user);
    }

    /// Merge `update` over the record with `id`. Returns whether it was found.
    pub fn replace(&mut self, id: UserId, update: &UserUpdate) -> bool {
        match self.records.iter_mut().find(|user| user.id == id) {
            Some(user) => {
                user.apply(update);
                true
            }
            None => false,
        }
    }

    /// Drop the record with `id`. Returns whether it was found.
    pub fn remove(&mut self, id: UserId) -> bool {
        let before = self.records.len();
        self.records.retain(|user| user.id != id);
        self.records.len() != before
    }

    pub fn set_error(&mut self, message: String) {
        self.error = Some(message);
    }

    pub fn clear_error(&mut self) {
        self.error = None;
    }
}

fn check_page_size(page_size: u32) -> Result<(), ValidationError> {
    if (1..=MAX_PAGE_SIZE).contains(&page_size) {
        Ok(())
    } else {
        Err(ValidationError::InvalidPageSize(page_size))
    }
}
