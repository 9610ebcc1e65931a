//! Add/edit form controller.
//!
//! The form is either `Closed` or `Open` with a mode and a draft. The draft
//! is always an owned copy: editing it never touches the record it was
//! seeded from, so the list only changes once a mutation round trip
//! succeeds.

use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;
use crate::types::{NewUser, User, UserId, UserUpdate};

pub const MIN_PHONE_DIGITS: usize = 10;

/// An editable text field of the draft.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DraftField {
    FirstName,
    LastName,
    Email,
    PhoneNumber,
}

impl DraftField {
    pub const ALL: [DraftField; 4] = [
        DraftField::FirstName,
        DraftField::LastName,
        DraftField::Email,
        DraftField::PhoneNumber,
    ];

    /// Wire name of the field.
    pub fn name(self) -> &'static str {
        match self {
            DraftField::FirstName => "first_name",
            DraftField::LastName => "last_name",
            DraftField::Email => "email",
            DraftField::PhoneNumber => "phone_number",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            DraftField::FirstName => "First name",
            DraftField::LastName => "Last name",
            DraftField::Email => "Email",
            DraftField::PhoneNumber => "Phone number",
        }
    }
}

impl fmt::Display for DraftField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DraftField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DraftField::ALL
            .into_iter()
            .find(|field| field.name() == s)
            .ok_or_else(|| format!("unknown field '{s}'"))
    }
}

/// In-progress copy of a user's editable fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserDraft {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone_number: String,
    pub profile_photo: Option<Vec<u8>>,
}

impl UserDraft {
    pub fn from_user(user: &User) -> Self {
        Self {
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            email: user.email.clone(),
            phone_number: user.phone_number.clone(),
            profile_photo: user.profile_photo.clone(),
        }
    }

    pub fn get(&self, field: DraftField) -> &str {
        match field {
            DraftField::FirstName => &self.first_name,
            DraftField::LastName => &self.last_name,
            DraftField::Email => &self.email,
            DraftField::PhoneNumber => &self.phone_number,
        }
    }

    /// Return a new draft with `field` set; a missing value becomes `""`.
    pub fn with_field(mut self, field: DraftField, value: Option<&str>) -> Self {
        let value = value.unwrap_or_default().to_string();
        match field {
            DraftField::FirstName => self.first_name = value,
            DraftField::LastName => self.last_name = value,
            DraftField::Email => self.email = value,
            DraftField::PhoneNumber => self.phone_number = value,
        }
        self
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(field) = DraftField::ALL
            .into_iter()
            .find(|field| self.get(*field).trim().is_empty())
        {
            return Err(ValidationError::MissingField(field));
        }
        if !is_valid_email(&self.email) {
            return Err(ValidationError::InvalidEmail);
        }
        if !is_valid_phone_number(&self.phone_number) {
            return Err(ValidationError::InvalidPhoneNumber);
        }
        Ok(())
    }

    pub fn to_new_user(&self) -> NewUser {
        NewUser {
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            email: self.email.clone(),
            phone_number: self.phone_number.clone(),
            profile_photo: self.profile_photo.clone(),
        }
    }

    /// Text fields are always submitted; the photo only when one is set.
    pub fn to_update(&self) -> UserUpdate {
        UserUpdate {
            first_name: Some(self.first_name.clone()),
            last_name: Some(self.last_name.clone()),
            email: Some(self.email.clone()),
            phone_number: Some(self.phone_number.clone()),
            profile_photo: self.profile_photo.clone(),
        }
    }
}

/// Digits only, at least ten of them.
pub fn is_valid_phone_number(value: &str) -> bool {
    value.len() >= MIN_PHONE_DIGITS && value.chars().all(|c| c.is_ascii_digit())
}

fn is_valid_email(value: &str) -> bool {
    match value.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.is_empty()
                && !domain.contains('@')
                && !value.chars().any(char::is_whitespace)
        }
        None => false,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormMode {
    Add,
    Edit(UserId),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum FormState {
    #[default]
    Closed,
    Open { mode: FormMode, draft: UserDraft },
}

/// A validated draft handed to the submit handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub mode: FormMode,
    pub draft: UserDraft,
}

#[derive(Debug, Default)]
pub struct EditForm {
    state: FormState,
    last_error: Option<ValidationError>,
}

impl EditForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &FormState {
        &self.state
    }

    pub fn is_open(&self) -> bool {
        matches!(self.state, FormState::Open { .. })
    }

    pub fn mode(&self) -> Option<FormMode> {
        match &self.state {
            FormState::Open { mode, .. } => Some(*mode),
            FormState::Closed => None,
        }
    }

    pub fn draft(&self) -> Option<&UserDraft> {
        match &self.state {
            FormState::Open { draft, .. } => Some(draft),
            FormState::Closed => None,
        }
    }

    /// Validation failure from the last submit attempt, if any.
    pub fn last_error(&self) -> Option<&ValidationError> {
        self.last_error.as_ref()
    }

    pub fn open_add(&mut self) {
        self.open(FormMode::Add, UserDraft::default());
    }

    /// Seed a fresh draft from `user`, replacing whatever was open before.
    pub fn open_edit(&mut self, user: &User) {
        self.open(FormMode::Edit(user.id), UserDraft::from_user(user));
    }

    fn open(&mut self, mode: FormMode, draft: UserDraft) {
        self.state = FormState::Open { mode, draft };
        self.last_error = None;
    }

    pub fn set_field(&mut self, field: DraftField, value: Option<&str>) -> Result<(), ValidationError> {
        self.update_draft(|draft| draft.with_field(field, value))
    }

    pub fn set_photo(&mut self, photo: Option<Vec<u8>>) -> Result<(), ValidationError> {
        self.update_draft(|mut draft| {
            draft.profile_photo = photo;
            draft
        })
    }

    fn update_draft(&mut self, f: impl FnOnce(UserDraft) -> UserDraft) -> Result<(), ValidationError> {
        match std::mem::take(&mut self.state) {
            FormState::Open { mode, draft } => {
                self.state = FormState::Open {
                    mode,
                    draft: f(draft),
                };
                Ok(())
            }
            FormState::Closed => Err(ValidationError::FormClosed),
        }
    }

    /// Validate and hand the draft over.
    ///
    /// An invalid draft keeps the form open. A valid one closes it before the
    /// caller acts on the submission, so the form stays closed whether or not
    /// the round trip later succeeds.
    pub fn submit(&mut self) -> Result<Submission, ValidationError> {
        let FormState::Open { mode, draft } = &self.state else {
            return Err(ValidationError::FormClosed);
        };
        if let Err(err) = draft.validate() {
            self.last_error = Some(err.clone());
            return Err(err);
        }
        let submission = Submission {
            mode: *mode,
            draft: draft.clone(),
        };
        self.close();
        Ok(submission)
    }

    pub fn close(&mut self) {
        self.state = FormState::Closed;
        self.last_error = None;
    }
}
