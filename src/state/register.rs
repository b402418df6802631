//! Registration form workflow for the `/register` page.
//!
//! The page itself only renders; loading the choices, defaulting answers,
//! validating, and submitting live here so they run against any session.
//! After a successful submit the session's user and registration are
//! refreshed through the same stages the bootstrap uses.

#[cfg(test)]
#[path = "register_test.rs"]
mod register_test;

use serde_json::Value;

use super::session::{AuthSession, SessionError};
use crate::net::error::ApiError;
use crate::net::types::{Metadata, MetadataDatatype, MetadataField, NewRegistration, Registration, UserUpdate};

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum RegisterError {
    #[error("no signed-in user")]
    NotSignedIn,
    #[error("missing required field: {0}")]
    MissingField(String),
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error(transparent)]
    Session(#[from] SessionError),
}

/// What the visitor has entered so far.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RegistrationForm {
    pub email: Option<String>,
    pub metadata: Metadata,
}

/// Everything the page needs to render the form.
#[derive(Clone, Debug, PartialEq)]
pub struct FormData {
    /// Addresses the visitor may register with.
    pub emails: Vec<String>,
    pub fields: Vec<MetadataField>,
    /// Pre-filled answers.
    pub form: RegistrationForm,
}

/// Initial answer for a field: `false`, `""`, or `null` by datatype.
#[must_use]
pub fn default_value(field: &MetadataField) -> Value {
    match field.datatype {
        MetadataDatatype::Boolean => Value::Bool(false),
        MetadataDatatype::String => Value::String(String::new()),
        MetadataDatatype::Other => Value::Null,
    }
}

#[must_use]
pub fn default_metadata(fields: &[MetadataField]) -> Metadata {
    fields.iter().map(|f| (f.name.clone(), default_value(f))).collect()
}

fn is_answered(field: &MetadataField, value: Option<&Value>) -> bool {
    match (field.datatype, value) {
        (_, None | Some(Value::Null)) => false,
        (MetadataDatatype::Boolean, Some(value)) => value.as_bool() == Some(true),
        (_, Some(Value::String(s))) => !s.trim().is_empty(),
        _ => true,
    }
}

/// Check the form the way the browser would before submitting.
///
/// Required booleans must be ticked; other required fields must be non-null
/// and, for strings, non-blank.
pub fn validate(fields: &[MetadataField], form: &RegistrationForm) -> Result<(), RegisterError> {
    if form.email.as_deref().is_none_or(|e| e.trim().is_empty()) {
        return Err(RegisterError::MissingField("email".to_owned()));
    }
    for field in fields.iter().filter(|f| f.required) {
        if !is_answered(field, form.metadata.get(&field.name)) {
            return Err(RegisterError::MissingField(field.name.clone()));
        }
    }
    Ok(())
}

/// Fetch the visitor's emails and the event's questions, with defaults filled in.
pub async fn load_form(session: &AuthSession) -> Result<FormData, RegisterError> {
    let (Some(token), Some(user)) = (session.token(), session.user()) else {
        return Err(RegisterError::NotSignedIn);
    };
    let api = session.api();
    let emails = api.fetch_user_emails(&user.id, &token).await?;
    let fields = api.fetch_metadata(&token).await?;
    let form = RegistrationForm { email: Some(user.email), metadata: default_metadata(&fields) };
    Ok(FormData { emails, fields, form })
}

/// Create the registration, updating the user's email first if it changed.
///
/// Returns the session's registration after it has been reloaded.
pub async fn submit(
    session: &AuthSession,
    fields: &[MetadataField],
    form: &RegistrationForm,
) -> Result<Option<Registration>, RegisterError> {
    let (Some(token), Some(user)) = (session.token(), session.user()) else {
        return Err(RegisterError::NotSignedIn);
    };
    validate(fields, form)?;

    let api = session.api();
    let email_changed = form.email.as_deref().is_some_and(|e| e != user.email);
    if email_changed {
        let update = UserUpdate { email: form.email.clone() };
        api.update_user(&user.id, &token, &update).await?;
    }

    let body = NewRegistration { metadata: form.metadata.clone() };
    api.create_registration(&user.id, &token, &body).await?;

    if email_changed {
        session.get_user().await?;
    }
    Ok(session.get_registration().await?)
}
