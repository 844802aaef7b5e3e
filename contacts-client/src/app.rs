//! Wires the view models to the HTTP client.

use shared_types::Contact;

use crate::api::{ClientError, ContactsApi};
use crate::views::{ContactForm, ContactListView, DeleteConfirmation};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Success(String),
    Error(String),
}

pub struct ContactsApp {
    api: ContactsApi,
    pub list: ContactListView,
    pub form: ContactForm,
    pub delete: DeleteConfirmation,
    notice: Option<Notice>,
}

impl ContactsApp {
    pub fn new(api: ContactsApi) -> Self {
        Self {
            api,
            list: ContactListView::default(),
            form: ContactForm::new(),
            delete: DeleteConfirmation::default(),
            notice: None,
        }
    }

    pub fn api(&self) -> &ContactsApi {
        &self.api
    }

    /// Fetches the current page if the list asks for it. Returns true when
    /// a request was made.
    pub async fn refresh(&mut self) -> bool {
        if !self.list.needs_fetch() {
            return false;
        }

        let key = self.list.begin_fetch();
        let result = self
            .api
            .list_contacts(key.page, self.list.limit(), key.search())
            .await
            .map_err(|e| e.to_string());
        self.list.finish_fetch(key, result);
        true
    }

    /// Validates and submits the add form. On success the form is cleared
    /// and the list is marked stale.
    pub async fn submit_form(&mut self) -> Option<Contact> {
        let request = self.form.validate().ok()?;

        self.form.set_submitting(true);
        let result = self.api.create_contact(&request).await;
        self.form.set_submitting(false);

        match result {
            Ok(contact) => {
                tracing::info!("Created contact {}", contact.id);
                self.form.reset();
                self.list.invalidate();
                self.notice = Some(Notice::Success("Contact added successfully!".to_string()));
                Some(contact)
            }
            Err(e) => {
                self.form.apply_server_errors(e.field_errors());
                self.notice = Some(Notice::Error(failure_message(&e, "Failed to add contact")));
                None
            }
        }
    }

    pub fn request_delete(&mut self, id: i64) {
        self.delete.request(id);
    }

    pub fn cancel_delete(&mut self) {
        self.delete.cancel();
    }

    /// Deletes the pending contact, if any. Returns true on success.
    pub async fn confirm_delete(&mut self) -> bool {
        let Some(id) = self.delete.confirm() else {
            return false;
        };

        match self.api.delete_contact(id).await {
            Ok(_) => {
                tracing::info!("Deleted contact {}", id);
                self.delete.finish(true);
                self.list.invalidate();
                self.notice = Some(Notice::Success("Contact deleted successfully!".to_string()));
                true
            }
            Err(e) => {
                self.delete.finish(false);
                self.notice = Some(Notice::Error(failure_message(
                    &e,
                    "Failed to delete contact",
                )));
                false
            }
        }
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn take_notice(&mut self) -> Option<Notice> {
        self.notice.take()
    }
}

/// The server's error message when it sent one, otherwise `fallback`.
fn failure_message(error: &ClientError, fallback: &str) -> String {
    match error {
        ClientError::Api { message, .. } => message.clone(),
        ClientError::Network(e) => {
            tracing::warn!("{}: {}", fallback, e);
            fallback.to_string()
        }
    }
}
