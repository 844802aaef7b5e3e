pub mod debounce;
pub mod delete;
pub mod form;
pub mod list;

pub use debounce::{Debouncer, SEARCH_DEBOUNCE};
pub use delete::DeleteConfirmation;
pub use form::{ContactForm, FormField, FORM_FIELDS};
pub use list::{ContactListView, ListStats, QueryKey};
