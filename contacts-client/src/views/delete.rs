pub const DELETE_TITLE: &str = "Delete Contact";
pub const DELETE_MESSAGE: &str =
    "Are you sure you want to delete this contact? This action cannot be undone.";

/// A pending delete waiting for the user to confirm.
#[derive(Debug, Clone, Default)]
pub struct DeleteConfirmation {
    pending: Option<i64>,
    deleting: bool,
}

impl DeleteConfirmation {
    pub fn request(&mut self, id: i64) {
        self.pending = Some(id);
        self.deleting = false;
    }

    pub fn cancel(&mut self) {
        self.pending = None;
        self.deleting = false;
    }

    pub fn pending(&self) -> Option<i64> {
        self.pending
    }

    pub fn is_open(&self) -> bool {
        self.pending.is_some()
    }

    /// Returns the id to delete. The dialog stays open until [`finish`]
    /// is called so a failure can be reported against it.
    ///
    /// [`finish`]: DeleteConfirmation::finish
    pub fn confirm(&mut self) -> Option<i64> {
        let id = self.pending?;
        self.deleting = true;
        Some(id)
    }

    pub fn is_deleting(&self) -> bool {
        self.deleting
    }

    /// Closes the dialog on success; keeps it open on failure.
    pub fn finish(&mut self, succeeded: bool) {
        self.deleting = false;
        if succeeded {
            self.pending = None;
        }
    }
}
