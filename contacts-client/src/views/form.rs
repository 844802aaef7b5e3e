use shared_types::{CreateContactRequest, FieldError, ValidationErrors};

/// Fields of the add-contact form, in display order.
pub const FORM_FIELDS: [FormField; 7] = [
    FormField::Name,
    FormField::Email,
    FormField::Phone,
    FormField::Address,
    FormField::Company,
    FormField::JobTitle,
    FormField::Favorite,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Name,
    Email,
    Phone,
    Address,
    Company,
    JobTitle,
    Favorite,
}

impl FormField {
    /// Wire name, as used in validation errors.
    pub fn key(self) -> &'static str {
        match self {
            FormField::Name => "name",
            FormField::Email => "email",
            FormField::Phone => "phone",
            FormField::Address => "address",
            FormField::Company => "company",
            FormField::JobTitle => "jobTitle",
            FormField::Favorite => "isFavorite",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            FormField::Name => "Name",
            FormField::Email => "Email",
            FormField::Phone => "Phone",
            FormField::Address => "Address",
            FormField::Company => "Company",
            FormField::JobTitle => "Job title",
            FormField::Favorite => "Favorite",
        }
    }

    pub fn is_required(self) -> bool {
        matches!(self, FormField::Name | FormField::Email | FormField::Phone)
    }
}

#[derive(Debug, Clone, Default)]
pub struct ContactForm {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub company: String,
    pub job_title: String,
    pub favorite: bool,
    errors: Vec<FieldError>,
    submitting: bool,
}

impl ContactForm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a text field from raw input. `Favorite` accepts y/yes/true.
    pub fn set(&mut self, field: FormField, value: &str) {
        let value = value.to_string();
        match field {
            FormField::Name => self.name = value,
            FormField::Email => self.email = value,
            FormField::Phone => self.phone = value,
            FormField::Address => self.address = value,
            FormField::Company => self.company = value,
            FormField::JobTitle => self.job_title = value,
            FormField::Favorite => {
                self.favorite = matches!(value.trim().to_lowercase().as_str(), "y" | "yes" | "true")
            }
        }
    }

    /// Builds the request body. Empty optional fields are left out.
    pub fn to_request(&self) -> CreateContactRequest {
        CreateContactRequest {
            name: self.name.clone(),
            email: self.email.clone(),
            phone: self.phone.clone(),
            address: optional(&self.address),
            company: optional(&self.company),
            job_title: optional(&self.job_title),
            is_favorite: Some(self.favorite),
        }
    }

    /// Runs the shared rules. On failure the errors are kept on the form.
    pub fn validate(&mut self) -> Result<CreateContactRequest, ValidationErrors> {
        let request = self.to_request();
        match request.validate() {
            Ok(_) => {
                self.errors.clear();
                Ok(request)
            }
            Err(errors) => {
                self.errors = errors.errors().to_vec();
                Err(errors)
            }
        }
    }

    /// Shows field errors reported by the server.
    pub fn apply_server_errors(&mut self, errors: &[FieldError]) {
        self.errors = errors.to_vec();
    }

    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    pub fn error_for(&self, field: FormField) -> Option<&str> {
        self.errors
            .iter()
            .find(|e| e.field == field.key())
            .map(|e| e.message.as_str())
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    pub fn set_submitting(&mut self, submitting: bool) {
        self.submitting = submitting;
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

fn optional(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}
