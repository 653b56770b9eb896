//! Client (customer) model.

use super::validation::not_blank;
use super::RecordStatus;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// A billed customer.
///
/// `invoice_count` is a cached counter: it is bumped whenever an invoice is
/// created for the client and is never recomputed from the invoice list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Client {
    pub id: String,
    pub name: String,
    pub contact: String,
    pub email: String,
    pub phone: String,
    pub location: String,
    pub status: RecordStatus,
    #[serde(default)]
    pub invoice_count: u32,
}

impl Client {
    /// Case-insensitive match against name, contact, email and location.
    /// `needle` must be lowercase.
    pub fn matches(&self, needle: &str) -> bool {
        [&self.name, &self.contact, &self.email, &self.location]
            .iter()
            .any(|field| field.to_lowercase().contains(needle))
    }
}

/// Input for adding a client.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewClient {
    #[validate(custom(function = "not_blank"))]
    pub name: String,
    #[serde(default)]
    pub contact: String,
    #[validate(email)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub status: RecordStatus,
}

/// Partial update for a client.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateClient {
    #[validate(custom(function = "not_blank"))]
    pub name: Option<String>,
    pub contact: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    pub phone: Option<String>,
    pub location: Option<String>,
    pub status: Option<RecordStatus>,
}

impl UpdateClient {
    pub fn apply_to(self, client: &mut Client) {
        if let Some(name) = self.name {
            client.name = name.trim().to_string();
        }
        if let Some(contact) = self.contact {
            client.contact = contact;
        }
        if let Some(email) = self.email {
            client.email = email;
        }
        if let Some(phone) = self.phone {
            client.phone = phone;
        }
        if let Some(location) = self.location {
            client.location = location;
        }
        if let Some(status) = self.status {
            client.status = status;
        }
    }
}
