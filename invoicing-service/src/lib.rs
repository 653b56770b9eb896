//! invoicing-service: products, clients, invoices and collections with
//! dashboard metrics and PDF invoice documents.

pub mod config;
pub mod documents;
pub mod handlers;
pub mod models;
pub mod services;
pub mod startup;
