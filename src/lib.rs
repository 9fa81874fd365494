//! Form Bot: a conversational questionnaire over chat channels.

pub mod bot;
pub mod channels;
pub mod config;
pub mod error;
pub mod form;
pub mod i18n;
pub mod routes;
pub mod store;
