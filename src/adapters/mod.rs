// Adapters layer: concrete implementations of the domain ports for the terminal and SMTP.

pub mod prompt;
pub mod smtp;
