pub mod auth;
pub mod config;
pub mod database;
pub mod handlers;
pub mod services;
pub mod utils;

#[cfg(test)]
mod test;
