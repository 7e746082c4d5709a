pub mod auth;
pub mod config;
pub mod controller;
pub mod conversation;
pub mod debug;
pub mod message;
pub mod oauth;
pub mod oauth_page;
pub mod routes;
pub mod session;
pub mod temperature;
pub mod token_store;
pub mod user;
