//! Router Module Index
//!
//! Organizes the application's routes by access class. The classes themselves are not
//! enforced here: the `access_gate` middleware layered in `create_router` classifies every
//! request path and redirects before any of these handlers runs.

/// Routes accessible to everyone (anonymous or signed in).
pub mod public;

/// Routes reachable only without a session (`/auth/*`).
pub mod guest;

/// Routes requiring a session (`/profile`).
pub mod authenticated;

/// Routes restricted to accounts with the `admin` role (`/admin/*`).
pub mod admin;
