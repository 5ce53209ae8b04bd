/// Router Module Index
///
/// Routes are split by the guard that protects them. The guard itself is attached in
/// `create_router` as a route layer, so a handler in a protected module never runs for a
/// request that failed authentication.

/// Routes accessible to all clients (anonymous, read-only, plus sign-up/sign-in).
pub mod public;

/// Routes protected by User Auth. Handlers act on the principal only.
pub mod authenticated;

/// Routes protected by Admin Auth.
pub mod admin;
