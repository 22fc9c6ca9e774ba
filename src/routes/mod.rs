/// Router Module Index
///
/// Organizes the application's routing into security-segregated modules.
/// Access control is applied explicitly at the module level (via Axum
/// layers and in-handler role checks), never declaratively.
///
/// The three modules map directly to the defined access roles.

/// Routes accessible to anonymous clients: liveness, login, registration,
/// and the author page.
pub mod public;

/// Routes protected by the auth middleware; require a valid session.
pub mod authenticated;

/// Routes restricted to users carrying the ADMIN role.
pub mod admin;
