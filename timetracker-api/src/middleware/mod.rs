/// HTTP middleware
///
/// - [`session`]: session cookie authentication and the `CurrentUser` extractor
/// - [`acl`]: admin-only and friends-or-admin route layers
/// - [`security`]: security response headers

pub mod acl;
pub mod security;
pub mod session;
