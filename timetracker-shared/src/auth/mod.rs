/// Authentication and authorization primitives
///
/// - [`password`]: Argon2id hashing and constant-time verification
/// - [`acl`]: the acting [`acl::Principal`] and the owner / admin /
///   friends access rules
///
/// Session issuance and lookup live in [`crate::usecase::auth`].

pub mod acl;
pub mod password;
