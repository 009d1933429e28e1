// User directory: registration, login and candidate profiles.
// Login checks Argon2 password hashes; there are no sessions or tokens.

pub mod accounts;
pub mod handlers;
pub mod password;
