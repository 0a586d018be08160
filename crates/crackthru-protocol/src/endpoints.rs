//! API paths, relative to the configured base URL.

pub const LOGIN: &str = "/auth/login";
pub const REGISTER: &str = "/auth/register";
pub const LOGOUT: &str = "/auth/logout";
pub const REFRESH_TOKEN: &str = "/auth/refresh-token";
pub const PROFILE: &str = "/auth/profile";
pub const ENROLL: &str = "/courses/enroll";
pub const USER_ENROLLMENTS: &str = "/courses/user/enrollments";

/// The `code` a 401 carries when the access token merely expired (as
/// opposed to being missing or invalid). Only this one is worth a
/// refresh-and-retry.
pub const DEFAULT_EXPIRY_CODE: &str = "TOKEN_EXPIRED";
