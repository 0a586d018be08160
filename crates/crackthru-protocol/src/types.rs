//! Wire types for the CRACKTHRU HTTP API.
//!
//! Every struct here mirrors a JSON shape the backend sends or expects.
//! The backend is written in JavaScript, so field names on the wire are
//! camelCase (`enrolledCourseIds`) while the Rust fields are snake_case;
//! `#[serde(rename_all = "camelCase")]` bridges the two.
//!
//! The backend is also a little inconsistent about IDs (`id` in some
//! responses, Mongo-style `_id` in others). `#[serde(alias = ...)]`
//! accepts every spelling on input and always writes the canonical one.

use serde::{Deserialize, Deserializer, Serialize};

// ---------------------------------------------------------------------------
// User profile (the Session payload)
// ---------------------------------------------------------------------------

/// The authenticated user, as returned by login, signup, refresh, and
/// profile responses.
///
/// The client holds at most one of these at a time (inside the session
/// manager's state) and replaces it wholesale whenever the server sends
/// a fresh copy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    /// Server-assigned user ID.
    #[serde(alias = "id", alias = "_id")]
    pub user_id: String,

    pub name: String,

    pub email: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organization: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,

    /// State/province (not session state).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,

    /// IDs of courses this user is enrolled in. Missing on the wire
    /// means "none".
    #[serde(default, alias = "enrolledCourses")]
    pub enrolled_course_ids: Vec<String>,
}

impl UserProfile {
    /// Returns `true` if the user is already enrolled in `course_id`.
    pub fn is_enrolled_in(&self, course_id: &str) -> bool {
        self.enrolled_course_ids.iter().any(|id| id == course_id)
    }
}

// ---------------------------------------------------------------------------
// Request bodies
// ---------------------------------------------------------------------------

/// Body of `POST /auth/login`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

/// Body of `POST /auth/register`: the account-creation form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupForm {
    pub name: String,
    pub email: String,
    pub password: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organization: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
}

/// Body of `POST /courses/enroll`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrollRequest {
    pub course_id: String,
}

// ---------------------------------------------------------------------------
// Enrollments
// ---------------------------------------------------------------------------

/// Where an enrollment is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnrollmentStatus {
    Enrolled,
    Completed,
    Cancelled,
}

/// A snapshot of the course embedded in an enrollment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseSummary {
    #[serde(alias = "_id")]
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
}

/// One course enrollment for the current user.
///
/// Read-only on the client: the backend owns it, the dashboard caches a
/// copy and refetches on demand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Enrollment {
    #[serde(alias = "_id")]
    pub id: String,
    pub course: CourseSummary,
    /// ISO-8601 timestamp, kept as the server's string.
    #[serde(alias = "enrolledAt")]
    pub enrollment_date: String,
    pub status: EnrollmentStatus,
    /// Percent complete, always within `0..=100`.
    #[serde(default, deserialize_with = "clamped_progress")]
    pub progress: u8,
}

/// Accepts any JSON number for `progress` and clamps it to `0..=100`.
///
/// The backend occasionally sends fractional or out-of-range values
/// (e.g. `100.4` after rounding drift). Rejecting the whole enrollment
/// for that would hide it from the dashboard, so we clamp instead.
fn clamped_progress<'de, D>(deserializer: D) -> Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = f64::deserialize(deserializer)?;
    if raw.is_nan() {
        return Ok(0);
    }
    Ok(raw.round().clamp(0.0, 100.0) as u8)
}

// ---------------------------------------------------------------------------
// Response envelope
// ---------------------------------------------------------------------------

/// One field-level validation message (`400` responses).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    #[serde(alias = "path", alias = "param")]
    pub field: String,
    #[serde(alias = "msg")]
    pub message: String,
}

/// The envelope every API response uses.
///
/// ```json
/// { "success": false, "message": "Token expired", "code": "TOKEN_EXPIRED" }
/// { "success": true, "user": { "userId": "u1", ... } }
/// ```
///
/// Only `success` is always present. Which of the payload fields is set
/// depends on the endpoint, so they are all optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse {
    #[serde(default)]
    pub success: bool,

    /// Human-readable message; shown to the user on failures.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    /// Machine-readable error code, e.g. the token-expiry marker.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,

    /// Field-level validation errors.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<FieldError>,

    /// Generic payload for endpoints that don't use a named field.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<UserProfile>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enrollments: Option<Vec<Enrollment>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enrollment: Option<Enrollment>,
}

impl ApiResponse {
    /// A successful response carrying a user.
    pub fn with_user(user: UserProfile) -> Self {
        Self {
            success: true,
            user: Some(user),
            ..Default::default()
        }
    }

    /// A failed response with a message.
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
            ..Default::default()
        }
    }

    /// Sets the machine-readable error code.
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    /// Returns `true` if `code` matches `expected`.
    pub fn has_code(&self, expected: &str) -> bool {
        self.code.as_deref() == Some(expected)
    }
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    //! JSON shape tests. A mismatch here means the client can't read
    //! what the backend actually sends, so these pin the wire format.

    use super::*;
    use serde_json::json;

    fn profile_json() -> serde_json::Value {
        json!({
            "userId": "u-1",
            "name": "Asha",
            "email": "a@b.com",
            "phone": "+91 98765 43210",
            "enrolledCourseIds": ["c-1"]
        })
    }

    // =====================================================================
    // UserProfile
    // =====================================================================

    #[test]
    fn test_user_profile_reads_camel_case() {
        let user: UserProfile = serde_json::from_value(profile_json()).unwrap();
        assert_eq!(user.user_id, "u-1");
        assert_eq!(user.phone.as_deref(), Some("+91 98765 43210"));
        assert_eq!(user.organization, None);
        assert!(user.is_enrolled_in("c-1"));
        assert!(!user.is_enrolled_in("c-2"));
    }

    #[test]
    fn test_user_profile_accepts_mongo_id_alias() {
        let user: UserProfile = serde_json::from_value(json!({
            "_id": "abc",
            "name": "Ravi",
            "email": "r@x.in"
        }))
        .unwrap();
        assert_eq!(user.user_id, "abc");
        assert!(user.enrolled_course_ids.is_empty());
    }

    #[test]
    fn test_user_profile_writes_canonical_names_and_skips_missing() {
        let user: UserProfile = serde_json::from_value(profile_json()).unwrap();
        let out = serde_json::to_value(&user).unwrap();
        assert_eq!(out["userId"], "u-1");
        assert_eq!(out["enrolledCourseIds"], json!(["c-1"]));
        assert!(out.get("organization").is_none());
    }

    // =====================================================================
    // Requests
    // =====================================================================

    #[test]
    fn test_enroll_request_uses_course_id_key() {
        let body = serde_json::to_value(EnrollRequest {
            course_id: "c-9".into(),
        })
        .unwrap();
        assert_eq!(body, json!({ "courseId": "c-9" }));
    }

    #[test]
    fn test_signup_form_omits_empty_optionals() {
        let form = SignupForm {
            name: "Asha".into(),
            email: "a@b.com".into(),
            password: "secret123".into(),
            country: Some("India".into()),
            ..Default::default()
        };
        let body = serde_json::to_value(&form).unwrap();
        assert_eq!(body["country"], "India");
        assert!(body.get("phone").is_none());
    }

    // =====================================================================
    // Enrollment
    // =====================================================================

    fn enrollment_json(progress: serde_json::Value) -> serde_json::Value {
        json!({
            "_id": "e-1",
            "course": { "_id": "c-1", "title": "Rust 101", "price": 499.0 },
            "enrollmentDate": "2026-01-05T10:00:00Z",
            "status": "enrolled",
            "progress": progress
        })
    }

    #[test]
    fn test_enrollment_reads_backend_shape() {
        let e: Enrollment =
            serde_json::from_value(enrollment_json(json!(40))).unwrap();
        assert_eq!(e.id, "e-1");
        assert_eq!(e.course.id, "c-1");
        assert_eq!(e.course.price, Some(499.0));
        assert_eq!(e.status, EnrollmentStatus::Enrolled);
        assert_eq!(e.progress, 40);
    }

    #[test]
    fn test_enrollment_progress_is_clamped() {
        let over: Enrollment =
            serde_json::from_value(enrollment_json(json!(130))).unwrap();
        assert_eq!(over.progress, 100);

        let under: Enrollment =
            serde_json::from_value(enrollment_json(json!(-5))).unwrap();
        assert_eq!(under.progress, 0);

        let frac: Enrollment =
            serde_json::from_value(enrollment_json(json!(66.6))).unwrap();
        assert_eq!(frac.progress, 67);
    }

    #[test]
    fn test_enrollment_status_rejects_unknown_value() {
        let mut raw = enrollment_json(json!(0));
        raw["status"] = json!("paused");
        assert!(serde_json::from_value::<Enrollment>(raw).is_err());
    }

    // =====================================================================
    // ApiResponse
    // =====================================================================

    #[test]
    fn test_api_response_expiry_shape() {
        let res: ApiResponse = serde_json::from_value(json!({
            "success": false,
            "message": "Token expired",
            "code": "TOKEN_EXPIRED"
        }))
        .unwrap();
        assert!(!res.success);
        assert!(res.has_code("TOKEN_EXPIRED"));
        assert!(res.user.is_none());
    }

    #[test]
    fn test_api_response_validation_errors_accept_express_validator_keys() {
        let res: ApiResponse = serde_json::from_value(json!({
            "success": false,
            "errors": [{ "path": "email", "msg": "Invalid email" }]
        }))
        .unwrap();
        assert_eq!(res.errors.len(), 1);
        assert_eq!(res.errors[0].field, "email");
        assert_eq!(res.errors[0].message, "Invalid email");
    }

    #[test]
    fn test_api_response_missing_success_defaults_to_false() {
        let res: ApiResponse = serde_json::from_value(json!({})).unwrap();
        assert!(!res.success);
    }

    #[test]
    fn test_api_response_builders() {
        let res = ApiResponse::failure("nope").with_code("X");
        assert_eq!(res.message.as_deref(), Some("nope"));
        assert!(res.has_code("X"));
        assert!(!res.has_code("Y"));
    }
}
