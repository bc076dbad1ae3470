use super::*;

// {"sub":"42","role":"teacher","iat":1000,"exp":2000,"college":"north"}
const TEACHER_TOKEN: &str = "eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9.eyJzdWIiOiI0MiIsInJvbGUiOiJ0ZWFjaGVyIiwiaWF0IjoxMDAwLCJleHAiOjIwMDAsImNvbGxlZ2UiOiJub3J0aCJ9.sig";
// {"sub":"7"}
const NO_EXP_TOKEN: &str = "eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9.eyJzdWIiOiI3In0.sig";

#[test]
fn describes_live_token() {
    let out = describe(TEACHER_TOKEN, 1_500).unwrap();
    assert_eq!(out["sub"], "42");
    assert_eq!(out["role"], "teacher");
    assert_eq!(out["expires_in"], 500);
    assert_eq!(out["expired"], false);
    assert_eq!(out["refresh_due"], false);
    assert_eq!(out["extra"]["college"], "north");
}

#[test]
fn flags_refresh_window_and_expiry() {
    let due = describe(TEACHER_TOKEN, 1_800).unwrap();
    assert_eq!(due["refresh_due"], true);
    assert_eq!(due["expired"], false);

    let gone = describe(&format!("Bearer {TEACHER_TOKEN}"), 2_100).unwrap();
    assert_eq!(gone["expires_in"], -100);
    assert_eq!(gone["expired"], true);
}

#[test]
fn token_without_exp_never_expires() {
    let out = describe(NO_EXP_TOKEN, 1_000_000).unwrap();
    assert!(out["exp"].is_null());
    assert!(out["expires_in"].is_null());
    assert_eq!(out["expired"], false);
    assert!(out.get("extra").is_none());
}

#[test]
fn opaque_token_is_rejected() {
    assert_eq!(describe("opaque-session-id", 0), Err(TokenError::Malformed));
}
