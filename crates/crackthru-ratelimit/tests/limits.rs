//! End-to-end checks of the standard API limits.

use std::net::{IpAddr, Ipv4Addr};
use std::time::{Duration, Instant};

use crackthru_ratelimit::{Environment, RateDecision, RateLimiterSet};

const CLIENT: IpAddr = IpAddr::V4(Ipv4Addr::new(192, 0, 2, 10));

#[test]
fn test_registration_limited_after_five_attempts_per_hour() {
    let set = RateLimiterSet::new(Environment::Production);
    let start = Instant::now();

    for i in 0..5 {
        let d = set.check("/auth/register", CLIENT, start + Duration::from_secs(i));
        assert!(d.is_allowed(), "attempt {} should pass", i + 1);
    }

    let sixth = set.check("/registrations", CLIENT, start + Duration::from_secs(10));
    match &sixth {
        RateDecision::Limited {
            retry_after,
            message,
            ..
        } => {
            assert_eq!(*retry_after, Duration::from_secs(3590));
            assert!(message.contains("after an hour"));
        }
        other => panic!("expected Limited, got {other:?}"),
    }

    let next_hour = start + Duration::from_secs(3600);
    assert!(set.check("/auth/register", CLIENT, next_hour).is_allowed());
}

#[test]
fn test_auth_and_general_limits_are_independent() {
    let set = RateLimiterSet::new(Environment::Production);
    let now = Instant::now();

    for _ in 0..10 {
        assert!(set.check("/auth/login", CLIENT, now).is_allowed());
    }
    assert!(!set.check("/auth/refresh-token", CLIENT, now).is_allowed());

    // Auth exhaustion doesn't touch the general budget.
    let d = set.check("/courses/user/enrollments", CLIENT, now);
    assert!(matches!(d, RateDecision::Allowed { remaining: 99, .. }));
}

#[test]
fn test_general_limit_of_one_hundred() {
    let set = RateLimiterSet::new(Environment::Production);
    let now = Instant::now();

    for _ in 0..100 {
        assert!(set.check("/courses", CLIENT, now).is_allowed());
    }
    let d = set.check("/courses", CLIENT, now);

    assert_eq!(d.rejection_status(), Some(429));
    let body = d.rejection_body().unwrap();
    assert!(body.contains("\"success\":false"));
    assert!(d.headers().iter().any(|(k, v)| *k == "Retry-After" && v == "900"));
}

#[test]
fn test_development_bypasses_everything() {
    let set = RateLimiterSet::new(Environment::parse("development"));
    let now = Instant::now();

    for _ in 0..50 {
        assert_eq!(set.check("/auth/register", CLIENT, now), RateDecision::Bypassed);
    }
    assert_eq!(set.purge_expired(now), 0);
}

#[test]
fn test_purge_expired_across_limiters() {
    let set = RateLimiterSet::new(Environment::Production);
    let start = Instant::now();
    set.check("/auth/login", CLIENT, start);
    set.check("/auth/register", CLIENT, start);
    set.check("/courses", CLIENT, start);

    // Auth and general windows are 15 minutes; registration is an hour.
    let removed = set.purge_expired(start + Duration::from_secs(16 * 60));

    assert_eq!(removed, 2);
}
