use std::time::Duration;

use ladle::application::ports::RateLimiter;
use ladle::infrastructure::rate_limit::FixedWindowLimiter;

#[test]
fn given_five_requests_when_admitting_then_sixth_is_rejected() {
    let limiter = FixedWindowLimiter::new(Duration::from_secs(60), 5);

    for _ in 0..5 {
        assert!(limiter.admit("user-a"));
    }
    assert!(!limiter.admit("user-a"));
}

#[test]
fn given_separate_users_when_admitting_then_windows_are_independent() {
    let limiter = FixedWindowLimiter::new(Duration::from_secs(60), 2);

    assert!(limiter.admit("user-a"));
    assert!(limiter.admit("user-a"));
    assert!(!limiter.admit("user-a"));

    assert!(limiter.admit("user-b"));
    assert!(limiter.admit("user-b"));
}

#[test]
fn given_elapsed_window_when_admitting_then_request_is_accepted_again() {
    let limiter = FixedWindowLimiter::new(Duration::from_millis(40), 1);

    assert!(limiter.admit("user-a"));
    assert!(!limiter.admit("user-a"));

    std::thread::sleep(Duration::from_millis(60));

    assert!(limiter.admit("user-a"));
}

#[test]
fn given_partial_window_expiry_when_admitting_then_only_live_timestamps_count() {
    let limiter = FixedWindowLimiter::new(Duration::from_millis(80), 2);

    assert!(limiter.admit("user-a"));
    std::thread::sleep(Duration::from_millis(50));
    assert!(limiter.admit("user-a"));
    assert!(!limiter.admit("user-a"));

    // First timestamp ages out, second is still in the window.
    std::thread::sleep(Duration::from_millis(50));
    assert!(limiter.admit("user-a"));
    assert!(!limiter.admit("user-a"));
}
