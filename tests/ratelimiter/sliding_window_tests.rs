// tests/ratelimiter/sliding_window_tests.rs

#[cfg(test)]
mod tests {

    use crate::fixtures::limiter;
    use crate::fixtures::test_clock::TestClock;
    use sliding_limiter::NANOS_PER_SECOND;

    const CLIENT: &str = "127.0.0.1";

    fn client() -> String {
        CLIENT.to_string()
    }

    #[test]
    fn first_request_always_allowed() {
        let clock = TestClock::new(0);
        let limiter = limiter(1, 1, &clock);
        let decision = limiter.check_request(client()).unwrap();
        assert!(decision.allowed);
        assert_eq!(decision.remaining_quota, 0);
        assert_eq!(decision.retry_after_seconds, 0);
    }

    #[test]
    fn requests_within_limit_and_window_are_allowed() {
        // 2 requests per 3 minutes
        let clock = TestClock::new(0);
        let limiter = limiter(3, 2, &clock);

        let first = limiter.check_request(client()).unwrap();
        assert!(first.allowed);
        assert_eq!(first.remaining_quota, 1);

        clock.advance_minutes(1);
        let second = limiter.check_request(client()).unwrap();
        assert!(second.allowed);
        assert_eq!(second.remaining_quota, 0);
    }

    #[test]
    fn request_over_limit_is_rejected_with_retry_after() {
        let clock = TestClock::new(0);
        let limiter = limiter(3, 2, &clock);

        assert!(limiter.check_request(client()).unwrap().allowed);
        clock.set_seconds(60);
        assert!(limiter.check_request(client()).unwrap().allowed);

        clock.set_seconds(90);
        let decision = limiter.check_request(client()).unwrap();
        assert!(!decision.allowed);
        assert_eq!(decision.remaining_quota, 0);
        assert_eq!(decision.retry_after_seconds, 90);
    }

    #[test]
    fn retry_after_counts_down_in_whole_seconds() {
        // 1 request per minute
        let clock = TestClock::new(0);
        let limiter = limiter(1, 1, &clock);

        assert!(limiter.check_request(client()).unwrap().allowed);

        clock.advance_seconds(1);
        let second = limiter.check_request(client()).unwrap();
        assert!(!second.allowed);
        assert_eq!(second.retry_after_seconds, 59);

        clock.advance_seconds(1);
        let third = limiter.check_request(client()).unwrap();
        assert!(!third.allowed);
        assert_eq!(third.retry_after_seconds, 58);
    }

    #[test]
    fn retry_after_truncates_partial_seconds() {
        let clock = TestClock::new(0);
        let limiter = limiter(1, 1, &clock);

        assert!(limiter.check_request_at(client(), 0).unwrap().allowed);

        // 1.5s after the first request, 58.5s remain
        let decision = limiter
            .check_request_at(client(), NANOS_PER_SECOND + NANOS_PER_SECOND / 2)
            .unwrap();
        assert!(!decision.allowed);
        assert_eq!(decision.retry_after_seconds, 58);
    }

    #[test]
    fn rejection_under_a_second_before_expiry_reports_zero() {
        let clock = TestClock::new(0);
        let limiter = limiter(1, 1, &clock);

        assert!(limiter.check_request_at(client(), 0).unwrap().allowed);

        let decision = limiter
            .check_request_at(client(), 59 * NANOS_PER_SECOND + NANOS_PER_SECOND / 2)
            .unwrap();
        assert!(!decision.allowed);
        assert_eq!(decision.retry_after_seconds, 0);
    }

    #[test]
    fn clock_stepping_backwards_keeps_retry_after_within_window() {
        let clock = TestClock::new(100);
        let limiter = limiter(1, 1, &clock);

        assert!(limiter.check_request(client()).unwrap().allowed);

        clock.set_seconds(10);
        let decision = limiter.check_request(client()).unwrap();
        assert!(!decision.allowed);
        assert_eq!(decision.retry_after_seconds, 60);
    }

    #[test]
    fn very_large_limit_admits_first_request() {
        let clock = TestClock::new(0);
        let limiter = limiter(1, usize::MAX, &clock);

        let decision = limiter.check_request(client()).unwrap();
        assert!(decision.allowed);
        assert_eq!(decision.remaining_quota, usize::MAX - 1);
    }

    #[test]
    fn retry_after_matches_window_minus_elapsed() {
        // N requests per W minutes, (N+1)th arrives S seconds after the first
        let cases = [(1u64, 1usize, 1u64), (3, 2, 90), (5, 4, 299), (10, 3, 1)];
        for (window_minutes, max_requests, elapsed) in cases {
            let clock = TestClock::new(0);
            let limiter = limiter(window_minutes, max_requests, &clock);

            for _ in 0..max_requests {
                assert!(limiter.check_request(client()).unwrap().allowed);
            }
            clock.set_seconds(elapsed);

            let decision = limiter.check_request(client()).unwrap();
            assert!(!decision.allowed);
            assert_eq!(decision.retry_after_seconds, window_minutes * 60 - elapsed);
        }
    }

    #[test]
    fn oldest_request_leaves_window_after_expiry() {
        let clock = TestClock::new(0);
        let limiter = limiter(3, 2, &clock);

        assert!(limiter.check_request(client()).unwrap().allowed);
        clock.set_seconds(10);
        assert!(limiter.check_request(client()).unwrap().allowed);

        clock.set_seconds(3 * 60 + 1);
        let decision = limiter.check_request(client()).unwrap();
        assert!(decision.allowed);
        assert_eq!(decision.remaining_quota, 0);
    }

    #[test]
    fn request_exactly_at_window_boundary_is_allowed() {
        let clock = TestClock::new(0);
        let limiter = limiter(1, 1, &clock);

        assert!(limiter.check_request(client()).unwrap().allowed);

        clock.set_seconds(59);
        assert!(!limiter.check_request(client()).unwrap().allowed);

        clock.set_seconds(60);
        assert!(limiter.check_request(client()).unwrap().allowed);
    }

    #[test]
    fn quota_recovers_after_window_passes() {
        let clock = TestClock::new(0);
        let limiter = limiter(3, 2, &clock);

        assert_eq!(limiter.check_request(client()).unwrap().remaining_quota, 1);
        clock.advance_seconds(10);
        assert_eq!(limiter.check_request(client()).unwrap().remaining_quota, 0);

        clock.advance_minutes(3);
        clock.advance_seconds(1);
        assert_eq!(limiter.check_request(client()).unwrap().remaining_quota, 1);
    }

    #[test]
    fn window_from_previous_day_does_not_count() {
        let clock = TestClock::new(0);
        let limiter = limiter(3, 2, &clock);

        assert!(limiter.check_request(client()).unwrap().allowed);
        clock.advance_seconds(10);
        assert!(limiter.check_request(client()).unwrap().allowed);

        clock.advance_days(1);
        clock.advance_seconds(1);
        let decision = limiter.check_request(client()).unwrap();
        assert!(decision.allowed);
        assert_eq!(decision.remaining_quota, 1);
        assert_eq!(limiter.recorded_requests(CLIENT), Some(1));
    }

    #[test]
    fn multiple_clients_independent() {
        let clock = TestClock::new(0);
        let limiter = limiter(3, 2, &clock);

        assert!(limiter.check_request(client()).unwrap().allowed);
        assert!(limiter.check_request("197.168.154.1".to_string()).unwrap().allowed);

        clock.advance_minutes(1);
        assert!(limiter.check_request(client()).unwrap().allowed);
    }

    #[test]
    fn exhausted_client_does_not_affect_others_at_same_instant() {
        let clock = TestClock::new(0);
        let limiter = limiter(1, 1, &clock);

        assert!(limiter.check_request(client()).unwrap().allowed);
        assert!(!limiter.check_request(client()).unwrap().allowed);

        let other = limiter.check_request("10.0.0.2".to_string()).unwrap();
        assert!(other.allowed);
        assert_eq!(other.remaining_quota, 0);
        assert_eq!(limiter.client_count(), 2);
    }

    #[test]
    fn recorded_requests_never_exceed_limit() {
        let clock = TestClock::new(0);
        let limiter = limiter(2, 3, &clock);

        // a request every 7 seconds for ten minutes
        for _ in 0..(10 * 60 / 7) {
            let _ = limiter.check_request(client()).unwrap();
            assert!(limiter.recorded_requests(CLIENT).unwrap() <= 3);
            clock.advance_seconds(7);
        }
        assert!(clock.seconds() >= 10 * 60 - 7);
    }

    #[test]
    fn remaining_quota_counts_down_to_zero() {
        let clock = TestClock::new(0);
        let limiter = limiter(1, 4, &clock);

        let remaining: Vec<usize> = (0..4)
            .map(|_| limiter.check_request(client()).unwrap().remaining_quota)
            .collect();
        assert_eq!(remaining, vec![3, 2, 1, 0]);

        let blocked = limiter.check_request(client()).unwrap();
        assert!(!blocked.allowed);
        assert_eq!(blocked.remaining_quota, 0);
        assert_eq!(blocked.retry_after_seconds, 60);
    }
}
