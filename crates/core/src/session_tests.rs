use super::*;

#[test]
fn close_sets_terminal_status_and_timestamp() {
    let mut session = RealtimeSession::builder().build();
    assert_eq!(session.status, SessionStatus::Active);
    session.close(SessionStatus::Interrupted, 42);
    assert_eq!(session.status, SessionStatus::Interrupted);
    assert_eq!(session.ended_at_ms, Some(42));
}

#[test]
fn active_is_not_terminal() {
    assert!(!SessionStatus::Active.is_terminal());
    assert!(SessionStatus::Completed.is_terminal());
}
