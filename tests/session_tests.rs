// The per-user session gate: at most one outstanding job per user, and a
// resolved session always comes back to Idle ready for the next cycle.

use scribe_backend::modules::session::{GateError, SessionGate, SessionState};

#[test]
fn full_cycle_returns_to_idle() {
    let gate = SessionGate::default();

    assert_eq!(gate.state("alice"), SessionState::Idle);

    gate.open("alice").unwrap();
    assert_eq!(gate.state("alice"), SessionState::AwaitingInput);

    let ticket = gate.begin("alice").unwrap();
    assert_eq!(gate.state("alice"), SessionState::Processing);

    ticket.release();
    assert_eq!(gate.state("alice"), SessionState::Idle);
}

#[test]
fn begin_without_open_is_rejected() {
    let gate = SessionGate::default();

    assert_eq!(gate.begin("bob").unwrap_err(), GateError::NoSession);
}

#[test]
fn processing_session_rejects_new_work_until_resolved() {
    let gate = SessionGate::default();

    gate.open("carol").unwrap();
    let ticket = gate.begin("carol").unwrap();

    // A second submission (or a re-open) while the job is in flight bounces.
    assert_eq!(gate.begin("carol").unwrap_err(), GateError::Busy);
    assert_eq!(gate.open("carol").unwrap_err(), GateError::Busy);

    // After resolution the next cycle goes through.
    ticket.release();
    gate.open("carol").unwrap();
    let ticket = gate.begin("carol").unwrap();
    drop(ticket);
    assert_eq!(gate.state("carol"), SessionState::Idle);
}

#[test]
fn dropped_ticket_releases_the_session() {
    let gate = SessionGate::default();

    gate.open("dave").unwrap();
    {
        let _ticket = gate.begin("dave").unwrap();
        assert_eq!(gate.state("dave"), SessionState::Processing);
        // Ticket dropped here, e.g. an early-return error path.
    }
    assert_eq!(gate.state("dave"), SessionState::Idle);
}

#[test]
fn users_gate_independently() {
    let gate = SessionGate::default();

    gate.open("erin").unwrap();
    let _ticket = gate.begin("erin").unwrap();

    // Another user's session is unaffected by erin's in-flight job.
    gate.open("frank").unwrap();
    assert!(gate.begin("frank").is_ok());
}
