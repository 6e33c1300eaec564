// Integration tests for the session lifecycle
//
// These tests drive SessionController through its state machine with a
// launcher that records invocations instead of spawning processes.

mod common;

use common::RecordingLauncher;
use std::sync::Arc;
use whisper_control::session::ConfigError;
use whisper_control::{
    SessionConfig, SessionController, SessionError, SessionStatus, WhisperModel, WorkerCommand,
};

fn all_valid_configs() -> Vec<SessionConfig> {
    let mut configs = Vec::new();
    for model in WhisperModel::ALL {
        for (energy_threshold, record_timeout, phrase_timeout) in
            [(100, 1.0, 5.0), (300, 3.0, 15.0), (500, 10.0, 30.0)]
        {
            configs.push(SessionConfig {
                model,
                energy_threshold,
                record_timeout,
                phrase_timeout,
                mic_index: 0,
            });
        }
    }
    configs
}

#[test]
fn test_start_then_stop_launches_and_terminates_once() {
    for config in all_valid_configs() {
        let (launcher, log) = RecordingLauncher::new();
        let mut controller = SessionController::new(Arc::new(launcher), WorkerCommand::default());

        controller.start(config.clone()).unwrap();
        assert_eq!(controller.status(), SessionStatus::Running);

        controller.stop().unwrap();

        assert_eq!(controller.status(), SessionStatus::Idle);
        assert_eq!(log.launches(), 1, "config: {:?}", config);
        assert_eq!(log.terminations(), 1, "config: {:?}", config);
    }
}

#[test]
fn test_start_while_running_is_rejected() {
    let (launcher, log) = RecordingLauncher::new();
    let mut controller = SessionController::new(Arc::new(launcher), WorkerCommand::default());

    let first = controller.start(SessionConfig::default()).unwrap();
    let err = controller.start(SessionConfig::default()).unwrap_err();

    assert!(matches!(err, SessionError::AlreadyRunning));
    assert!(err.is_invalid_transition());
    assert_eq!(log.launches(), 1);
    assert_eq!(controller.status(), SessionStatus::Running);
    assert_eq!(
        controller.current().map(|s| s.session_id),
        Some(first.session_id)
    );
}

#[test]
fn test_stop_while_idle_is_rejected() {
    let (launcher, log) = RecordingLauncher::new();
    let mut controller = SessionController::new(Arc::new(launcher), WorkerCommand::default());

    let err = controller.stop().unwrap_err();

    assert!(matches!(err, SessionError::NotRunning));
    assert_eq!(controller.status(), SessionStatus::Idle);
    assert_eq!(log.terminations(), 0);
}

#[test]
fn test_out_of_range_energy_threshold_spawns_nothing() {
    let (launcher, log) = RecordingLauncher::new();
    let mut controller = SessionController::new(Arc::new(launcher), WorkerCommand::default());

    let config = SessionConfig {
        energy_threshold: 50,
        ..SessionConfig::default()
    };
    let err = controller.start(config).unwrap_err();

    assert!(matches!(
        err,
        SessionError::InvalidConfig(ConfigError::OutOfRange {
            field: "energy_threshold",
            ..
        })
    ));
    assert_eq!(log.launches(), 0);
    assert_eq!(controller.status(), SessionStatus::Idle);
}

#[test]
fn test_worker_receives_session_flags() {
    let (launcher, log) = RecordingLauncher::new();
    let command = WorkerCommand {
        program: "python3".to_string(),
        args: vec!["-m".to_string(), "demo.transcribe".to_string()],
        working_dir: None,
    };
    let mut controller = SessionController::new(Arc::new(launcher), command);

    controller
        .start(SessionConfig {
            model: WhisperModel::Base,
            energy_threshold: 420,
            record_timeout: 4.5,
            phrase_timeout: 12.0,
            mic_index: 2,
        })
        .unwrap();

    let invocations = log.invocations.lock().unwrap();
    assert_eq!(invocations.len(), 1);
    assert_eq!(
        invocations[0].to_string(),
        "python3 -m demo.transcribe --model base --energy-threshold 420 \
         --record-timeout 4.5 --phrase-timeout 12.0 --mic-index 2"
    );
}

#[test]
fn test_status_watch_follows_transitions() {
    let (launcher, _log) = RecordingLauncher::new();
    let mut controller = SessionController::new(Arc::new(launcher), WorkerCommand::default());
    let rx = controller.subscribe();

    assert_eq!(*rx.borrow(), SessionStatus::Idle);
    controller.start(SessionConfig::default()).unwrap();
    assert_eq!(*rx.borrow(), SessionStatus::Running);
    controller.stop().unwrap();
    assert_eq!(*rx.borrow(), SessionStatus::Idle);
}

#[test]
fn test_session_can_restart_after_stop() {
    let (launcher, log) = RecordingLauncher::new();
    let mut controller = SessionController::new(Arc::new(launcher), WorkerCommand::default());

    let first = controller.start(SessionConfig::default()).unwrap();
    controller.stop().unwrap();
    let second = controller.start(SessionConfig::default()).unwrap();

    assert_ne!(first.session_id, second.session_id);
    assert_eq!(log.launches(), 2);
    assert_eq!(log.terminations(), 1);
}
