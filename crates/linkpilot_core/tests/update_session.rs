use std::sync::Once;

use linkpilot_core::{
    update, AppState, Effect, JobHandle, JobStatus, LogSeverity, Msg, NavView, Page, Phase,
    ProgressUpdate, ResultItem, ResultStore, StreamPhase,
};
use pretty_assertions::assert_eq;

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(pilot_logging::initialize_for_tests);
}

fn job() -> JobHandle {
    JobHandle::new("job-42")
}

fn submit_links(state: AppState, input: &str) -> (AppState, Vec<Effect>) {
    let (state, _) = update(state, Msg::InputChanged(input.to_string()));
    update(state, Msg::LinksSubmitted)
}

fn streaming_state() -> AppState {
    let (state, _) = submit_links(AppState::new(), "https://src.example/a\n");
    let (state, _) = update(state, Msg::JobAccepted { job: job() });
    state
}

fn store(uris: &[&str]) -> ResultStore {
    ResultStore::new(
        uris.iter()
            .enumerate()
            .map(|(i, uri)| ResultItem {
                original_source: format!("https://src.example/{i}"),
                download_uri: uri.to_string(),
            })
            .collect(),
        Vec::new(),
        uris.len() as u32,
    )
}

fn completed_state(uris: &[&str]) -> AppState {
    let (state, _) = update(
        streaming_state(),
        Msg::JobCompleted {
            job: job(),
            store: store(uris),
        },
    );
    state
}

#[test]
fn submission_trims_links_and_moves_to_progress() {
    init_logging();
    let (mut state, effects) = submit_links(
        AppState::new(),
        " https://src.example/a \n\n  https://src.example/b\n  \n",
    );

    assert_eq!(
        effects,
        vec![Effect::SubmitJob {
            links: vec![
                "https://src.example/a".to_string(),
                "https://src.example/b".to_string(),
            ],
        }]
    );
    let view = state.view();
    assert_eq!(view.page, Page::Progress);
    assert!(view.nav.progress);
    assert!(!view.nav.results);
    assert_eq!(view.stream, StreamPhase::Submitting);
    assert!(state.consume_dirty());
}

#[test]
fn empty_submission_is_refused_locally() {
    init_logging();
    let (state, effects) = submit_links(AppState::new(), "  \n\n");

    assert!(effects.is_empty());
    assert_eq!(state.page(), Page::Input);
    assert_eq!(state.view().notice.as_deref(), Some("No links provided"));
}

#[test]
fn accepted_job_subscribes_once() {
    init_logging();
    let (state, _) = submit_links(AppState::new(), "https://src.example/a\n");

    let (state, effects) = update(state, Msg::JobAccepted { job: job() });
    assert_eq!(effects, vec![Effect::Subscribe { job: job() }]);

    let (_state, effects) = update(state, Msg::JobAccepted { job: job() });
    assert!(effects.is_empty());
}

#[test]
fn submission_failure_returns_to_input() {
    init_logging();
    let (state, _) = submit_links(AppState::new(), "https://src.example/a\n");

    let (state, effects) = update(
        state,
        Msg::SubmissionFailed {
            message: "No links provided".to_string(),
        },
    );

    assert!(effects.is_empty());
    let view = state.view();
    assert_eq!(view.page, Page::Input);
    assert!(!view.nav.progress);
    assert_eq!(view.notice.as_deref(), Some("No links provided"));
}

#[test]
fn progress_accumulates_log_lines_in_order() {
    init_logging();
    let state = streaming_state();

    let (state, _) = update(
        state,
        Msg::ProgressReceived {
            job: job(),
            update: ProgressUpdate {
                processed: 0,
                total: 2,
                messages: vec!["[1/2] Fetching: https://src.example/a".to_string()],
                current: Some("https://src.example/a".to_string()),
                ..ProgressUpdate::default()
            },
        },
    );
    let (state, _) = update(
        state,
        Msg::ProgressReceived {
            job: job(),
            update: ProgressUpdate {
                processed: 1,
                total: 2,
                messages: vec![
                    "✓ Extracted: https://dl.example/1...".to_string(),
                    "✗ Error: timed out".to_string(),
                ],
                ..ProgressUpdate::default()
            },
        },
    );

    let view = state.view();
    assert_eq!(view.progress.percentage, 50);
    assert_eq!(view.progress.text, "Processing 1/2 links (50%)");
    assert_eq!(view.progress.current, None);
    let severities: Vec<_> = view.log.iter().map(|line| line.severity).collect();
    assert_eq!(
        severities,
        vec![LogSeverity::Info, LogSeverity::Success, LogSeverity::Error]
    );
}

#[test]
fn events_for_another_job_are_ignored() {
    init_logging();
    let state = streaming_state();
    let before = state.view();

    let (state, _) = update(
        state,
        Msg::ProgressReceived {
            job: JobHandle::new("stale"),
            update: ProgressUpdate {
                processed: 5,
                total: 5,
                messages: vec!["late".to_string()],
                status: JobStatus::Running,
                ..ProgressUpdate::default()
            },
        },
    );

    assert_eq!(state.view(), before);
}

#[test]
fn completion_shows_results_and_enables_auto_open() {
    init_logging();
    let state = completed_state(&["u1", "u2"]);

    let view = state.view();
    assert_eq!(view.page, Page::Results);
    assert!(view.nav.results);
    assert!(view.nav.auto_open);
    assert_eq!(view.summary.map(|s| s.success_count), Some(2));
    assert_eq!(view.results[1].number, 2);
    assert_eq!(view.results[1].download_uri, "u2");
    assert_eq!(view.auto_open.link_progress, "0 / 2");
}

#[test]
fn completion_without_successes_keeps_auto_open_disabled() {
    init_logging();
    let state = completed_state(&[]);

    let (state, effects) = update(state, Msg::Navigate(Page::AutoOpen));

    assert_eq!(state.page(), Page::Results);
    assert!(effects.is_empty());

    let (state, effects) = update(state, Msg::AutoOpenStartClicked);
    assert!(effects.is_empty());
    assert_eq!(state.view().notice.as_deref(), Some("No links to open!"));
    assert_eq!(state.session().scheduler().phase(), Phase::Idle);
}

#[test]
fn stream_failure_is_surfaced_and_later_events_dropped() {
    init_logging();
    let state = streaming_state();

    let (state, _) = update(
        state,
        Msg::StreamFailed {
            job: job(),
            message: "boom".to_string(),
        },
    );
    assert_eq!(state.session().stream(), StreamPhase::Failed);
    assert_eq!(state.view().notice.as_deref(), Some("boom"));

    let (state, _) = update(
        state,
        Msg::JobCompleted {
            job: job(),
            store: store(&["u1"]),
        },
    );
    assert!(state.session().results().is_none());
}

#[test]
fn auto_open_flow_emits_open_and_countdown_effects() {
    init_logging();
    let state = completed_state(&["u1", "u2"]);
    let (state, _) = update(state, Msg::DelayChanged(2));

    let (state, effects) = update(state, Msg::AutoOpenStartClicked);
    assert_eq!(
        effects,
        vec![
            Effect::OpenExternal {
                uri: "u1".to_string()
            },
            Effect::ArmCountdown { generation: 1 },
        ]
    );
    assert_eq!(state.page(), Page::AutoOpen);

    let (state, effects) = update(state, Msg::CountdownTick { generation: 1 });
    assert!(effects.is_empty());
    assert_eq!(state.view().auto_open.countdown, Some(1));

    let (state, effects) = update(state, Msg::CountdownTick { generation: 1 });
    assert_eq!(
        effects,
        vec![
            Effect::CancelCountdown { generation: 1 },
            Effect::OpenExternal {
                uri: "u2".to_string()
            },
        ]
    );
    assert_eq!(state.session().scheduler().phase(), Phase::Stopped);
    assert_eq!(
        state.view().auto_open.status_text.as_deref(),
        Some("All links opened!")
    );
}

#[test]
fn pause_button_toggles_and_resume_dispatches_immediately() {
    init_logging();
    let state = completed_state(&["u1", "u2", "u3"]);
    let (state, _) = update(state, Msg::AutoOpenStartClicked);

    let (state, effects) = update(state, Msg::PauseClicked);
    assert_eq!(effects, vec![Effect::CancelCountdown { generation: 1 }]);
    assert_eq!(state.view().auto_open.pause_label, "Resume");

    let (state, effects) = update(state, Msg::CountdownTick { generation: 1 });
    assert!(effects.is_empty());

    let (state, effects) = update(state, Msg::PauseClicked);
    assert_eq!(
        effects,
        vec![
            Effect::OpenExternal {
                uri: "u2".to_string()
            },
            Effect::ArmCountdown { generation: 2 },
        ]
    );
    assert_eq!(state.view().auto_open.countdown, Some(60));
}

#[test]
fn open_single_result_bypasses_scheduler() {
    init_logging();
    let state = completed_state(&["u1", "u2"]);

    let (state, effects) = update(state, Msg::OpenSingleClicked { index: 1 });
    assert_eq!(
        effects,
        vec![Effect::OpenExternal {
            uri: "u2".to_string()
        }]
    );
    assert_eq!(state.session().scheduler().cursor(), 0);

    let (_state, effects) = update(state, Msg::OpenSingleClicked { index: 9 });
    assert!(effects.is_empty());
}

#[test]
fn export_builds_artifact_or_reports_nothing() {
    init_logging();
    let (state, effects) = update(AppState::new(), Msg::ExportClicked { epoch_millis: 7 });
    assert!(effects.is_empty());
    assert_eq!(
        state.view().notice.as_deref(),
        Some("No successful results to download")
    );

    let state = completed_state(&["u1", "u2"]);
    let (state, effects) = update(state, Msg::ExportClicked { epoch_millis: 7 });
    let [Effect::WriteExport { artifact }] = effects.as_slice() else {
        panic!("expected export effect, got {effects:?}");
    };
    assert_eq!(artifact.filename, "download_links_7.txt");
    assert_eq!(artifact.contents, "u1\nu2");

    let (state, _) = update(
        state,
        Msg::ExportWritten {
            path: "output/download_links_7.txt".to_string(),
        },
    );
    assert_eq!(
        state.view().notice.as_deref(),
        Some("Saved output/download_links_7.txt")
    );
}

#[test]
fn new_session_stops_scheduler_and_resets_everything() {
    init_logging();
    let state = completed_state(&["u1", "u2"]);
    let (state, _) = update(state, Msg::DelayChanged(15));
    let (state, _) = update(state, Msg::AutoOpenStartClicked);

    let (state, effects) = update(state, Msg::NewSessionClicked);

    assert_eq!(effects, vec![Effect::CancelCountdown { generation: 1 }]);
    let view = state.view();
    assert_eq!(view.page, Page::Input);
    assert_eq!(view.nav, NavView::default());
    assert!(view.summary.is_none());
    assert!(view.input.is_empty());
    assert_eq!(view.delay_seconds, 15);
    assert_eq!(state.session().scheduler().phase(), Phase::Idle);
}

#[test]
fn new_session_while_streaming_closes_channel() {
    init_logging();
    let state = streaming_state();

    let (state, effects) = update(state, Msg::NewSessionClicked);

    assert_eq!(effects, vec![Effect::CloseSubscription { job: job() }]);
    assert!(state.session().job().is_none());

    let (state, _) = update(
        state,
        Msg::ProgressReceived {
            job: job(),
            update: ProgressUpdate::default(),
        },
    );
    assert!(state.view().log.is_empty());
}

#[test]
fn resubmitting_while_auto_opening_cancels_the_countdown() {
    init_logging();
    let state = completed_state(&["u1", "u2", "u3"]);
    let (state, effects) = update(state, Msg::AutoOpenStartClicked);
    assert_eq!(
        effects,
        vec![
            Effect::OpenExternal {
                uri: "u1".to_string()
            },
            Effect::ArmCountdown { generation: 1 },
        ]
    );

    let (state, effects) = submit_links(state, "https://src.example/next");

    assert_eq!(
        effects,
        vec![
            Effect::CancelCountdown { generation: 1 },
            Effect::SubmitJob {
                links: vec!["https://src.example/next".to_string()]
            },
        ]
    );
    assert_eq!(state.session().scheduler().phase(), Phase::Idle);
    assert_eq!(state.session().stream(), StreamPhase::Submitting);

    let (_, effects) = update(state, Msg::CountdownTick { generation: 1 });
    assert!(effects.is_empty());
}

#[test]
fn resubmitting_while_paused_needs_no_cancel() {
    init_logging();
    let state = completed_state(&["u1", "u2"]);
    let (state, _) = update(state, Msg::AutoOpenStartClicked);
    let (state, effects) = update(state, Msg::PauseClicked);
    assert_eq!(effects, vec![Effect::CancelCountdown { generation: 1 }]);

    let (state, effects) = submit_links(state, "https://src.example/next");

    assert_eq!(
        effects,
        vec![Effect::SubmitJob {
            links: vec!["https://src.example/next".to_string()]
        }]
    );
    assert_eq!(state.session().scheduler().phase(), Phase::Idle);
}

#[test]
fn resubmitting_while_streaming_closes_the_old_channel() {
    init_logging();
    let (state, effects) = submit_links(streaming_state(), "https://src.example/next");

    assert_eq!(
        effects,
        vec![
            Effect::CloseSubscription { job: job() },
            Effect::SubmitJob {
                links: vec!["https://src.example/next".to_string()]
            },
        ]
    );

    let (state, _) = update(
        state,
        Msg::ProgressReceived {
            job: job(),
            update: ProgressUpdate {
                processed: 1,
                total: 1,
                messages: vec!["late".to_string()],
                ..ProgressUpdate::default()
            },
        },
    );
    assert!(state.view().log.is_empty());
}

#[test]
fn second_submit_while_submitting_is_refused() {
    init_logging();
    let (state, _) = submit_links(AppState::new(), "https://src.example/a");

    let (state, effects) = update(state, Msg::LinksSubmitted);

    assert!(effects.is_empty());
    assert_eq!(state.session().stream(), StreamPhase::Submitting);
    assert_eq!(
        state.view().notice.as_deref(),
        Some("A submission is already in progress")
    );
}

#[test]
fn live_counts_follow_progress_then_the_store() {
    init_logging();
    let (state, _) = update(
        streaming_state(),
        Msg::ProgressReceived {
            job: job(),
            update: ProgressUpdate {
                processed: 2,
                total: 3,
                results_count: Some(1),
                errors_count: Some(1),
                ..ProgressUpdate::default()
            },
        },
    );
    let progress = state.view().progress;
    assert_eq!((progress.results_count, progress.errors_count), (1, 1));

    let (state, _) = update(
        state,
        Msg::ProgressReceived {
            job: job(),
            update: ProgressUpdate {
                processed: 3,
                total: 3,
                ..ProgressUpdate::default()
            },
        },
    );
    assert_eq!(state.view().progress.results_count, 1);

    let (state, _) = update(
        state,
        Msg::JobCompleted {
            job: job(),
            store: store(&["u1", "u2"]),
        },
    );
    let progress = state.view().progress;
    assert_eq!((progress.results_count, progress.errors_count), (2, 0));
}
