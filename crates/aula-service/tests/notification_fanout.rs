//! Cross-trigger tests for the shared notification dispatcher: all four
//! trigger sites feed one process-wide pool, and delivery stays best-effort
//! regardless of which site submitted the batch.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use aula_service::config::NotifierConfig;
use aula_service::models::{
    AnnouncementSummary, ExerciseSummary, LiveSession, QuizSummary, RemoteMeetingHandle,
};
use aula_service::notify::Notifier;
use aula_service::services::publish;
use aula_test_utils::{RecordingMailTransport, StaticRoster};
use chrono::{TimeZone, Utc};
use std::sync::Arc;

const CLASS_ID: i64 = 2;

fn session() -> LiveSession {
    let mut session = LiveSession::new(
        "Algorithms Review".to_string(),
        Utc.with_ymd_and_hms(2025, 1, 10, 10, 0, 0).unwrap(),
        1,
        CLASS_ID,
    );
    session.attach_meeting(RemoteMeetingHandle {
        meeting_id: 123,
        join_url: "https://meet.example/123".to_string(),
    });
    session
}

fn exercise() -> ExerciseSummary {
    ExerciseSummary {
        title: "TP 3".to_string(),
        description: "Tri fusion".to_string(),
        deadline: Some(Utc.with_ymd_and_hms(2025, 1, 20, 23, 59, 0).unwrap()),
        class_name: "CS101".to_string(),
        professor_name: "Ada Lovelace".to_string(),
    }
}

fn announcement() -> AnnouncementSummary {
    AnnouncementSummary {
        title: "Exam moved".to_string(),
        description: "Schedule change".to_string(),
        content: "The exam now starts at 9am.".to_string(),
        professor_name: Some("Ada Lovelace".to_string()),
    }
}

fn quiz() -> QuizSummary {
    QuizSummary {
        title: "Graphs quiz".to_string(),
    }
}

#[tokio::test]
async fn all_four_trigger_sites_share_one_pool() {
    let transport = Arc::new(RecordingMailTransport::new());
    let notifier = Arc::new(Notifier::spawn(
        transport.clone(),
        NotifierConfig::default(),
    ));
    let roster = StaticRoster::with_class_of(CLASS_ID, 2);

    let submitted =
        publish::notify_live_session_scheduled(&roster, &notifier, &session())
            .await
            .unwrap()
            + publish::notify_exercise_published(&roster, &notifier, CLASS_ID, &exercise())
                .await
                .unwrap()
            + publish::notify_announcement_posted(&roster, &notifier, CLASS_ID, &announcement())
                .await
                .unwrap()
            + publish::notify_quiz_available(&roster, &notifier, CLASS_ID, &quiz())
                .await
                .unwrap();

    notifier.shutdown().await;

    assert_eq!(submitted, 8);
    assert_eq!(transport.attempts().len(), 8);

    // Each member received one message per trigger.
    let to_first: Vec<_> = transport
        .attempts()
        .into_iter()
        .filter(|a| a.to == "student0@example.edu")
        .collect();
    assert_eq!(to_first.len(), 4);
    let subjects: Vec<_> = to_first.iter().map(|a| a.subject.clone()).collect();
    assert!(subjects.contains(&"Live Streaming Notification".to_string()));
    assert!(subjects.contains(&"Nouvel exercice publié".to_string()));
    assert!(subjects.contains(&"New Announcement: Exam moved".to_string()));
    assert!(subjects.contains(&"Notification: New QCM Available".to_string()));
}

#[tokio::test]
async fn failures_in_one_batch_leave_other_batches_intact() {
    let transport = Arc::new(RecordingMailTransport::new());
    let notifier = Arc::new(Notifier::spawn(
        transport.clone(),
        NotifierConfig::default(),
    ));
    let roster = StaticRoster::with_class_of(CLASS_ID, 3);
    transport.fail_for("student1@example.edu");

    publish::notify_quiz_available(&roster, &notifier, CLASS_ID, &quiz())
        .await
        .unwrap();
    publish::notify_announcement_posted(&roster, &notifier, CLASS_ID, &announcement())
        .await
        .unwrap();

    notifier.shutdown().await;

    // Six attempts in total; the scripted recipient failed twice without
    // affecting anyone else.
    assert_eq!(transport.attempts().len(), 6);
    assert_eq!(transport.delivered_to().len(), 4);
}

#[tokio::test]
async fn shutdown_drains_pending_batches_from_every_site() {
    let transport = Arc::new(RecordingMailTransport::new());
    let notifier = Arc::new(Notifier::spawn(
        transport.clone(),
        NotifierConfig::default(),
    ));
    let roster = StaticRoster::with_class_of(CLASS_ID, 5);

    for _ in 0..4 {
        publish::notify_quiz_available(&roster, &notifier, CLASS_ID, &quiz())
            .await
            .unwrap();
    }

    notifier.shutdown().await;
    assert_eq!(transport.attempts().len(), 20);

    // Post-shutdown submissions from any site are dropped.
    let late = publish::notify_quiz_available(&roster, &notifier, CLASS_ID, &quiz())
        .await
        .unwrap();
    assert_eq!(late, 5);
    tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    assert_eq!(transport.attempts().len(), 20);
}
