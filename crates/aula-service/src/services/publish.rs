//! Notification trigger sites.
//!
//! Each "create X and notify the class" operation resolves the roster once,
//! builds one job per member, and hands the batch to the shared dispatcher.
//! Entity persistence for exercises, announcements, and quizzes happens in
//! the calling layer before these run; by the time a batch is submitted the
//! triggering entity is already committed, so delivery failures can never
//! roll it back.

use crate::errors::RosterError;
use crate::models::{
    AnnouncementSummary, ExerciseSummary, LiveSession, QuizSummary, Recipient,
};
use crate::notify::{NotificationJob, Notifier};
use crate::roster::RosterResolver;
use tracing::debug;

/// Resolve the roster and fan out, returning the number of jobs submitted.
async fn fan_out<F>(
    roster: &dyn RosterResolver,
    notifier: &Notifier,
    class_id: i64,
    build: F,
) -> Result<usize, RosterError>
where
    F: Fn(&Recipient) -> NotificationJob,
{
    let members = roster.members_of(class_id).await?;
    let batch: Vec<NotificationJob> = members.iter().map(build).collect();
    let count = batch.len();

    debug!(target: "aula.publish", class_id, jobs = count, "Submitting notification batch");
    notifier.submit(batch);
    Ok(count)
}

/// Notify a class that a live session has been scheduled.
pub async fn notify_live_session_scheduled(
    roster: &dyn RosterResolver,
    notifier: &Notifier,
    session: &LiveSession,
) -> Result<usize, RosterError> {
    fan_out(roster, notifier, session.class_id, |member| {
        live_session_job(member, session)
    })
    .await
}

/// Notify a class that a new exercise has been published.
pub async fn notify_exercise_published(
    roster: &dyn RosterResolver,
    notifier: &Notifier,
    class_id: i64,
    exercise: &ExerciseSummary,
) -> Result<usize, RosterError> {
    fan_out(roster, notifier, class_id, |member| {
        exercise_job(member, exercise)
    })
    .await
}

/// Notify a class that an announcement has been posted.
pub async fn notify_announcement_posted(
    roster: &dyn RosterResolver,
    notifier: &Notifier,
    class_id: i64,
    announcement: &AnnouncementSummary,
) -> Result<usize, RosterError> {
    fan_out(roster, notifier, class_id, |member| {
        announcement_job(member, announcement)
    })
    .await
}

/// Notify a class that a new quiz is available.
pub async fn notify_quiz_available(
    roster: &dyn RosterResolver,
    notifier: &Notifier,
    class_id: i64,
    quiz: &QuizSummary,
) -> Result<usize, RosterError> {
    fan_out(roster, notifier, class_id, |member| quiz_job(member, quiz)).await
}

fn live_session_job(member: &Recipient, session: &LiveSession) -> NotificationJob {
    let join_url = session.join_url.as_deref().unwrap_or("unavailable");
    NotificationJob::new(
        member.email.clone(),
        "Live Streaming Notification".to_string(),
        format!(
            "Dear {},\n\n\
             We are pleased to inform you that a new live streaming session has been scheduled.\n\n\
             Details of the session are as follows:\n\
             Subject: {}\n\
             Date and Time: {}\n\
             Join URL: {}\n\n\
             Please make sure to join on time. If you have any questions, feel free to reach out \
             to your professor.\n\n\
             Best regards,\n\
             The Academic Team",
            member.name,
            session.subject,
            session.start_time.format("%Y-%m-%d %H:%M UTC"),
            join_url,
        ),
    )
}

fn exercise_job(member: &Recipient, exercise: &ExerciseSummary) -> NotificationJob {
    let deadline = exercise
        .deadline
        .map(|d| d.format("%Y-%m-%d %H:%M UTC").to_string())
        .unwrap_or_else(|| "Non spécifiée".to_string());
    NotificationJob::new(
        member.email.clone(),
        "Nouvel exercice publié".to_string(),
        format!(
            "Bonjour {},\n\n\
             Un nouvel exercice a été publié dans votre classe \"{}\".\n\n\
             Détails de l'exercice :\n\
             - Titre : {}\n\
             - Description : {}\n\
             - Date limite : {}\n\n\
             Publié par : {}\n\n\
             Veuillez consulter la plateforme pour plus de détails et pour soumettre votre \
             travail avant la date limite.\n\n\
             Cordialement,\n\
             L'équipe pédagogique",
            member.name,
            exercise.class_name,
            exercise.title,
            exercise.description,
            deadline,
            exercise.professor_name,
        ),
    )
}

fn announcement_job(member: &Recipient, announcement: &AnnouncementSummary) -> NotificationJob {
    let signature = announcement
        .professor_name
        .as_deref()
        .unwrap_or("Professor");
    NotificationJob::new(
        member.email.clone(),
        format!("New Announcement: {}", announcement.title),
        format!(
            "Dear Student,\n\n\
             A new announcement has been posted:\n\
             Title: {}\n\
             Description: {}\n\
             Content: {}\n\n\
             Best regards,\n\
             {}",
            announcement.title, announcement.description, announcement.content, signature,
        ),
    )
}

fn quiz_job(member: &Recipient, quiz: &QuizSummary) -> NotificationJob {
    NotificationJob::new(
        member.email.clone(),
        "Notification: New QCM Available".to_string(),
        format!(
            "Dear {},\n\n\
             We are pleased to inform you that a new QCM titled \"{}\" has been created and is \
             now available on the platform.\n\n\
             Please log in to the platform to review the QCM and complete it before the \
             deadline. If you have any questions, feel free to reach out to your instructor.\n\n\
             Best regards,\n\
             The Academic Team",
            member.name, quiz.title,
        ),
    )
}
