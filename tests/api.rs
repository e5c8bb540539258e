mod helpers;

use dosewatch_domain::RecipientContact;
use dosewatch_sdk::{
    APIErrorVariant, ConfirmMedicineInput, ConfirmPrescriptionInput, DosewatchSDK,
    GetParentRemindersInput, NotificationChannel, ReminderStatus, SchedulerState, ID,
};
use helpers::setup::{spawn_app, NOW};

const HOUR: i64 = 1000 * 60 * 60;

fn amoxicillin() -> ConfirmMedicineInput {
    ConfirmMedicineInput {
        medicine_name: "Amoxicillin".into(),
        dosage: "5ml".into(),
        frequency: "4 times a day".into(),
        dose_schedule: vec![
            "08:00".into(),
            "14:00".into(),
            "20:00".into(),
            "02:00".into(),
        ],
        duration_days: Some(7),
    }
}

fn prescription(baby_id: &ID, parent_id: &ID) -> ConfirmPrescriptionInput {
    ConfirmPrescriptionInput {
        baby_id: Some(baby_id.clone()),
        parent_id: Some(parent_id.clone()),
        channels: None,
        timezone: Some("UTC".into()),
        medicines: vec![amoxicillin()],
    }
}

#[actix_web::main]
#[test]
async fn test_status_ok() {
    let (_, sdk, _) = spawn_app().await;
    assert!(sdk.status.check_health().await.is_ok());
}

#[actix_web::main]
#[test]
async fn test_rejects_invalid_api_key() {
    let (_, sdk, address) = spawn_app().await;
    let baby_id = ID::default();

    let client = DosewatchSDK::new(address, "not-the-key");
    let res = client.reminder.get_today(baby_id.clone(), None).await;
    assert_eq!(res.err().map(|e| e.variant), Some(APIErrorVariant::Unauthorized));

    assert!(sdk.reminder.get_today(baby_id, None).await.is_ok());
}

#[actix_web::main]
#[test]
async fn test_confirm_prescription_creates_todays_reminders() {
    let (_, sdk, _) = spawn_app().await;
    let baby_id = ID::default();
    let parent_id = ID::default();

    let res = sdk
        .prescription
        .confirm(prescription(&baby_id, &parent_id))
        .await
        .expect("Expected to confirm prescription");
    assert_eq!(res.reminders_created, 4);
    assert_eq!(res.plans.len(), 1);
    assert!(res.warnings.is_empty());

    // Generated at 09:00, so 08:00 and 02:00 belong to tomorrow
    let today = sdk
        .reminder
        .get_today(baby_id.clone(), None)
        .await
        .expect("Expected to get todays reminders");
    assert_eq!(
        today
            .reminders
            .iter()
            .map(|r| (r.dose_time.to_string(), r.scheduled_for))
            .collect::<Vec<_>>(),
        vec![
            ("14:00".to_string(), NOW + 5 * HOUR),
            ("20:00".to_string(), NOW + 11 * HOUR),
        ]
    );
    assert_eq!(today.summary.total, 2);
    assert_eq!(today.summary.pending, 2);

    // Confirming again does not duplicate reminders
    let res = sdk
        .prescription
        .confirm(prescription(&baby_id, &parent_id))
        .await
        .expect("Expected to confirm prescription");
    assert_eq!(res.reminders_created, 0);
}

#[actix_web::main]
#[test]
async fn test_confirm_prescription_without_baby_returns_warning() {
    let (_, sdk, _) = spawn_app().await;
    let mut input = prescription(&ID::default(), &ID::default());
    input.baby_id = None;

    let res = sdk
        .prescription
        .confirm(input)
        .await
        .expect("Expected confirmation to succeed");
    assert_eq!(res.reminders_created, 0);
    assert_eq!(res.warnings.len(), 1);
}

#[actix_web::main]
#[test]
async fn test_reminder_lifecycle() {
    let (app, sdk, _) = spawn_app().await;
    let baby_id = ID::default();
    let parent_id = ID::default();
    app.recipients.set_contact(
        &parent_id,
        RecipientContact {
            push_token: Some("ExponentPushToken[abc]".into()),
            phone_number: None,
        },
    );
    sdk.prescription
        .confirm(prescription(&baby_id, &parent_id))
        .await
        .expect("Expected to confirm prescription");

    // The 14:00 dose is due
    app.sys.set(NOW + 5 * HOUR);
    let report = app
        .scheduler
        .run_pass()
        .await
        .expect("Expected the pass to run");
    assert_eq!(report.batch_size, 1);
    assert_eq!(report.sent, 1);
    assert_eq!(app.push.sent().len(), 1);
    assert!(app.messaging.sent().is_empty());

    let status = sdk
        .scheduler
        .status()
        .await
        .expect("Expected scheduler status");
    assert_eq!(status.state, SchedulerState::Idle);
    assert_eq!(status.last_batch_size, Some(1));

    let sent = sdk
        .reminder
        .get_for_parent(GetParentRemindersInput {
            parent_id: parent_id.clone(),
            status: Some(ReminderStatus::Sent),
            start_date: None,
            end_date: None,
        })
        .await
        .expect("Expected to get reminders")
        .reminders;
    assert_eq!(sent.len(), 1);
    let reminder = &sent[0];
    assert_eq!(reminder.attempt_count, 1);
    assert_eq!(reminder.error_message, None);
    assert_eq!(reminder.channels, NotificationChannel::all());

    let dismissed = sdk
        .reminder
        .dismiss(reminder.id.clone())
        .await
        .expect("Expected to dismiss reminder")
        .reminder;
    assert_eq!(dismissed.status, ReminderStatus::Dismissed);
    assert_eq!(dismissed.attempt_count, 1);

    let reminder = sdk
        .reminder
        .get(reminder.id.clone())
        .await
        .expect("Expected to get reminder")
        .reminder;
    assert_eq!(reminder.status, ReminderStatus::Dismissed);
}

#[actix_web::main]
#[test]
async fn test_reminder_without_address_fails() {
    let (app, sdk, _) = spawn_app().await;
    let baby_id = ID::default();
    let parent_id = ID::default();
    sdk.prescription
        .confirm(prescription(&baby_id, &parent_id))
        .await
        .expect("Expected to confirm prescription");

    app.sys.set(NOW + 5 * HOUR);
    let report = app
        .scheduler
        .run_pass()
        .await
        .expect("Expected the pass to run");
    assert_eq!(report.failed, 1);

    let failed = sdk
        .reminder
        .get_for_parent(GetParentRemindersInput {
            parent_id,
            status: Some(ReminderStatus::Failed),
            start_date: Some("2026-10-16".into()),
            end_date: Some("2026-10-16".into()),
        })
        .await
        .expect("Expected to get reminders")
        .reminders;
    assert_eq!(failed.len(), 1);
    assert_eq!(
        failed[0].error_message.as_deref(),
        Some("no delivery channel available")
    );
}

#[actix_web::main]
#[test]
async fn test_invalid_queries_are_rejected() {
    let (_, sdk, _) = spawn_app().await;

    let res = sdk
        .reminder
        .get_for_parent(GetParentRemindersInput {
            parent_id: ID::default(),
            status: None,
            start_date: Some("2026-02-30".into()),
            end_date: None,
        })
        .await;
    assert_eq!(res.err().map(|e| e.variant), Some(APIErrorVariant::BadClientData));

    let res = sdk
        .reminder
        .get_today(ID::default(), Some("Mars/Olympus".into()))
        .await;
    assert_eq!(res.err().map(|e| e.variant), Some(APIErrorVariant::BadClientData));

    let res = sdk.reminder.dismiss(ID::default()).await;
    assert_eq!(res.err().map(|e| e.variant), Some(APIErrorVariant::NotFound));
}
