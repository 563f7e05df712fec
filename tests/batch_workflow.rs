mod common;

use chrono::NaiveDate;
use std::collections::BTreeMap;
use std::num::NonZeroU64;
use uuid::Uuid;

use common::{FakeApi, app_for, draft_batch, graduation_template, student};
use graduation_console::GraduationError;
use graduation_console::api::dto::{BatchFilters, CreateBatchRequest, UpdateBatchRequest};
use graduation_console::entities::{BatchStatus, GraduationType, ResultStatus};
use graduation_console::lifecycle::{self, LifecycleError};
use graduation_console::numbering::{CertificateNumberConfig, NumberingError};
use graduation_console::school::SchoolContext;

fn single_school(school: Uuid) -> SchoolContext {
    SchoolContext::new(Some(school), None, vec![school])
}

fn create_request(school: Uuid) -> CreateBatchRequest {
    CreateBatchRequest {
        school_id: school,
        academic_year_id: Uuid::new_v4(),
        class_id: Some(Uuid::new_v4()),
        from_class_id: None,
        to_class_id: None,
        exam_ids: vec![Uuid::new_v4()],
        exam_weights: BTreeMap::new(),
        graduation_date: NaiveDate::from_ymd_opt(2025, 6, 15).unwrap(),
        graduation_type: GraduationType::FinalYear,
        min_attendance_percentage: None,
        require_attendance: None,
        exclude_approved_leaves: None,
    }
}

#[tokio::test]
async fn test_final_year_batch_from_creation_to_issuance() {
    let school = Uuid::new_v4();
    let api = FakeApi::new();
    let template = graduation_template(Some(school), true);
    api.insert_template(template.clone());
    api.state().next_roster = vec![
        student(ResultStatus::Pass),
        student(ResultStatus::Fail),
        student(ResultStatus::Pass),
        student(ResultStatus::Pass),
    ];
    let app = app_for(&api, single_school(school));

    let batch = app.batches.create(create_request(school)).await.unwrap();
    assert_eq!(batch.status, BatchStatus::Draft);

    let roster = app.batches.generate_students(batch.id, &app.school).await.unwrap();
    assert_eq!(roster.len(), 4);

    let approved = app.batches.approve(batch.id, &app.school).await.unwrap();
    assert_eq!(approved.status, BatchStatus::Approved);

    let config = CertificateNumberConfig::default();
    let preview = app.batches.preview_numbers(&approved, &config).unwrap();
    assert_eq!(preview.first(), Some("NZM-GRADUATION-2025-0001"));
    assert_eq!(preview.last(), Some("NZM-GRADUATION-2025-0003"));

    let issued = app
        .batches
        .issue_certificates(batch.id, template.id, &config, &app.school)
        .await
        .unwrap();
    let numbers: Vec<&str> = issued.iter().map(|c| c.certificate_no.as_str()).collect();
    assert_eq!(
        numbers,
        vec![
            "NZM-GRADUATION-2025-0001",
            "NZM-GRADUATION-2025-0002",
            "NZM-GRADUATION-2025-0003",
        ]
    );
    assert!(issued.iter().all(|c| c.is_valid()));

    let stored = api.batch(batch.id);
    assert_eq!(stored.status, BatchStatus::Issued);
    assert!(lifecycle::available_actions(&stored).is_empty());
}

#[tokio::test]
async fn test_regenerating_students_replaces_the_roster() {
    let school = Uuid::new_v4();
    let api = FakeApi::new();
    let batch = draft_batch(school);
    api.insert_batch(batch.clone());
    let app = app_for(&api, single_school(school));

    api.state().next_roster = vec![student(ResultStatus::Pass), student(ResultStatus::Pass)];
    app.batches.generate_students(batch.id, &app.school).await.unwrap();

    let replacement = vec![student(ResultStatus::Fail)];
    api.state().next_roster = replacement.clone();
    app.batches.generate_students(batch.id, &app.school).await.unwrap();

    assert_eq!(api.batch(batch.id).students, replacement);
}

#[tokio::test]
async fn test_issuing_a_draft_batch_is_refused() {
    let school = Uuid::new_v4();
    let api = FakeApi::new();
    let template = graduation_template(None, true);
    api.insert_template(template.clone());
    let mut batch = draft_batch(school);
    batch.students = vec![student(ResultStatus::Pass)];
    api.insert_batch(batch.clone());
    let app = app_for(&api, single_school(school));

    let err = app
        .batches
        .issue_certificates(batch.id, template.id, &CertificateNumberConfig::default(), &app.school)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        GraduationError::Lifecycle(LifecycleError::InvalidTransition {
            from: BatchStatus::Draft,
            ..
        })
    ));
    assert!(!api.calls().contains(&"issue_certificates".to_string()));
}

#[tokio::test]
async fn test_issuance_needs_a_passing_student() {
    let school = Uuid::new_v4();
    let api = FakeApi::new();
    let template = graduation_template(None, true);
    api.insert_template(template.clone());
    let mut batch = draft_batch(school);
    batch.status = BatchStatus::Approved;
    batch.students = vec![student(ResultStatus::Fail), student(ResultStatus::Pending)];
    api.insert_batch(batch.clone());
    let app = app_for(&api, single_school(school));

    let err = app
        .batches
        .issue_certificates(batch.id, template.id, &CertificateNumberConfig::default(), &app.school)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        GraduationError::Lifecycle(LifecycleError::NoPassingStudents)
    ));
}

#[tokio::test]
async fn test_issued_batch_is_final() {
    let school = Uuid::new_v4();
    let api = FakeApi::new();
    let mut batch = draft_batch(school);
    batch.status = BatchStatus::Issued;
    batch.students = vec![student(ResultStatus::Pass)];
    api.insert_batch(batch.clone());
    let app = app_for(&api, single_school(school));

    let generate = app.batches.generate_students(batch.id, &app.school).await;
    let approve = app.batches.approve(batch.id, &app.school).await;
    let update = app
        .batches
        .update(batch.id, &UpdateBatchRequest::default(), &app.school)
        .await;
    let delete = app.batches.delete(batch.id, &app.school).await;

    for result in [generate.map(|_| ()), approve.map(|_| ()), update.map(|_| ()), delete] {
        assert!(matches!(
            result,
            Err(GraduationError::Lifecycle(LifecycleError::InvalidTransition {
                from: BatchStatus::Issued,
                ..
            }))
        ));
    }
    assert!(api.calls().is_empty());
}

#[tokio::test]
async fn test_graduation_type_is_locked_once_students_exist() {
    let school = Uuid::new_v4();
    let api = FakeApi::new();
    let mut batch = draft_batch(school);
    batch.students = vec![student(ResultStatus::Pass)];
    api.insert_batch(batch.clone());
    let app = app_for(&api, single_school(school));

    let request = UpdateBatchRequest {
        graduation_type: Some(GraduationType::Promotion),
        from_class_id: Some(Uuid::new_v4()),
        to_class_id: Some(Uuid::new_v4()),
        ..Default::default()
    };
    let err = app
        .batches
        .update(batch.id, &request, &app.school)
        .await
        .unwrap_err();

    assert!(err.is_validation());
    assert!(!api.calls().contains(&"update_batch".to_string()));
}

#[tokio::test]
async fn test_class_and_year_are_locked_once_students_exist() {
    let school = Uuid::new_v4();
    let api = FakeApi::new();
    let mut batch = draft_batch(school);
    batch.students = vec![student(ResultStatus::Pass)];
    api.insert_batch(batch.clone());
    let app = app_for(&api, single_school(school));

    let request = UpdateBatchRequest {
        class_id: Some(Uuid::new_v4()),
        academic_year_id: Some(Uuid::new_v4()),
        ..Default::default()
    };
    let err = app
        .batches
        .update(batch.id, &request, &app.school)
        .await
        .unwrap_err();

    match err {
        GraduationError::Validation(errors) => {
            assert!(errors.get("class_id").is_some());
            assert!(errors.get("academic_year_id").is_some());
        }
        other => panic!("unexpected error {other:?}"),
    }
    assert!(api.calls().is_empty());

    let attendance_only = UpdateBatchRequest {
        require_attendance: Some(false),
        ..Default::default()
    };
    app.batches
        .update(batch.id, &attendance_only, &app.school)
        .await
        .unwrap();
    assert_eq!(api.calls(), vec!["update_batch".to_string()]);
}

#[tokio::test]
async fn test_inactive_or_foreign_template_is_rejected() {
    let school = Uuid::new_v4();
    let api = FakeApi::new();
    let inactive = graduation_template(Some(school), false);
    let foreign = graduation_template(Some(Uuid::new_v4()), true);
    api.insert_template(inactive.clone());
    api.insert_template(foreign.clone());
    let mut batch = draft_batch(school);
    batch.status = BatchStatus::Approved;
    batch.students = vec![student(ResultStatus::Pass)];
    api.insert_batch(batch.clone());
    let app = app_for(&api, single_school(school));
    let config = CertificateNumberConfig::default();

    for template_id in [inactive.id, foreign.id] {
        let err = app
            .batches
            .issue_certificates(batch.id, template_id, &config, &app.school)
            .await
            .unwrap_err();
        assert!(matches!(err, GraduationError::TemplateUnavailable(id) if id == template_id));
    }
    assert_eq!(api.batch(batch.id).status, BatchStatus::Approved);
}

#[tokio::test]
async fn test_short_issuance_response_is_an_error() {
    let school = Uuid::new_v4();
    let api = FakeApi::new();
    let template = graduation_template(None, true);
    api.insert_template(template.clone());
    let mut batch = draft_batch(school);
    batch.status = BatchStatus::Approved;
    batch.students = vec![
        student(ResultStatus::Pass),
        student(ResultStatus::Pass),
        student(ResultStatus::Pass),
    ];
    api.insert_batch(batch.clone());
    api.state().short_issue_by = 1;
    let app = app_for(&api, single_school(school));

    let err = app
        .batches
        .issue_certificates(batch.id, template.id, &CertificateNumberConfig::default(), &app.school)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        GraduationError::IssuanceMismatch {
            expected: 3,
            issued: 2
        }
    ));
}

#[tokio::test]
async fn test_numbering_continues_or_starts_where_asked() {
    let school = Uuid::new_v4();
    let api = FakeApi::new();
    let template = graduation_template(None, true);
    api.insert_template(template.clone());
    let app = app_for(&api, single_school(school));

    let mut first = draft_batch(school);
    first.status = BatchStatus::Approved;
    first.students = vec![student(ResultStatus::Pass), student(ResultStatus::Pass)];
    let mut second = first.clone();
    second.id = Uuid::new_v4();
    let mut third = first.clone();
    third.id = Uuid::new_v4();
    for batch in [&first, &second, &third] {
        api.insert_batch(batch.clone());
    }

    let defaults = CertificateNumberConfig::default();
    app.batches
        .issue_certificates(first.id, template.id, &defaults, &app.school)
        .await
        .unwrap();
    let continued = app
        .batches
        .issue_certificates(second.id, template.id, &defaults, &app.school)
        .await
        .unwrap();
    assert_eq!(continued[0].certificate_no, "NZM-GRADUATION-2025-0003");

    let explicit = CertificateNumberConfig::default()
        .with_starting_number(NonZeroU64::new(100).unwrap())
        .with_padding(6);
    let restarted = app
        .batches
        .issue_certificates(third.id, template.id, &explicit, &app.school)
        .await
        .unwrap();
    assert_eq!(restarted[0].certificate_no, "NZM-GRADUATION-2025-000100");
    assert_eq!(restarted[1].certificate_no, "NZM-GRADUATION-2025-000101");
}

#[tokio::test]
async fn test_starting_number_past_the_largest_is_not_sent() {
    let school = Uuid::new_v4();
    let api = FakeApi::new();
    let template = graduation_template(None, true);
    api.insert_template(template.clone());
    let mut batch = draft_batch(school);
    batch.status = BatchStatus::Approved;
    batch.students = vec![student(ResultStatus::Pass), student(ResultStatus::Pass)];
    api.insert_batch(batch.clone());
    let app = app_for(&api, single_school(school));

    let config =
        CertificateNumberConfig::default().with_starting_number(NonZeroU64::new(u64::MAX).unwrap());
    let err = app
        .batches
        .issue_certificates(batch.id, template.id, &config, &app.school)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        GraduationError::Numbering(NumberingError::SequenceOverflow { count: 2, .. })
    ));
    assert!(api.calls().is_empty());
    assert_eq!(api.batch(batch.id).status, BatchStatus::Approved);
}

#[tokio::test]
async fn test_invalid_batch_is_not_sent() {
    let school = Uuid::new_v4();
    let api = FakeApi::new();
    let app = app_for(&api, single_school(school));

    let mut request = create_request(school);
    request.exam_ids.clear();
    request.class_id = None;

    let err = app.batches.create(request).await.unwrap_err();
    match err {
        GraduationError::Validation(errors) => {
            assert!(errors.get("exam_ids").is_some());
            assert!(errors.get("class_id").is_some());
        }
        other => panic!("unexpected error {other:?}"),
    }
    assert!(api.calls().is_empty());
}

#[tokio::test]
async fn test_listing_needs_a_school_when_several_are_available() {
    let api = FakeApi::new();
    let school = SchoolContext::new(None, None, vec![Uuid::new_v4(), Uuid::new_v4()]);
    let app = app_for(&api, school);

    let err = app
        .batches
        .list(&app.school, BatchFilters::default())
        .await
        .unwrap_err();

    assert!(matches!(err, GraduationError::SchoolSelection(_)));
    assert!(err.to_string().contains("--school-id"));
    assert!(api.calls().is_empty());
}
