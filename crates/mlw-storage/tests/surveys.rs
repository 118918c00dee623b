use mlw_core::filter::SurveyFilter;
use mlw_core::models::ids::{PatientId, SurveyId, UserId};
use mlw_core::models::page::PageRequest;
use mlw_core::models::survey::{Survey, SurveyInput};
use mlw_storage::error::StorageError;
use mlw_storage::{pool, surveys};
use sqlx::SqlitePool;

const ALICE: UserId = UserId(1);
const BOB: UserId = UserId(2);
const CAROL: UserId = UserId(3);

const FIRST_PAGE: PageRequest = PageRequest {
    page: 1,
    page_size: 50,
};

fn input(name: &str, description: Option<&str>, patient: Option<i64>, users: &[UserId]) -> SurveyInput {
    SurveyInput {
        name: name.to_string(),
        description: description.map(str::to_string),
        patient_id: patient.map(PatientId),
        user_ids: users.to_vec(),
    }
}

async fn create(pool: &SqlitePool, owner: UserId, input: SurveyInput) -> Survey {
    let directory = mlw_core::media_paths::new_survey_directory();
    surveys::create_survey(pool, owner, &input, &directory)
        .await
        .unwrap()
}

async fn names(pool: &SqlitePool, filter: &SurveyFilter) -> Vec<String> {
    let page = surveys::list_surveys(pool, filter, FIRST_PAGE).await.unwrap();
    page.results.into_iter().map(|s| s.name).collect()
}

#[tokio::test]
async fn list_includes_owned_and_shared_only() {
    let pool = pool::connect_in_memory().await.unwrap();
    create(&pool, ALICE, input("alice-own", None, None, &[])).await;
    create(&pool, BOB, input("bob-shared", None, None, &[ALICE])).await;
    create(&pool, BOB, input("bob-private", None, None, &[CAROL])).await;

    let visible = names(&pool, &SurveyFilter::visible_to(ALICE)).await;
    assert_eq!(visible, vec!["bob-shared", "alice-own"]);

    let visible = names(&pool, &SurveyFilter::visible_to(CAROL)).await;
    assert_eq!(visible, vec!["bob-private"]);
}

#[tokio::test]
async fn owner_who_is_also_a_member_is_listed_once() {
    let pool = pool::connect_in_memory().await.unwrap();
    create(&pool, ALICE, input("mine", None, None, &[ALICE, BOB])).await;

    let page = surveys::list_surveys(&pool, &SurveyFilter::visible_to(ALICE), FIRST_PAGE)
        .await
        .unwrap();
    assert_eq!(page.count, 1);
    assert_eq!(page.results[0].user_ids, vec![ALICE, BOB]);
}

#[tokio::test]
async fn search_text_matches_name_or_description_case_insensitively() {
    let pool = pool::connect_in_memory().await.unwrap();
    create(&pool, ALICE, input("Knee Flexion", None, None, &[])).await;
    create(&pool, ALICE, input("Gait", Some("left KNEE after surgery"), None, &[])).await;
    create(&pool, ALICE, input("Shoulder", Some("rotation"), None, &[])).await;

    let filter = SurveyFilter {
        search_text: Some("knee".to_string()),
        ..SurveyFilter::visible_to(ALICE)
    };
    assert_eq!(names(&pool, &filter).await, vec!["Gait", "Knee Flexion"]);
}

#[tokio::test]
async fn search_folds_case_outside_ascii() {
    let pool = pool::connect_in_memory().await.unwrap();
    create(&pool, ALICE, input("Опрос пациента", None, None, &[])).await;
    create(&pool, ALICE, input("Ärztliche Umfrage", None, None, &[])).await;
    create(&pool, ALICE, input("Gait", Some("Nach der ÖPERATION"), None, &[])).await;

    let search = |text: &str| SurveyFilter {
        search_text: Some(text.to_string()),
        ..SurveyFilter::visible_to(ALICE)
    };

    assert_eq!(names(&pool, &search("опрос")).await, vec!["Опрос пациента"]);
    assert_eq!(names(&pool, &search("ПАЦИЕНТА")).await, vec!["Опрос пациента"]);
    assert_eq!(names(&pool, &search("ärztliche")).await, vec!["Ärztliche Umfrage"]);
    assert_eq!(names(&pool, &search("öperation")).await, vec!["Gait"]);
}

#[tokio::test]
async fn search_follows_updated_names() {
    let pool = pool::connect_in_memory().await.unwrap();
    let survey = create(&pool, ALICE, input("Опрос", None, None, &[])).await;

    surveys::update_survey(&pool, ALICE, survey.id, &input("Ärztliche", None, None, &[]))
        .await
        .unwrap();

    let search = |text: &str| SurveyFilter {
        search_text: Some(text.to_string()),
        ..SurveyFilter::visible_to(ALICE)
    };
    assert!(names(&pool, &search("опрос")).await.is_empty());
    assert_eq!(names(&pool, &search("ärzt")).await, vec!["Ärztliche"]);
}

#[tokio::test]
async fn search_wildcards_are_literal() {
    let pool = pool::connect_in_memory().await.unwrap();
    create(&pool, ALICE, input("100% done", None, None, &[])).await;
    create(&pool, ALICE, input("1000 steps", None, None, &[])).await;
    create(&pool, ALICE, input("a_b", None, None, &[])).await;
    create(&pool, ALICE, input("axb", None, None, &[])).await;

    let percent = SurveyFilter {
        search_text: Some("0%".to_string()),
        ..SurveyFilter::visible_to(ALICE)
    };
    assert_eq!(names(&pool, &percent).await, vec!["100% done"]);

    let underscore = SurveyFilter {
        search_text: Some("a_b".to_string()),
        ..SurveyFilter::visible_to(ALICE)
    };
    assert_eq!(names(&pool, &underscore).await, vec!["a_b"]);
}

#[tokio::test]
async fn patient_filter_is_exact_and_combines_with_search() {
    let pool = pool::connect_in_memory().await.unwrap();
    create(&pool, ALICE, input("gait one", None, Some(7), &[])).await;
    create(&pool, ALICE, input("gait two", None, Some(8), &[])).await;
    create(&pool, ALICE, input("balance", None, Some(7), &[])).await;

    let by_patient = SurveyFilter {
        patient_id: Some(PatientId(7)),
        ..SurveyFilter::visible_to(ALICE)
    };
    assert_eq!(names(&pool, &by_patient).await, vec!["balance", "gait one"]);

    let both = SurveyFilter {
        search_text: Some("gait".to_string()),
        patient_id: Some(PatientId(7)),
        ..SurveyFilter::visible_to(ALICE)
    };
    assert_eq!(names(&pool, &both).await, vec!["gait one"]);
}

#[tokio::test]
async fn pagination_counts_and_bounds() {
    let pool = pool::connect_in_memory().await.unwrap();
    for i in 0..5 {
        create(&pool, ALICE, input(&format!("s{i}"), None, None, &[])).await;
    }

    let filter = SurveyFilter::visible_to(ALICE);
    let second = surveys::list_surveys(&pool, &filter, PageRequest { page: 2, page_size: 2 })
        .await
        .unwrap();
    assert_eq!(second.count, 5);
    assert_eq!(second.next, Some(3));
    assert_eq!(second.previous, Some(1));
    let names: Vec<_> = second.results.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["s2", "s1"]);

    let err = surveys::list_surveys(&pool, &filter, PageRequest { page: 4, page_size: 2 })
        .await
        .unwrap_err();
    assert!(matches!(err, StorageError::PageOutOfRange { page: 4 }));

    let empty = surveys::list_surveys(&pool, &SurveyFilter::visible_to(CAROL), FIRST_PAGE)
        .await
        .unwrap();
    assert_eq!(empty.count, 0);
    assert!(empty.results.is_empty());
}

#[tokio::test]
async fn get_hides_surveys_from_outsiders() {
    let pool = pool::connect_in_memory().await.unwrap();
    let survey = create(&pool, ALICE, input("mine", None, None, &[BOB])).await;

    let fetched = surveys::get_survey(&pool, BOB, survey.id).await.unwrap();
    assert_eq!(fetched, survey);

    let err = surveys::get_survey(&pool, CAROL, survey.id).await.unwrap_err();
    assert!(matches!(err, StorageError::SurveyNotFound { .. }));
}

#[tokio::test]
async fn update_replaces_fields_but_not_owner_or_directory() {
    let pool = pool::connect_in_memory().await.unwrap();
    let survey = create(&pool, ALICE, input("before", Some("d"), Some(1), &[BOB])).await;

    let updated = surveys::update_survey(
        &pool,
        BOB,
        survey.id,
        &input("after", None, Some(2), &[CAROL]),
    )
    .await
    .unwrap();

    assert_eq!(updated.owner_id, ALICE);
    assert_eq!(updated.directory, survey.directory);
    assert_eq!(updated.user_ids, vec![CAROL]);

    let stored = surveys::get_survey(&pool, ALICE, survey.id).await.unwrap();
    assert_eq!(stored, updated);

    // BOB lost access with the new member list.
    let err = surveys::get_survey(&pool, BOB, survey.id).await.unwrap_err();
    assert!(matches!(err, StorageError::SurveyNotFound { .. }));
}

#[tokio::test]
async fn outsiders_cannot_update_or_delete() {
    let pool = pool::connect_in_memory().await.unwrap();
    let survey = create(&pool, ALICE, input("mine", None, None, &[])).await;

    let err = surveys::update_survey(&pool, CAROL, survey.id, &input("x", None, None, &[]))
        .await
        .unwrap_err();
    assert!(matches!(err, StorageError::SurveyNotFound { .. }));

    let err = surveys::delete_survey(&pool, CAROL, survey.id).await.unwrap_err();
    assert!(matches!(err, StorageError::SurveyNotFound { .. }));

    surveys::delete_survey(&pool, ALICE, survey.id).await.unwrap();
    let err = surveys::get_survey(&pool, ALICE, survey.id).await.unwrap_err();
    assert!(matches!(err, StorageError::SurveyNotFound { id } if id == survey.id));
}

#[tokio::test]
async fn missing_survey_is_not_found() {
    let pool = pool::connect_in_memory().await.unwrap();
    let err = surveys::get_survey(&pool, ALICE, SurveyId(999)).await.unwrap_err();
    assert!(matches!(err, StorageError::SurveyNotFound { .. }));
}
