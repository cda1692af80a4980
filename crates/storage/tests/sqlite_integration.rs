use chrono::Duration;
use storage::repository::SubmissionRepository;
use storage::sqlite::SqliteRepository;
use survey_core::model::{PlannedQuestion, QuestionPlan, SubmissionRecord, UserId, Variant};
use survey_core::time::fixed_now;

fn build_plan(indices: &[Option<usize>]) -> QuestionPlan {
    QuestionPlan::new(
        indices
            .iter()
            .map(|idx| match idx {
                Some(i) => PlannedQuestion::selected(*i, Variant::new("gt", "a", "b")),
                None => PlannedQuestion::empty(),
            })
            .collect(),
    )
}

fn build_record(user: &str, answers: &str, offset_minutes: i64) -> SubmissionRecord {
    SubmissionRecord::build(
        UserId::new(user).unwrap(),
        &answers.parse().unwrap(),
        &build_plan(&[Some(2), None, Some(0)]),
        3,
        fixed_now() + Duration::minutes(offset_minutes),
    )
}

#[tokio::test]
async fn sqlite_appends_and_reads_back_submissions() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_submissions?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");

    repo.append_submission(&build_record("abc123", "AN", 0))
        .await
        .expect("append first");
    repo.append_submission(&build_record("def456", "BNA", 5))
        .await
        .expect("append second");

    assert_eq!(repo.count_submissions().await.unwrap(), 2);

    let rows = repo.list_submission_rows(10).await.expect("list");
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].user_id.as_str(), "def456");
    assert_eq!(rows[0].entries, vec!["B_2", "N_-1", "A_0"]);
    assert_eq!(rows[1].entries, vec!["A_2", "N_-1", "N_0"]);
    assert_eq!(rows[1].submitted_at, fixed_now());
}

#[tokio::test]
async fn sqlite_keeps_duplicate_submissions_as_separate_rows() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_duplicates?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");

    let record = build_record("abc123", "ABA", 0);
    repo.append_submission(&record).await.unwrap();
    repo.append_submission(&record).await.unwrap();

    let user = UserId::new("abc123").unwrap();
    let rows = repo.submissions_for_user(&user).await.unwrap();
    assert_eq!(rows.len(), 2);
    assert!(rows[0].id < rows[1].id);
}

#[tokio::test]
async fn sqlite_migrations_are_idempotent() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_migrate_twice?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("first migrate");
    repo.migrate().await.expect("second migrate");
    assert_eq!(repo.count_submissions().await.unwrap(), 0);
}
