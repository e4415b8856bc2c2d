use chrono::{DateTime, NaiveDate, Utc};
use lazytask_core::db::open_db_in_memory;
use lazytask_core::{
    AddTaskRequest, EngineError, SqliteTodoStore, StoreError, Task, TaskFilter, TaskStatus,
    TaskValidationError, TodoEngine, TodoStore,
};

const NOW: &str = "2024-06-15T12:00:00Z";

#[test]
fn starts_empty_with_the_all_filter() {
    let conn = open_db_in_memory().unwrap();
    let engine = TodoEngine::load(SqliteTodoStore::try_new(&conn).unwrap());

    assert!(engine.is_empty());
    assert_eq!(engine.len(), 0);
    assert_eq!(engine.active_filter(), TaskFilter::All);
    assert!(engine.visible_tasks().is_empty());
}

#[test]
fn add_prepends_newest_task_first() {
    let conn = open_db_in_memory().unwrap();
    let mut engine = TodoEngine::load(SqliteTodoStore::try_new(&conn).unwrap());

    let first = engine.add_task(&request("first", "2024-06-20"), at(NOW)).unwrap();
    let second = engine.add_task(&request("second", "2024-06-21"), at(NOW)).unwrap();

    assert_eq!(engine.len(), 2);
    assert_eq!(engine.tasks()[0], second);
    assert_eq!(engine.tasks()[1], first);
    assert!(second.id > first.id);
    assert!(!first.completed);
    assert_eq!(first.created_at, at(NOW));
}

#[test]
fn add_trims_description_before_storing() {
    let conn = open_db_in_memory().unwrap();
    let mut engine = TodoEngine::load(SqliteTodoStore::try_new(&conn).unwrap());

    let task = engine
        .add_task(&request("  buy milk  ", "2024-06-20"), at(NOW))
        .unwrap();

    assert_eq!(task.description, "buy milk");
    assert_eq!(task.due_date, date(2024, 6, 20));
}

#[test]
fn add_rejects_blank_description() {
    let conn = open_db_in_memory().unwrap();
    let mut engine = TodoEngine::load(SqliteTodoStore::try_new(&conn).unwrap());

    let err = engine.add_task(&request("   ", "2024-06-20"), at(NOW)).unwrap_err();

    assert!(matches!(
        err,
        EngineError::Validation(TaskValidationError::MissingDescription)
    ));
    assert_eq!(err.to_string(), "missing description");
    assert!(engine.is_empty());
}

#[test]
fn add_rejects_missing_or_malformed_due_date() {
    let conn = open_db_in_memory().unwrap();
    let mut engine = TodoEngine::load(SqliteTodoStore::try_new(&conn).unwrap());

    for due_date in ["", "someday", "2024-6-2x"] {
        let err = engine.add_task(&request("valid text", due_date), at(NOW)).unwrap_err();
        assert!(matches!(
            err,
            EngineError::Validation(TaskValidationError::MissingDate)
        ));
    }
    assert!(engine.is_empty());
}

#[test]
fn add_past_due_date_requires_explicit_confirmation() {
    let conn = open_db_in_memory().unwrap();
    let mut engine = TodoEngine::load(SqliteTodoStore::try_new(&conn).unwrap());

    let declined = engine
        .add_task(&request("overdue on arrival", "2024-06-14"), at(NOW))
        .unwrap_err();
    assert!(matches!(
        declined,
        EngineError::Validation(TaskValidationError::Cancelled)
    ));
    assert!(engine.is_empty());

    let confirmed = AddTaskRequest {
        past_due_confirmed: true,
        ..request("overdue on arrival", "2024-06-14")
    };
    let task = engine.add_task(&confirmed, at(NOW)).unwrap();
    assert_eq!(task.due_date, date(2024, 6, 14));
    assert_eq!(engine.len(), 1);

    // Due today is not past due; no confirmation involved.
    engine
        .add_task(&request("due today", "2024-06-15"), at(NOW))
        .unwrap();
    assert_eq!(engine.len(), 2);
}

#[test]
fn same_instant_additions_issue_distinct_increasing_ids() {
    let conn = open_db_in_memory().unwrap();
    let mut engine = TodoEngine::load(SqliteTodoStore::try_new(&conn).unwrap());

    let first = engine.add_task(&request("first", "2024-06-20"), at(NOW)).unwrap();
    let second = engine.add_task(&request("second", "2024-06-20"), at(NOW)).unwrap();

    assert_eq!(first.id, at(NOW).timestamp_millis());
    assert_eq!(second.id, first.id + 1);
}

#[test]
fn id_watermark_is_seeded_from_loaded_tasks() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteTodoStore::try_new(&conn).unwrap();

    // A stored id far in the future must still never be reused or undercut.
    let future_id = at("2100-01-01T00:00:00Z").timestamp_millis();
    store
        .save(&[Task::new(future_id, "from the future", date(2100, 1, 2), at(NOW))])
        .unwrap();

    let mut engine = TodoEngine::load(SqliteTodoStore::try_new(&conn).unwrap());
    let added = engine.add_task(&request("present day", "2024-06-20"), at(NOW)).unwrap();

    assert_eq!(added.id, future_id + 1);
}

#[test]
fn id_issuing_saturates_at_the_integer_ceiling() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteTodoStore::try_new(&conn).unwrap();
    store
        .save(&[Task::new(i64::MAX, "at the ceiling", date(2024, 6, 10), at(NOW))])
        .unwrap();

    let mut engine = TodoEngine::load(SqliteTodoStore::try_new(&conn).unwrap());
    let added = engine
        .add_task(&request("past the ceiling", "2024-06-20"), at(NOW))
        .unwrap();

    assert_eq!(added.id, i64::MAX);
    assert_eq!(engine.len(), 2);
}

#[test]
fn toggle_flips_completion_and_reports_unknown_ids() {
    let conn = open_db_in_memory().unwrap();
    let mut engine = TodoEngine::load(SqliteTodoStore::try_new(&conn).unwrap());
    let task = engine.add_task(&request("flip me", "2024-06-20"), at(NOW)).unwrap();

    assert!(engine.toggle_completed(task.id));
    assert!(engine.tasks()[0].completed);

    assert!(engine.toggle_completed(task.id));
    assert!(!engine.tasks()[0].completed);

    assert!(!engine.toggle_completed(task.id + 999));
}

#[test]
fn delete_requires_confirmation_and_an_existing_id() {
    let conn = open_db_in_memory().unwrap();
    let mut engine = TodoEngine::load(SqliteTodoStore::try_new(&conn).unwrap());
    let keep = engine.add_task(&request("keep", "2024-06-20"), at(NOW)).unwrap();
    let remove = engine.add_task(&request("remove", "2024-06-21"), at(NOW)).unwrap();

    assert!(!engine.delete_task(remove.id, false));
    assert_eq!(engine.len(), 2);

    assert!(!engine.delete_task(remove.id + 999, true));
    assert_eq!(engine.len(), 2);

    assert!(engine.delete_task(remove.id, true));
    assert_eq!(engine.len(), 1);
    assert_eq!(engine.tasks()[0].id, keep.id);
}

#[test]
fn delete_all_clears_only_when_confirmed() {
    let conn = open_db_in_memory().unwrap();
    let mut engine = TodoEngine::load(SqliteTodoStore::try_new(&conn).unwrap());
    engine.add_task(&request("one", "2024-06-20"), at(NOW)).unwrap();
    engine.add_task(&request("two", "2024-06-21"), at(NOW)).unwrap();

    assert_eq!(engine.delete_all(false).unwrap(), 0);
    assert_eq!(engine.len(), 2);

    assert_eq!(engine.delete_all(true).unwrap(), 2);
    assert!(engine.is_empty());
}

#[test]
fn delete_all_on_empty_collection_fails_regardless_of_confirmation() {
    let conn = open_db_in_memory().unwrap();
    let mut engine = TodoEngine::load(SqliteTodoStore::try_new(&conn).unwrap());

    let err = engine.delete_all(true).unwrap_err();
    assert!(matches!(err, EngineError::EmptyCollection));
    assert_eq!(err.to_string(), "nothing to delete");

    assert!(matches!(engine.delete_all(false), Err(EngineError::EmptyCollection)));
}

#[test]
fn filter_selects_matching_tasks_preserving_order() {
    let conn = open_db_in_memory().unwrap();
    let mut engine = TodoEngine::load(SqliteTodoStore::try_new(&conn).unwrap());
    engine.add_task(&request("oldest", "2024-06-20"), at(NOW)).unwrap();
    let middle = engine.add_task(&request("middle", "2024-06-21"), at(NOW)).unwrap();
    engine.add_task(&request("newest", "2024-06-22"), at(NOW)).unwrap();
    engine.toggle_completed(middle.id);

    assert_eq!(visible_descriptions(&engine), ["newest", "middle", "oldest"]);

    engine.set_filter(TaskFilter::Completed);
    assert_eq!(engine.active_filter(), TaskFilter::Completed);
    assert_eq!(visible_descriptions(&engine), ["middle"]);

    engine.set_filter(TaskFilter::Pending);
    assert_eq!(visible_descriptions(&engine), ["newest", "oldest"]);

    engine.set_filter(TaskFilter::All);
    assert_eq!(engine.visible_tasks().len(), 3);
}

#[test]
fn every_mutation_persists_through_the_store() {
    let conn = open_db_in_memory().unwrap();
    let mut engine = TodoEngine::load(SqliteTodoStore::try_new(&conn).unwrap());

    let task = engine.add_task(&request("tracked", "2024-06-20"), at(NOW)).unwrap();
    assert_eq!(stored_tasks(&conn).len(), 1);

    engine.toggle_completed(task.id);
    assert!(stored_tasks(&conn)[0].completed);

    engine.delete_task(task.id, true);
    assert!(stored_tasks(&conn).is_empty());
}

#[test]
fn reload_restores_tasks_and_resets_the_filter() {
    let conn = open_db_in_memory().unwrap();

    let (expected_first, expected_second) = {
        let mut engine = TodoEngine::load(SqliteTodoStore::try_new(&conn).unwrap());
        let first = engine.add_task(&request("first", "2024-06-20"), at(NOW)).unwrap();
        let second = engine.add_task(&request("second", "2024-06-21"), at(NOW)).unwrap();
        engine.toggle_completed(first.id);
        engine.set_filter(TaskFilter::Completed);
        (first, second)
    };

    let engine = TodoEngine::load(SqliteTodoStore::try_new(&conn).unwrap());
    assert_eq!(engine.len(), 2);
    assert_eq!(engine.tasks()[0].id, expected_second.id);
    assert_eq!(engine.tasks()[1].id, expected_first.id);
    assert!(engine.tasks()[1].completed);
    assert_eq!(engine.active_filter(), TaskFilter::All, "the filter is not durable");
}

#[test]
fn persist_failure_keeps_in_memory_state() {
    let mut engine = TodoEngine::load(UnwritableStore);

    let task = engine.add_task(&request("still here", "2024-06-20"), at(NOW)).unwrap();
    assert_eq!(engine.len(), 1);

    assert!(engine.toggle_completed(task.id));
    assert!(engine.tasks()[0].completed);

    assert!(engine.delete_task(task.id, true));
    assert!(engine.is_empty());
}

#[test]
fn daily_flow_add_toggle_filter_then_clear() {
    let conn = open_db_in_memory().unwrap();
    let mut engine = TodoEngine::load(SqliteTodoStore::try_new(&conn).unwrap());
    let today = at(NOW).date_naive();

    let milk = engine.add_task(&request("Buy milk", "2024-06-16"), at(NOW)).unwrap();
    let taxes = AddTaskRequest {
        past_due_confirmed: true,
        ..request("File taxes", "2024-04-15")
    };
    engine.add_task(&taxes, at(NOW)).unwrap();

    engine.set_filter(TaskFilter::Pending);
    assert_eq!(visible_descriptions(&engine), ["File taxes", "Buy milk"]);
    assert_eq!(engine.visible_tasks()[1].status_on(today), TaskStatus::Pending);
    assert_eq!(engine.visible_tasks()[0].status_on(today), TaskStatus::Overdue);

    engine.toggle_completed(milk.id);
    assert_eq!(visible_descriptions(&engine), ["File taxes"]);

    engine.set_filter(TaskFilter::Completed);
    assert_eq!(visible_descriptions(&engine), ["Buy milk"]);
    assert_eq!(engine.visible_tasks()[0].status_on(today), TaskStatus::Completed);

    assert_eq!(engine.delete_all(true).unwrap(), 2);
    assert!(stored_tasks(&conn).is_empty());
}

struct UnwritableStore;

impl TodoStore for UnwritableStore {
    fn load(&self) -> Vec<Task> {
        Vec::new()
    }

    fn save(&self, _tasks: &[Task]) -> Result<(), StoreError> {
        Err(StoreError::MissingRequiredTable("kv_store"))
    }
}

fn request(description: &str, due_date: &str) -> AddTaskRequest {
    AddTaskRequest {
        description: description.to_string(),
        due_date: due_date.to_string(),
        past_due_confirmed: false,
    }
}

fn at(rfc3339: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(rfc3339)
        .unwrap()
        .with_timezone(&Utc)
}

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

fn visible_descriptions<S: TodoStore>(engine: &TodoEngine<S>) -> Vec<&str> {
    engine
        .visible_tasks()
        .into_iter()
        .map(|task| task.description.as_str())
        .collect()
}

fn stored_tasks(conn: &rusqlite::Connection) -> Vec<Task> {
    SqliteTodoStore::try_new(conn).unwrap().load()
}
