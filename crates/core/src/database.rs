use anyhow::{anyhow, bail, Context, Result};
use chrono::{Local, NaiveDate, Utc};
use rusqlite::{named_params, Connection, OptionalExtension, Row};
use tracing::{debug, warn};
use ulid::Ulid;

use crate::config::AppConfig;
use crate::model::{
    Member, RecordList, SaveListRequest, TaskPayload, TaskRecord, DEFAULT_COUNT_BY,
    DEFAULT_PRIORITY,
};
use crate::schedule::{self, CountBy};

const TASK_COLUMNS: &str = "id, subject, description, activity_date, owner_id, owner_name, \
    priority, date_offset, date_offset_units, do_not_recalculate, reminder_offset, reminder_time, \
    recurrence_type, recurrence_interval, list_id, what_id, activity_sidecar, date_source, \
    date_source_field, date_source_record_id";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedSummary {
    pub list_id: String,
    pub members: usize,
    pub tasks: usize,
}

pub struct Database {
    conn: Connection,
}

impl Database {
    pub fn initialize(config: &AppConfig) -> Result<Self> {
        let conn = Connection::open(config.db_path()).with_context(|| {
            format!("Failed to open database at {}", config.db_path().display())
        })?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")
            .context("Failed to configure SQLite WAL mode")?;

        let db = Self { conn };
        db.apply_migrations()?;
        Ok(db)
    }

    pub fn fetch_record_lists(&self, record_id: &str) -> Result<Vec<RecordList>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, start_date, parent_id FROM record_lists
             WHERE parent_id = :parent_id ORDER BY created_at, name",
        )?;
        let lists = stmt
            .query_map(named_params![":parent_id": record_id], map_list)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(lists)
    }

    pub fn fetch_record_list(&self, list_id: &str) -> Result<Option<RecordList>> {
        let list = self
            .conn
            .query_row(
                "SELECT id, name, start_date, parent_id FROM record_lists WHERE id = :id",
                named_params![":id": list_id],
                map_list,
            )
            .optional()?;
        Ok(list)
    }

    pub fn fetch_members(&self, record_id: &str) -> Result<Vec<Member>> {
        let mut stmt = self.conn.prepare(
            "SELECT user_id, user_name FROM members
             WHERE record_id = :record_id ORDER BY position, user_name",
        )?;
        let members = stmt
            .query_map(named_params![":record_id": record_id], |row| {
                Ok(Member {
                    user_id: row.get(0)?,
                    user_name: row.get(1)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(members)
    }

    /// Replace the roster of `record_id`, keeping the given order.
    pub fn replace_members(&mut self, record_id: &str, members: &[Member]) -> Result<()> {
        let tx = self.conn.transaction()?;
        tx.execute(
            "DELETE FROM members WHERE record_id = :record_id",
            named_params![":record_id": record_id],
        )?;
        for (position, member) in members.iter().enumerate() {
            tx.execute(
                "INSERT INTO members (record_id, user_id, user_name, position)
                 VALUES (:record_id, :user_id, :user_name, :position)",
                named_params![
                    ":record_id": record_id,
                    ":user_id": &member.user_id,
                    ":user_name": &member.user_name,
                    ":position": position as i64,
                ],
            )?;
        }
        tx.commit()?;
        Ok(())
    }

    pub fn fetch_tasks(&self, list_id: &str) -> Result<Vec<TaskRecord>> {
        let sql = format!(
            "SELECT {} FROM tasks WHERE list_id = :list_id ORDER BY position, created_at",
            TASK_COLUMNS
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let tasks = stmt
            .query_map(named_params![":list_id": list_id], map_task)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(tasks)
    }

    /// Template for a new task on `list_id`, due on the list's target date.
    pub fn default_task(&self, record_id: &str, list_id: &str) -> Result<TaskRecord> {
        let list = self
            .fetch_record_list(list_id)?
            .ok_or_else(|| anyhow!("List {} does not exist", list_id))?;

        Ok(TaskRecord {
            activity_date: list.start_date,
            priority: Some(DEFAULT_PRIORITY.to_string()),
            date_offset: 0,
            date_offset_units: Some(DEFAULT_COUNT_BY.to_string()),
            list_id: Some(list_id.to_string()),
            what_id: Some(record_id.to_string()),
            ..TaskRecord::default()
        })
    }

    /// Persist a list header with its task upserts and deletions atomically.
    pub fn save_list(&mut self, request: &SaveListRequest) -> Result<String> {
        let tx = self.conn.transaction()?;
        let list_id = upsert_list(&tx, &request.record_id, &request.list_record)?;

        for payload in &request.tasks_to_delete {
            delete_task(&tx, &list_id, &payload.id)?;
        }
        for payload in &request.tasks_to_upsert {
            let record = TaskRecord::try_from(payload.clone())?;
            upsert_task(&tx, &list_id, &request.record_id, &record)?;
        }

        tx.commit()?;
        debug!(
            list_id = %list_id,
            upserts = request.tasks_to_upsert.len(),
            deletes = request.tasks_to_delete.len(),
            "list saved"
        );
        Ok(list_id)
    }

    /// Recompute the due date of every unpinned task from the list target date.
    /// Returns the number of tasks whose date moved.
    pub fn recalculate(&mut self, list_id: &str) -> Result<usize> {
        let list = self
            .fetch_record_list(list_id)?
            .ok_or_else(|| anyhow!("List {} does not exist", list_id))?;
        let Some(start) = list.start_date else {
            warn!(list_id, "list has no target date; nothing to recalculate");
            return Ok(0);
        };
        let tasks = self.fetch_tasks(list_id)?;

        let tx = self.conn.transaction()?;
        let mut moved = 0;
        for task in tasks.iter().filter(|task| !task.do_not_recalculate) {
            let units = resolve_units(task.date_offset_units.as_deref());
            let due = schedule::shift(start, task.date_offset, units).ok_or_else(|| {
                anyhow!(
                    "Offset {} {} from {} is out of range",
                    task.date_offset,
                    units,
                    start
                )
            })?;
            if task.activity_date == Some(due) {
                continue;
            }
            tx.execute(
                "UPDATE tasks SET activity_date = :activity_date, updated_at = :updated_at
                 WHERE id = :id",
                named_params![
                    ":activity_date": due,
                    ":updated_at": Utc::now().to_rfc3339(),
                    ":id": task.id.as_deref(),
                ],
            )?;
            moved += 1;
        }
        tx.commit()?;
        debug!(list_id, moved, "list recalculated");
        Ok(moved)
    }

    /// Insert a sample roster, a list and a handful of tasks under `record_id`.
    pub fn seed_sample(&mut self, record_id: &str) -> Result<SeedSummary> {
        let members = vec![
            Member {
                user_id: "USR-001".into(),
                user_name: "Avery Quinn".into(),
            },
            Member {
                user_id: "USR-002".into(),
                user_name: "Blake Moreno".into(),
            },
            Member {
                user_id: "USR-003".into(),
                user_name: "Casey Lindqvist".into(),
            },
        ];
        self.replace_members(record_id, &members)?;

        let start = Local::now().date_naive() + chrono::Duration::days(60);
        let list = RecordList {
            id: None,
            name: Some("Trial Preparation".into()),
            start_date: Some(start),
            parent_id: Some(record_id.to_string()),
        };
        let samples: [(&str, i32, &str, &Member, bool); 4] = [
            ("Serve initial disclosures", -45, "DAYS", &members[0], false),
            ("Complete expert depositions", -4, "WEEKS", &members[1], false),
            ("File motions in limine", -10, "BUSINESS DAYS", &members[0], false),
            ("Final pretrial conference", -1, "DAYS", &members[2], true),
        ];
        let tasks = samples
            .iter()
            .map(|(subject, offset, units, owner, pinned)| {
                let record = TaskRecord {
                    subject: Some(subject.to_string()),
                    owner_id: Some(owner.user_id.clone()),
                    owner_name: Some(owner.user_name.clone()),
                    priority: Some(DEFAULT_PRIORITY.to_string()),
                    date_offset: *offset,
                    date_offset_units: Some(units.to_string()),
                    do_not_recalculate: *pinned,
                    activity_date: Some(start),
                    ..TaskRecord::default()
                };
                TaskPayload::from_record(&record, Some(start), record_id)
            })
            .collect::<Vec<_>>();

        let list_id = self.save_list(&SaveListRequest {
            record_id: record_id.to_string(),
            list_record: list,
            tasks_to_upsert: tasks,
            tasks_to_delete: Vec::new(),
        })?;
        self.recalculate(&list_id)?;

        Ok(SeedSummary {
            list_id,
            members: members.len(),
            tasks: samples.len(),
        })
    }

    fn apply_migrations(&self) -> Result<()> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS record_lists (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                start_date TEXT,
                parent_id TEXT NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
             );
             CREATE TABLE IF NOT EXISTS members (
                record_id TEXT NOT NULL,
                user_id TEXT NOT NULL,
                user_name TEXT NOT NULL,
                position INTEGER NOT NULL DEFAULT 0,
                PRIMARY KEY (record_id, user_id)
             );
             CREATE TABLE IF NOT EXISTS tasks (
                id TEXT PRIMARY KEY,
                list_id TEXT NOT NULL REFERENCES record_lists(id),
                what_id TEXT,
                subject TEXT,
                description TEXT,
                activity_date TEXT,
                owner_id TEXT,
                owner_name TEXT,
                priority TEXT,
                date_offset INTEGER NOT NULL DEFAULT 0,
                date_offset_units TEXT,
                do_not_recalculate INTEGER NOT NULL DEFAULT 0,
                reminder_offset INTEGER,
                reminder_time TEXT,
                recurrence_type TEXT,
                recurrence_interval INTEGER,
                activity_sidecar TEXT,
                date_source TEXT,
                date_source_field TEXT,
                date_source_record_id TEXT,
                position INTEGER NOT NULL DEFAULT 0,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
             );
             CREATE INDEX IF NOT EXISTS idx_record_lists_parent ON record_lists(parent_id);
             CREATE INDEX IF NOT EXISTS idx_tasks_list ON tasks(list_id);
            ",
        )?;
        Ok(())
    }
}

fn resolve_units(raw: Option<&str>) -> CountBy {
    let Some(raw) = raw.filter(|value| !value.trim().is_empty()) else {
        return CountBy::Days;
    };
    raw.parse().unwrap_or_else(|_| {
        warn!(units = raw, "unknown count-by unit; counting calendar days");
        CountBy::Days
    })
}

fn upsert_list(conn: &Connection, record_id: &str, list: &RecordList) -> Result<String> {
    let name = list
        .name
        .as_deref()
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .ok_or_else(|| anyhow!("List name is required"))?;
    let now = Utc::now().to_rfc3339();

    match list.id.as_deref().filter(|id| !id.is_empty()) {
        Some(id) => {
            let updated = conn.execute(
                "UPDATE record_lists SET name = :name, start_date = :start_date,
                 updated_at = :updated_at WHERE id = :id",
                named_params![
                    ":name": name,
                    ":start_date": list.start_date,
                    ":updated_at": &now,
                    ":id": id,
                ],
            )?;
            if updated == 0 {
                bail!("List {} does not exist", id);
            }
            Ok(id.to_string())
        }
        None => {
            let id = Ulid::new().to_string();
            let parent_id = list.parent_id.as_deref().unwrap_or(record_id);
            conn.execute(
                "INSERT INTO record_lists (id, name, start_date, parent_id, created_at, updated_at)
                 VALUES (:id, :name, :start_date, :parent_id, :created_at, :updated_at)",
                named_params![
                    ":id": &id,
                    ":name": name,
                    ":start_date": list.start_date,
                    ":parent_id": parent_id,
                    ":created_at": &now,
                    ":updated_at": &now,
                ],
            )?;
            Ok(id)
        }
    }
}

fn upsert_task(conn: &Connection, list_id: &str, record_id: &str, task: &TaskRecord) -> Result<String> {
    let now = Utc::now().to_rfc3339();
    let what_id = task
        .what_id
        .as_deref()
        .filter(|id| !id.is_empty())
        .unwrap_or(record_id);

    let (id, sql) = match task.id.as_deref().filter(|id| !id.is_empty()) {
        Some(id) => (
            id.to_string(),
            "UPDATE tasks SET what_id = :what_id, subject = :subject, description = :description,
                activity_date = :activity_date, owner_id = :owner_id, owner_name = :owner_name,
                priority = :priority, date_offset = :date_offset, date_offset_units = :date_offset_units,
                do_not_recalculate = :do_not_recalculate, reminder_offset = :reminder_offset,
                reminder_time = :reminder_time, recurrence_type = :recurrence_type,
                recurrence_interval = :recurrence_interval, activity_sidecar = :activity_sidecar,
                date_source = :date_source, date_source_field = :date_source_field,
                date_source_record_id = :date_source_record_id, updated_at = :now
             WHERE id = :id AND list_id = :list_id",
        ),
        None => (
            Ulid::new().to_string(),
            "INSERT INTO tasks (
                id, list_id, what_id, subject, description, activity_date, owner_id, owner_name,
                priority, date_offset, date_offset_units, do_not_recalculate, reminder_offset,
                reminder_time, recurrence_type, recurrence_interval, activity_sidecar, date_source,
                date_source_field, date_source_record_id, position, created_at, updated_at
             ) VALUES (
                :id, :list_id, :what_id, :subject, :description, :activity_date, :owner_id, :owner_name,
                :priority, :date_offset, :date_offset_units, :do_not_recalculate, :reminder_offset,
                :reminder_time, :recurrence_type, :recurrence_interval, :activity_sidecar, :date_source,
                :date_source_field, :date_source_record_id,
                (SELECT COALESCE(MAX(position), 0) + 1 FROM tasks WHERE list_id = :list_id),
                :now, :now
             )",
        ),
    };

    let changed = conn.execute(
        sql,
        named_params![
            ":id": &id,
            ":list_id": list_id,
            ":what_id": what_id,
            ":subject": task.subject.as_deref(),
            ":description": task.description.as_deref(),
            ":activity_date": task.activity_date,
            ":owner_id": task.owner_id.as_deref(),
            ":owner_name": task.owner_name.as_deref(),
            ":priority": task.priority.as_deref(),
            ":date_offset": task.date_offset,
            ":date_offset_units": task.date_offset_units.as_deref(),
            ":do_not_recalculate": task.do_not_recalculate,
            ":reminder_offset": task.reminder_offset,
            ":reminder_time": task.reminder_time,
            ":recurrence_type": task.recurrence_type.as_deref(),
            ":recurrence_interval": task.recurrence_interval,
            ":activity_sidecar": task.activity_sidecar.as_deref(),
            ":date_source": task.date_source.as_deref(),
            ":date_source_field": task.date_source_field.as_deref(),
            ":date_source_record_id": task.date_source_record_id.as_deref(),
            ":now": &now,
        ],
    )?;
    if changed == 0 {
        bail!("Task {} does not exist on list {}", id, list_id);
    }
    Ok(id)
}

fn delete_task(conn: &Connection, list_id: &str, id: &str) -> Result<()> {
    if id.trim().is_empty() {
        bail!("Cannot delete a task that has not been saved");
    }
    let deleted = conn.execute(
        "DELETE FROM tasks WHERE id = :id AND list_id = :list_id",
        named_params![":id": id, ":list_id": list_id],
    )?;
    if deleted == 0 {
        bail!("Task {} does not exist on list {}", id, list_id);
    }
    Ok(())
}

fn map_list(row: &Row<'_>) -> rusqlite::Result<RecordList> {
    Ok(RecordList {
        id: row.get(0)?,
        name: row.get(1)?,
        start_date: row.get::<_, Option<NaiveDate>>(2)?,
        parent_id: row.get(3)?,
    })
}

fn map_task(row: &Row<'_>) -> rusqlite::Result<TaskRecord> {
    Ok(TaskRecord {
        id: row.get(0)?,
        subject: row.get(1)?,
        description: row.get(2)?,
        activity_date: row.get(3)?,
        owner_id: row.get(4)?,
        owner_name: row.get(5)?,
        priority: row.get(6)?,
        date_offset: row.get(7)?,
        date_offset_units: row.get(8)?,
        do_not_recalculate: row.get(9)?,
        reminder_offset: row.get(10)?,
        reminder_time: row.get(11)?,
        recurrence_type: row.get(12)?,
        recurrence_interval: row.get(13)?,
        list_id: row.get(14)?,
        what_id: row.get(15)?,
        activity_sidecar: row.get(16)?,
        date_source: row.get(17)?,
        date_source_field: row.get(18)?,
        date_source_record_id: row.get(19)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn temp_config() -> (AppConfig, TempDir) {
        let dir = TempDir::new().expect("temp dir");
        let config = AppConfig::from_data_dir(dir.path().to_path_buf());
        (config, dir)
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn new_list(name: &str, start: NaiveDate) -> RecordList {
        RecordList {
            id: None,
            name: Some(name.into()),
            start_date: Some(start),
            parent_id: Some("MATTER-1".into()),
        }
    }

    fn payload(subject: &str, offset: i32, units: &str) -> TaskPayload {
        let record = TaskRecord {
            subject: Some(subject.into()),
            owner_id: Some("USR-001".into()),
            date_offset: offset,
            date_offset_units: Some(units.into()),
            ..TaskRecord::default()
        };
        TaskPayload::from_record(&record, Some(date(2024, 1, 5)), "MATTER-1")
    }

    fn request(list: RecordList, upserts: Vec<TaskPayload>, deletes: Vec<TaskPayload>) -> SaveListRequest {
        SaveListRequest {
            record_id: "MATTER-1".into(),
            list_record: list,
            tasks_to_upsert: upserts,
            tasks_to_delete: deletes,
        }
    }

    #[test]
    fn migrations_create_only_store_tables() {
        let (config, _dir) = temp_config();
        let db = Database::initialize(&config).expect("init db");

        let mut stmt = db
            .conn
            .prepare("SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name")
            .expect("prepare");
        let tables: Vec<String> = stmt
            .query_map([], |row| row.get(0))
            .expect("query")
            .collect::<rusqlite::Result<_>>()
            .expect("rows");
        assert_eq!(tables, vec!["members", "record_lists", "tasks"]);
    }

    #[test]
    fn save_list_inserts_list_and_tasks() {
        let (config, _dir) = temp_config();
        let mut db = Database::initialize(&config).expect("init db");

        let list_id = db
            .save_list(&request(
                new_list("Discovery", date(2024, 1, 5)),
                vec![payload("Serve", 3, "DAYS"), payload("Answer", -2, "WEEKS")],
                vec![],
            ))
            .expect("save list");

        let lists = db.fetch_record_lists("MATTER-1").expect("lists");
        assert_eq!(lists.len(), 1);
        assert_eq!(lists[0].id.as_deref(), Some(list_id.as_str()));
        assert_eq!(lists[0].parent_id.as_deref(), Some("MATTER-1"));

        let tasks = db.fetch_tasks(&list_id).expect("tasks");
        let subjects: Vec<_> = tasks.iter().filter_map(|t| t.subject.as_deref()).collect();
        assert_eq!(subjects, vec!["Serve", "Answer"]);
        assert!(tasks.iter().all(|t| t.is_persisted()));
        assert_eq!(tasks[1].date_offset, -2);
        assert_eq!(tasks[0].what_id.as_deref(), Some("MATTER-1"));
        assert_eq!(tasks[0].activity_date, Some(date(2024, 1, 5)));
    }

    #[test]
    fn save_list_updates_and_deletes() {
        let (config, _dir) = temp_config();
        let mut db = Database::initialize(&config).expect("init db");
        let list_id = db
            .save_list(&request(
                new_list("Discovery", date(2024, 1, 5)),
                vec![payload("Serve", 3, "DAYS"), payload("Answer", -2, "DAYS")],
                vec![],
            ))
            .expect("seed list");
        let tasks = db.fetch_tasks(&list_id).expect("tasks");

        let mut list = db.fetch_record_list(&list_id).unwrap().unwrap();
        list.name = Some("Discovery (amended)".into());
        let mut renamed = tasks[0].clone();
        renamed.subject = Some("Serve again".into());
        let removed = TaskPayload::from_record(&tasks[1], None, "MATTER-1");

        db.save_list(&request(
            list,
            vec![TaskPayload::from_record(&renamed, None, "MATTER-1")],
            vec![removed],
        ))
        .expect("update list");

        let tasks = db.fetch_tasks(&list_id).expect("tasks");
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].subject.as_deref(), Some("Serve again"));
        assert_eq!(
            db.fetch_record_list(&list_id).unwrap().unwrap().name.as_deref(),
            Some("Discovery (amended)")
        );
    }

    #[test]
    fn unknown_task_id_rolls_back_the_whole_save() {
        let (config, _dir) = temp_config();
        let mut db = Database::initialize(&config).expect("init db");
        let list_id = db
            .save_list(&request(new_list("Discovery", date(2024, 1, 5)), vec![], vec![]))
            .expect("create list");
        let list = db.fetch_record_list(&list_id).unwrap().unwrap();

        let mut ghost = payload("Ghost", 0, "DAYS");
        ghost.id = "01HX0000000000000000000000".into();
        let err = db
            .save_list(&request(list, vec![payload("Real", 1, "DAYS"), ghost], vec![]))
            .unwrap_err();

        assert!(err.to_string().contains("does not exist"));
        assert!(db.fetch_tasks(&list_id).unwrap().is_empty());
    }

    #[test]
    fn save_list_requires_a_name() {
        let (config, _dir) = temp_config();
        let mut db = Database::initialize(&config).expect("init db");
        let mut list = new_list("", date(2024, 1, 5));
        list.name = None;

        let err = db.save_list(&request(list, vec![], vec![])).unwrap_err();
        assert_eq!(err.to_string(), "List name is required");
    }

    #[test]
    fn recalculate_shifts_unpinned_tasks_by_units() {
        let (config, _dir) = temp_config();
        let mut db = Database::initialize(&config).expect("init db");
        let mut pinned = payload("Pinned", 30, "DAYS");
        pinned.do_not_recalculate = true;
        let list_id = db
            .save_list(&request(
                new_list("Trial", date(2024, 1, 5)),
                vec![
                    payload("Days", 10, "DAYS"),
                    payload("Business", 1, "BUSINESS DAYS"),
                    payload("Months", -1, "MONTHS"),
                    payload("Odd", 2, "FORTNIGHTS"),
                    pinned,
                ],
                vec![],
            ))
            .expect("save list");

        let moved = db.recalculate(&list_id).expect("recalculate");

        let dates: Vec<_> = db
            .fetch_tasks(&list_id)
            .unwrap()
            .into_iter()
            .map(|t| (t.subject.unwrap(), t.activity_date.unwrap()))
            .collect();
        assert_eq!(
            dates,
            vec![
                ("Days".to_string(), date(2024, 1, 15)),
                ("Business".to_string(), date(2024, 1, 8)),
                ("Months".to_string(), date(2023, 12, 5)),
                ("Odd".to_string(), date(2024, 1, 7)),
                ("Pinned".to_string(), date(2024, 1, 5)),
            ]
        );
        assert_eq!(moved, 4);
    }

    #[test]
    fn default_task_uses_list_target_date() {
        let (config, _dir) = temp_config();
        let mut db = Database::initialize(&config).expect("init db");
        let list_id = db
            .save_list(&request(new_list("Trial", date(2024, 3, 1)), vec![], vec![]))
            .expect("save list");

        let template = db.default_task("MATTER-1", &list_id).expect("template");

        assert_eq!(template.activity_date, Some(date(2024, 3, 1)));
        assert_eq!(template.priority.as_deref(), Some("Normal"));
        assert_eq!(template.date_offset_units.as_deref(), Some("DAYS"));
        assert_eq!(template.list_id.as_deref(), Some(list_id.as_str()));
        assert!(db.default_task("MATTER-1", "missing").is_err());
    }

    #[test]
    fn seed_sample_populates_roster_list_and_tasks() {
        let (config, _dir) = temp_config();
        let mut db = Database::initialize(&config).expect("init db");

        let summary = db.seed_sample("MATTER-9").expect("seed");

        let members = db.fetch_members("MATTER-9").unwrap();
        assert_eq!(members.len(), summary.members);
        assert_eq!(members[0].user_name, "Avery Quinn");
        assert_eq!(db.fetch_tasks(&summary.list_id).unwrap().len(), summary.tasks);
        assert!(db.fetch_members("MATTER-1").unwrap().is_empty());
    }
}
