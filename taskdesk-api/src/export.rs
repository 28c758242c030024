/// CSV rendering for the task export
///
/// Fields are quoted per RFC 4180: a field containing a comma, a double
/// quote, CR or LF is wrapped in double quotes with inner quotes doubled.
/// Records end with CRLF.

use chrono::{DateTime, Utc};
use taskdesk_shared::models::task::TaskDetail;

/// Header record
pub const HEADER: [&str; 7] = [
    "ID",
    "Title",
    "Description",
    "Status",
    "Due Date",
    "Assigned To",
    "Created By",
];

pub const CONTENT_TYPE: &str = "text/csv; charset=UTF-8";

/// Quotes a single field when needed
pub fn escape_field(field: &str) -> String {
    if field.contains([',', '"', '\r', '\n']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

fn push_record<'a>(out: &mut String, fields: impl IntoIterator<Item = &'a str>) {
    let line = fields
        .into_iter()
        .map(escape_field)
        .collect::<Vec<_>>()
        .join(",");
    out.push_str(&line);
    out.push_str("\r\n");
}

/// Renders tasks as CSV, one record per task after the header
pub fn render_tasks(tasks: &[TaskDetail]) -> String {
    let mut out = String::new();
    push_record(&mut out, HEADER);

    for detail in tasks {
        let task = &detail.task;
        let id = task.id.to_string();
        let due_date = task.due_date.format("%Y-%m-%d").to_string();

        push_record(
            &mut out,
            [
                id.as_str(),
                task.title.as_str(),
                task.description.as_str(),
                task.status.as_str(),
                due_date.as_str(),
                detail.assigned_user.name.as_str(),
                detail.creator.name.as_str(),
            ],
        );
    }

    out
}

/// Download file name, e.g. `tasks_2026-03-01_14-05-09.csv`
pub fn filename(now: DateTime<Utc>) -> String {
    format!("tasks_{}.csv", now.format("%Y-%m-%d_%H-%M-%S"))
}
