use chrono::{DateTime, Duration, Utc};

use crate::models::Task;

/// A named derived view over the task collection.
///
/// Every view is a pure function of an already-loaded slice of tasks; the
/// deadline-based views additionally take the evaluation instant so callers
/// (and tests) control the clock. All date comparisons happen in UTC.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Filter {
    Important,
    Today,
    NextWeek,
    Private,
    Shared,
    Project(String),
}

impl Filter {
    /// Parse a filter name as received in the `?filter=` query parameter.
    /// Unknown names yield `None`, which callers treat as "unfiltered".
    pub fn parse(name: &str) -> Option<Self> {
        if let Some(project) = name.strip_prefix("project=") {
            if project.is_empty() {
                return None;
            }
            return Some(Filter::Project(project.to_string()));
        }

        match name.to_ascii_lowercase().as_str() {
            "important" => Some(Filter::Important),
            "today" => Some(Filter::Today),
            "week" | "nextweek" | "next-week" => Some(Filter::NextWeek),
            "private" => Some(Filter::Private),
            "shared" => Some(Filter::Shared),
            _ => None,
        }
    }
}

/// Apply a named filter to a task collection at the given instant.
pub fn apply(tasks: &[Task], filter: &Filter, now: DateTime<Utc>) -> Vec<Task> {
    match filter {
        Filter::Important => important(tasks),
        Filter::Today => today(tasks, now),
        Filter::NextWeek => next_week(tasks, now),
        Filter::Private => private_tasks(tasks),
        Filter::Shared => shared(tasks),
        Filter::Project(name) => by_project(tasks, name),
    }
}

pub fn important(tasks: &[Task]) -> Vec<Task> {
    tasks.iter().filter(|t| t.important).cloned().collect()
}

/// Tasks whose deadline falls on the same UTC calendar day as `now`.
/// Tasks without a deadline are excluded.
pub fn today(tasks: &[Task], now: DateTime<Utc>) -> Vec<Task> {
    tasks
        .iter()
        .filter(|t| t.deadline.is_some_and(|d| d.date_naive() == now.date_naive()))
        .cloned()
        .collect()
}

/// Tasks whose deadline is strictly after `now + 1 day` and strictly before
/// `now + 7 days`: today is excluded, and so is anything a week or more out.
pub fn next_week(tasks: &[Task], now: DateTime<Utc>) -> Vec<Task> {
    let tomorrow = now + Duration::days(1);
    let week_out = now + Duration::days(7);
    tasks
        .iter()
        .filter(|t| t.deadline.is_some_and(|d| d > tomorrow && d < week_out))
        .cloned()
        .collect()
}

pub fn private_tasks(tasks: &[Task]) -> Vec<Task> {
    tasks.iter().filter(|t| t.private).cloned().collect()
}

pub fn shared(tasks: &[Task]) -> Vec<Task> {
    tasks.iter().filter(|t| !t.private).cloned().collect()
}

/// Distinct non-empty project labels, in order of first appearance.
pub fn projects(tasks: &[Task]) -> Vec<String> {
    let mut seen = Vec::new();
    for task in tasks {
        if let Some(project) = &task.project {
            if !project.is_empty() && !seen.contains(project) {
                seen.push(project.clone());
            }
        }
    }
    seen
}

/// Tasks whose project label exactly matches `name`.
pub fn by_project(tasks: &[Task], name: &str) -> Vec<Task> {
    tasks
        .iter()
        .filter(|t| t.project.as_deref() == Some(name))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn task(description: &str) -> Task {
        Task::new(description.to_string())
    }

    fn task_due(description: &str, deadline: DateTime<Utc>) -> Task {
        let mut t = task(description);
        t.deadline = Some(deadline);
        t
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 14, 12, 0, 0).unwrap()
    }

    #[test]
    fn today_matches_calendar_day_only() {
        let tasks = vec![
            task_due("this morning", Utc.with_ymd_and_hms(2026, 3, 14, 0, 30, 0).unwrap()),
            task_due("tonight", Utc.with_ymd_and_hms(2026, 3, 14, 23, 0, 0).unwrap()),
            task_due("tomorrow", Utc.with_ymd_and_hms(2026, 3, 15, 12, 0, 0).unwrap()),
            task("no deadline"),
        ];
        let found = today(&tasks, now());
        assert_eq!(found.len(), 2);
        assert!(found.iter().all(|t| t.deadline.unwrap().date_naive() == now().date_naive()));
    }

    #[test]
    fn next_week_window_is_exclusive_on_both_ends() {
        let tasks = vec![
            // exactly now + 1 day: excluded (strictly after required)
            task_due("boundary low", now() + Duration::days(1)),
            task_due("in window", now() + Duration::days(3)),
            // exactly now + 7 days: excluded (strictly before required)
            task_due("boundary high", now() + Duration::days(7)),
            task_due("next month", now() + Duration::days(30)),
            task("no deadline"),
        ];
        let found = next_week(&tasks, now());
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].description, "in window");
    }

    #[test]
    fn tasks_without_deadline_still_appear_in_flag_views() {
        let mut t = task("flagged");
        t.important = true;
        t.private = true;
        let tasks = vec![t];
        assert_eq!(important(&tasks).len(), 1);
        assert_eq!(private_tasks(&tasks).len(), 1);
        assert!(shared(&tasks).is_empty());
        assert!(today(&tasks, now()).is_empty());
        assert!(next_week(&tasks, now()).is_empty());
    }

    #[test]
    fn projects_are_distinct_in_first_seen_order() {
        let mut a = task("a");
        a.project = Some("home".to_string());
        let mut b = task("b");
        b.project = Some("work".to_string());
        let mut c = task("c");
        c.project = Some("home".to_string());
        let mut d = task("d");
        d.project = Some(String::new());
        let tasks = vec![a, b, c, d, task("e")];

        assert_eq!(projects(&tasks), vec!["home".to_string(), "work".to_string()]);
    }

    #[test]
    fn by_project_is_exact_match() {
        let mut a = task("a");
        a.project = Some("home".to_string());
        let mut b = task("b");
        b.project = Some("homework".to_string());
        let tasks = vec![a, b];

        let found = by_project(&tasks, "home");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].description, "a");
    }

    #[test]
    fn parse_recognizes_known_names_only() {
        assert_eq!(Filter::parse("important"), Some(Filter::Important));
        assert_eq!(Filter::parse("Today"), Some(Filter::Today));
        assert_eq!(Filter::parse("nextweek"), Some(Filter::NextWeek));
        assert_eq!(Filter::parse("week"), Some(Filter::NextWeek));
        assert_eq!(Filter::parse("private"), Some(Filter::Private));
        assert_eq!(Filter::parse("shared"), Some(Filter::Shared));
        assert_eq!(
            Filter::parse("project=Side Gig"),
            Some(Filter::Project("Side Gig".to_string()))
        );
        assert_eq!(Filter::parse("archived"), None);
        assert_eq!(Filter::parse("project="), None);
    }
}
