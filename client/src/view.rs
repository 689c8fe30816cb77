// Copyright (c) 2025 sbksba
//
// This software is licensed under the terms of the MIT License.
// See the LICENSE file in the project root for the full license text.
//! What the screen shows, computed from controller state.
//!
//! Kept free of any terminal types so the rendering rules can be tested
//! without a terminal.
use crate::controller::Controller;
use crate::status::Operation;

use chrono::{DateTime, Local, Utc};
use common::{CurrentUser, Task};

pub const EMPTY_TASKS: &str = "No tasks yet. Create your first task above.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Badge {
    Completed,
    Pending,
}

impl Badge {
    pub fn label(self) -> &'static str {
        match self {
            Badge::Completed => "Completed",
            Badge::Pending => "Pending",
        }
    }
}

/// One line of the task list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskRow {
    pub id: i64,
    pub title: String,
    /// Completed tasks are drawn crossed out.
    pub struck: bool,
    pub badge: Badge,
    pub estimate: Option<String>,
}

impl From<&Task> for TaskRow {
    fn from(task: &Task) -> Self {
        Self {
            id: task.id,
            title: task.title.clone(),
            struck: task.completed,
            badge: if task.completed {
                Badge::Completed
            } else {
                Badge::Pending
            },
            estimate: task.estimated_completion_time.as_ref().map(format_estimate),
        }
    }
}

pub fn task_rows(tasks: &[Task]) -> Vec<TaskRow> {
    tasks.iter().map(TaskRow::from).collect()
}

/// Human-readable completion estimate, in local time.
pub fn format_estimate(ts: &DateTime<Utc>) -> String {
    format!(
        "Estimated completion: {}",
        ts.with_timezone(&Local).format("%Y-%m-%d %H:%M")
    )
}

/// Label of the header button that opens the login modal.
pub fn account_label(user: Option<&CurrentUser>) -> &'static str {
    if user.is_some() {
        "Change account"
    } else {
        "Login"
    }
}

/// Placeholder for the task list, shown only once nothing is loading.
pub fn empty_message(controller: &Controller) -> Option<&'static str> {
    let loading = controller.status().is_loading(Operation::FetchTasks);
    (controller.tasks().is_empty() && !loading).then_some(EMPTY_TASKS)
}

/// Error banner lines, one per failed operation.
pub fn error_lines(controller: &Controller) -> Vec<String> {
    controller
        .status()
        .errors()
        .map(|(_, message)| message.to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ApiClient;
    use crate::session::Session;
    use crate::storage::LocalStorage;
    use chrono::TimeZone;

    async fn offline_controller() -> Controller {
        let storage = LocalStorage::open("sqlite::memory:").await.unwrap();
        let api = ApiClient::new("http://127.0.0.1:9", None).unwrap();
        Controller::new(api, Session::anonymous(storage))
    }

    fn task(id: i64, completed: bool, estimate: Option<DateTime<Utc>>) -> Task {
        Task {
            id,
            title: format!("Task {id}"),
            completed,
            user_id: Some(1),
            estimated_completion_time: estimate,
            user: None,
        }
    }

    #[test]
    fn test_completed_task_is_struck_with_badge() {
        let row = TaskRow::from(&task(1, true, None));

        assert!(row.struck);
        assert_eq!(row.badge, Badge::Completed);
        assert_eq!(row.badge.label(), "Completed");
        assert_eq!(row.estimate, None);
    }

    #[test]
    fn test_pending_task_with_estimate() {
        let ts = Utc.with_ymd_and_hms(2025, 1, 15, 13, 30, 0).unwrap();
        let row = TaskRow::from(&task(2, false, Some(ts)));

        assert!(!row.struck);
        assert_eq!(row.badge.label(), "Pending");
        let expected = format!(
            "Estimated completion: {}",
            ts.with_timezone(&Local).format("%Y-%m-%d %H:%M")
        );
        assert_eq!(row.estimate, Some(expected));
    }

    #[test]
    fn test_rows_keep_backend_order() {
        let rows = task_rows(&[task(3, false, None), task(1, true, None)]);
        let ids: Vec<i64> = rows.iter().map(|row| row.id).collect();
        assert_eq!(ids, vec![3, 1]);
    }

    #[test]
    fn test_account_label() {
        let user = CurrentUser {
            id: 1,
            email: "user@example.com".to_string(),
            nickname: "user".to_string(),
        };
        assert_eq!(account_label(None), "Login");
        assert_eq!(account_label(Some(&user)), "Change account");
    }

    #[tokio::test]
    async fn test_empty_list_shows_placeholder() {
        let controller = offline_controller().await;
        assert_eq!(empty_message(&controller), Some(EMPTY_TASKS));
    }

    #[tokio::test]
    async fn test_placeholder_hidden_while_loading() {
        let mut controller = offline_controller().await;
        controller.status_mut().start(Operation::FetchTasks);

        assert_eq!(empty_message(&controller), None);

        controller.status_mut().succeed(Operation::FetchTasks);
        assert_eq!(empty_message(&controller), Some(EMPTY_TASKS));
    }

    #[tokio::test]
    async fn test_error_lines_follow_operation_order() {
        let mut controller = offline_controller().await;
        assert!(error_lines(&controller).is_empty());

        // Both fail on validation without touching the network.
        controller.form.title = "Buy milk".to_string();
        controller.create_task().await;
        controller.request_otp().await;

        assert_eq!(
            error_lines(&controller),
            vec![
                "Please enter your email first.".to_string(),
                "Please log in or paste your access token first.".to_string(),
            ]
        );
    }
}
