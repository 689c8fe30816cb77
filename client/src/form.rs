// Copyright (c) 2025 sbksba
//
// This software is licensed under the terms of the MIT License.
// See the LICENSE file in the project root for the full license text.
use chrono::{DateTime, Local, NaiveDateTime, TimeZone, Utc};
use common::CreateTaskPayload;
use thiserror::Error;

/// Wall-clock formats accepted for the completion time, read in local time.
const LOCAL_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%d %H:%M:%S",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TaskField {
    #[default]
    Title,
    EstimatedCompletionTime,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormError {
    #[error("Title is required")]
    TitleRequired,

    #[error("Invalid date and time")]
    InvalidCompletionTime,
}

impl FormError {
    pub fn field(&self) -> TaskField {
        match self {
            FormError::TitleRequired => TaskField::Title,
            FormError::InvalidCompletionTime => TaskField::EstimatedCompletionTime,
        }
    }
}

/// The task creation form: raw field bindings plus the errors of the last
/// validation.
#[derive(Debug, Clone, Default)]
pub struct TaskForm {
    pub title: String,
    pub estimated_completion_time: String,
    errors: Vec<FormError>,
}

impl TaskForm {
    /// Checks the fields and builds the request body.
    pub fn validate(&self) -> Result<CreateTaskPayload, Vec<FormError>> {
        let mut errors = Vec::new();

        let title = self.title.trim();
        if title.is_empty() {
            errors.push(FormError::TitleRequired);
        }

        let estimated_completion_time =
            match normalize_completion_time(&self.estimated_completion_time) {
                Ok(ts) => ts,
                Err(e) => {
                    errors.push(e);
                    None
                }
            };

        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(CreateTaskPayload {
            title: title.to_string(),
            estimated_completion_time,
        })
    }

    /// Validates and remembers the outcome, so the errors can be shown next
    /// to their fields.
    pub fn submit(&mut self) -> Option<CreateTaskPayload> {
        match self.validate() {
            Ok(payload) => {
                self.errors.clear();
                Some(payload)
            }
            Err(errors) => {
                self.errors = errors;
                None
            }
        }
    }

    pub fn errors(&self) -> &[FormError] {
        &self.errors
    }

    pub fn error_for(&self, field: TaskField) -> Option<&FormError> {
        self.errors.iter().find(|e| e.field() == field)
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Turns the optional completion time field into a UTC timestamp.
///
/// Blank input means "no estimate". RFC 3339 input keeps its own offset;
/// wall-clock input is read in the local time zone.
pub fn normalize_completion_time(input: &str) -> Result<Option<DateTime<Utc>>, FormError> {
    let input = input.trim();
    if input.is_empty() {
        return Ok(None);
    }

    if let Ok(ts) = DateTime::parse_from_rfc3339(input) {
        return Ok(Some(ts.with_timezone(&Utc)));
    }

    for format in LOCAL_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(input, format) {
            // `earliest` settles DST overlaps; times inside a DST gap do not exist.
            return Local
                .from_local_datetime(&naive)
                .earliest()
                .map(|ts| Some(ts.with_timezone(&Utc)))
                .ok_or(FormError::InvalidCompletionTime);
        }
    }

    Err(FormError::InvalidCompletionTime)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(title: &str, estimate: &str) -> TaskForm {
        TaskForm {
            title: title.to_string(),
            estimated_completion_time: estimate.to_string(),
            ..TaskForm::default()
        }
    }

    #[test]
    fn test_empty_title_is_rejected() {
        let mut form = form("", "");

        assert!(form.submit().is_none());
        assert_eq!(form.error_for(TaskField::Title), Some(&FormError::TitleRequired));
        assert_eq!(form.errors()[0].to_string(), "Title is required");
    }

    #[test]
    fn test_whitespace_title_is_rejected() {
        let result = form("   ", "").validate();
        assert_eq!(result.unwrap_err(), vec![FormError::TitleRequired]);
    }

    #[test]
    fn test_blank_estimate_is_absent() {
        let payload = form("Buy milk", "").validate().unwrap();

        assert_eq!(payload.title, "Buy milk");
        assert_eq!(payload.estimated_completion_time, None);
        let json = serde_json::to_value(&payload).unwrap();
        assert!(json.get("estimated_completion_time").is_none());
    }

    #[test]
    fn test_rfc3339_estimate_is_converted_to_utc() {
        let ts = normalize_completion_time("2025-01-15T15:30:00+02:00")
            .unwrap()
            .unwrap();
        assert_eq!(common::timestamp::format(&ts), "2025-01-15T13:30:00.000Z");
    }

    #[test]
    fn test_local_estimate_uses_local_zone() {
        let naive = NaiveDateTime::parse_from_str("2025-06-15T14:30", "%Y-%m-%dT%H:%M").unwrap();
        let expected = Local
            .from_local_datetime(&naive)
            .earliest()
            .unwrap()
            .with_timezone(&Utc);

        assert_eq!(
            normalize_completion_time("2025-06-15T14:30").unwrap(),
            Some(expected)
        );
        assert_eq!(
            normalize_completion_time("2025-06-15 14:30:00").unwrap(),
            Some(expected)
        );
    }

    #[test]
    fn test_garbage_estimate_is_a_field_error() {
        let mut form = form("Buy milk", "next tuesday");

        assert!(form.submit().is_none());
        assert_eq!(
            form.error_for(TaskField::EstimatedCompletionTime),
            Some(&FormError::InvalidCompletionTime)
        );
        assert_eq!(form.error_for(TaskField::Title), None);
    }

    #[test]
    fn test_successful_submit_clears_previous_errors() {
        let mut form = form("", "");
        form.submit();
        assert!(!form.errors().is_empty());

        form.title = "Buy milk".to_string();
        assert!(form.submit().is_some());
        assert!(form.errors().is_empty());
    }

    #[test]
    fn test_reset_clears_fields() {
        let mut form = form("Buy milk", "2025-06-15T14:30");
        form.reset();
        assert!(form.title.is_empty());
        assert!(form.estimated_completion_time.is_empty());
    }
}
