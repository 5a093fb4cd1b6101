//! Field rules shared by every task operation that writes data.

use super::{TaskPriority, TaskStatus};

/// Lengths are counted in Unicode scalar values, so an emoji counts once.
pub const MAX_TITLE_LENGTH: usize = 100;
pub const MAX_DESCRIPTION_LENGTH: usize = 500;

/// A single broken field rule. The display text is returned to clients verbatim.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Title is required")]
    TitleRequired,
    #[error("Title cannot be empty")]
    TitleEmpty,
    #[error("Title must be less than 100 characters")]
    TitleTooLong,
    #[error("Description must be less than 500 characters")]
    DescriptionTooLong,
    #[error("Invalid status. Must be: todo, in-progress, or done")]
    InvalidStatus,
    #[error("Invalid priority. Must be: low, medium, or high")]
    InvalidPriority,
}

/// Checks a title that must be present. Missing and blank titles are both rejected.
pub fn validate_title(title: Option<&str>) -> Result<(), ValidationError> {
    match title {
        Some(title) if !title.trim().is_empty() => validate_title_length(title),
        _ => Err(ValidationError::TitleRequired),
    }
}

/// Checks a title supplied to a partial update.
pub fn validate_patched_title(title: &str) -> Result<(), ValidationError> {
    if title.trim().is_empty() {
        return Err(ValidationError::TitleEmpty);
    }
    validate_title_length(title)
}

fn validate_title_length(title: &str) -> Result<(), ValidationError> {
    if title.chars().count() > MAX_TITLE_LENGTH {
        return Err(ValidationError::TitleTooLong);
    }
    Ok(())
}

pub fn validate_description(description: &str) -> Result<(), ValidationError> {
    if description.chars().count() > MAX_DESCRIPTION_LENGTH {
        return Err(ValidationError::DescriptionTooLong);
    }
    Ok(())
}

/// Runs the title rules and then the description rule, reporting the first failure.
pub fn validate_task_data(
    title: Option<&str>,
    description: Option<&str>,
) -> Result<(), ValidationError> {
    validate_title(title)?;
    match description {
        Some(description) => validate_description(description),
        None => Ok(()),
    }
}

pub fn validate_status(status: &str) -> Result<TaskStatus, ValidationError> {
    status.parse()
}

pub fn validate_priority(priority: &str) -> Result<TaskPriority, ValidationError> {
    priority.parse()
}
