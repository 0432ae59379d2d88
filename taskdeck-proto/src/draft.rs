//! Input validation for new tasks.
//!
//! A [`TaskDraft`] can only be built from input that satisfies the title and
//! description limits, so anything holding one has already passed the
//! boundary check. The repository itself does not re-validate.

/// Minimum task title length in characters, after trimming.
pub const MIN_TITLE_LENGTH: usize = 3;

/// Maximum task title length in characters, after trimming.
pub const MAX_TITLE_LENGTH: usize = 100;

/// Maximum task description length in characters, after trimming.
pub const MAX_DESCRIPTION_LENGTH: usize = 500;

/// Reasons a draft is rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DraftError {
    /// Title is empty or whitespace only.
    #[error("task title cannot be empty")]
    TitleEmpty,
    /// Title is shorter than [`MIN_TITLE_LENGTH`].
    #[error("task title too short (min {MIN_TITLE_LENGTH} characters, got {0})")]
    TitleTooShort(usize),
    /// Title is longer than [`MAX_TITLE_LENGTH`].
    #[error("task title too long (max {MAX_TITLE_LENGTH} characters, got {0})")]
    TitleTooLong(usize),
    /// Description is longer than [`MAX_DESCRIPTION_LENGTH`].
    #[error("task description too long (max {MAX_DESCRIPTION_LENGTH} characters, got {0})")]
    DescriptionTooLong(usize),
}

/// A validated title/description pair, ready to become a task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskDraft {
    title: String,
    description: String,
}

impl TaskDraft {
    /// Trims and validates user input.
    ///
    /// # Errors
    ///
    /// Returns a [`DraftError`] describing the first limit violated.
    pub fn new(title: &str, description: &str) -> Result<Self, DraftError> {
        let title = title.trim();
        let description = description.trim();

        let title_len = title.chars().count();
        if title_len == 0 {
            return Err(DraftError::TitleEmpty);
        }
        if title_len < MIN_TITLE_LENGTH {
            return Err(DraftError::TitleTooShort(title_len));
        }
        if title_len > MAX_TITLE_LENGTH {
            return Err(DraftError::TitleTooLong(title_len));
        }

        let description_len = description.chars().count();
        if description_len > MAX_DESCRIPTION_LENGTH {
            return Err(DraftError::DescriptionTooLong(description_len));
        }

        Ok(Self {
            title: title.to_string(),
            description: description.to_string(),
        })
    }

    /// The trimmed title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// The trimmed description, possibly empty.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }
}
