//! Task and board forms.
//!
//! Forms hold raw text as typed and only produce a draft on
//! [`TaskForm::submit`] / [`BoardForm::submit`], which is where local
//! validation happens. A submitted form stays open with its in-flight flag
//! set until the caller reports the outcome.

use chrono::NaiveDate;
use taskflow_proto::{Board, BoardDraft, BoardId, Priority, Task, TaskDraft, TaskId, TaskStatus};

use super::ValidationError;

/// Whether the task form creates a new task or edits an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormMode {
    /// Creating a new task.
    Create,
    /// Editing the task with this id.
    Edit(TaskId),
}

/// Field of the task form that has keyboard focus.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TaskField {
    /// Title text.
    #[default]
    Title,
    /// Description text.
    Description,
    /// Status selector.
    Status,
    /// Priority selector.
    Priority,
    /// Due date text.
    DueDate,
    /// Tag entry.
    Tags,
}

impl TaskField {
    const ORDER: [Self; 6] = [
        Self::Title,
        Self::Description,
        Self::Status,
        Self::Priority,
        Self::DueDate,
        Self::Tags,
    ];

    fn position(self) -> usize {
        Self::ORDER.iter().position(|f| *f == self).unwrap_or(0)
    }

    /// Next field, wrapping around.
    #[must_use]
    pub fn next(self) -> Self {
        Self::ORDER[(self.position() + 1) % Self::ORDER.len()]
    }

    /// Previous field, wrapping around.
    #[must_use]
    pub fn prev(self) -> Self {
        Self::ORDER[(self.position() + Self::ORDER.len() - 1) % Self::ORDER.len()]
    }

    /// Display name.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Title => "Title",
            Self::Description => "Description",
            Self::Status => "Status",
            Self::Priority => "Priority",
            Self::DueDate => "Due date",
            Self::Tags => "Tags",
        }
    }
}

/// Create/edit form for a task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskForm {
    /// Create or edit.
    pub mode: FormMode,
    /// Board the task belongs to.
    pub board_id: BoardId,
    /// Title as typed.
    pub title: String,
    /// Description as typed.
    pub description: String,
    /// Selected status.
    pub status: TaskStatus,
    /// Selected priority.
    pub priority: Priority,
    /// Due date as typed, `YYYY-MM-DD` or blank.
    pub due_date: String,
    /// Tags added so far.
    pub tags: Vec<String>,
    /// Pending tag text.
    pub tag_input: String,
    /// Focused field.
    pub focus: TaskField,
    submitting: bool,
}

impl TaskForm {
    /// Empty form for a new task on `board_id`.
    #[must_use]
    pub fn create(board_id: BoardId) -> Self {
        Self {
            mode: FormMode::Create,
            board_id,
            title: String::new(),
            description: String::new(),
            status: TaskStatus::default(),
            priority: Priority::default(),
            due_date: String::new(),
            tags: Vec::new(),
            tag_input: String::new(),
            focus: TaskField::default(),
            submitting: false,
        }
    }

    /// Form pre-filled from a cached task.
    #[must_use]
    pub fn edit(task: &Task) -> Self {
        Self {
            mode: FormMode::Edit(task.id),
            board_id: task.board_id,
            title: task.title.clone(),
            description: task.description.clone().unwrap_or_default(),
            status: task.status,
            priority: task.priority,
            due_date: task
                .due_date
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_default(),
            tags: task.tags.clone(),
            tag_input: String::new(),
            focus: TaskField::default(),
            submitting: false,
        }
    }

    /// Whether a submit is in flight.
    #[must_use]
    pub const fn is_submitting(&self) -> bool {
        self.submitting
    }

    /// Adds a tag. Blank input and duplicates are ignored.
    pub fn add_tag(&mut self, tag: &str) -> bool {
        let tag = tag.trim();
        if tag.is_empty() || self.tags.iter().any(|t| t == tag) {
            return false;
        }
        self.tags.push(tag.to_string());
        true
    }

    /// Moves the pending tag input into the tag list.
    pub fn commit_tag_input(&mut self) -> bool {
        let input = std::mem::take(&mut self.tag_input);
        self.add_tag(&input)
    }

    /// Removes a tag if present.
    pub fn remove_tag(&mut self, tag: &str) -> bool {
        let before = self.tags.len();
        self.tags.retain(|t| t != tag);
        self.tags.len() != before
    }

    /// Types a character into the focused text field, or cycles the
    /// focused selector on space.
    pub fn insert_char(&mut self, c: char) {
        match self.focus {
            TaskField::Title => self.title.push(c),
            TaskField::Description => self.description.push(c),
            TaskField::DueDate => self.due_date.push(c),
            TaskField::Tags => self.tag_input.push(c),
            TaskField::Status => {
                if c == ' ' {
                    self.status = self.status.next();
                }
            }
            TaskField::Priority => {
                if c == ' ' {
                    self.priority = self.priority.next();
                }
            }
        }
    }

    /// Deletes the last character of the focused text field. On an empty
    /// tag input the last tag is removed instead.
    pub fn backspace(&mut self) {
        match self.focus {
            TaskField::Title => {
                self.title.pop();
            }
            TaskField::Description => {
                self.description.pop();
            }
            TaskField::DueDate => {
                self.due_date.pop();
            }
            TaskField::Tags => {
                if self.tag_input.pop().is_none() {
                    self.tags.pop();
                }
            }
            TaskField::Status | TaskField::Priority => {}
        }
    }

    /// Validates the form and produces a draft.
    ///
    /// Returns `Ok(None)` while a previous submit is in flight. On success
    /// the in-flight flag is set until [`Self::submit_failed`] or the form
    /// is closed.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] for a blank or over-long title or an
    /// unparseable due date.
    pub fn submit(&mut self, max_title_len: usize) -> Result<Option<TaskDraft>, ValidationError> {
        if self.submitting {
            return Ok(None);
        }
        let title = self.title.trim();
        if title.is_empty() {
            return Err(ValidationError::EmptyTitle);
        }
        if title.chars().count() > max_title_len {
            return Err(ValidationError::TitleTooLong { max: max_title_len });
        }
        let due_date = parse_form_date(&self.due_date)?;
        let description = self.description.trim();

        let draft = TaskDraft {
            board_id: self.board_id,
            title: title.to_string(),
            description: (!description.is_empty()).then(|| description.to_string()),
            status: Some(self.status),
            priority: Some(self.priority),
            due_date,
            tags: Some(self.tags.clone()),
        };
        self.submitting = true;
        Ok(Some(draft))
    }

    /// Clears the in-flight flag so the user can retry.
    pub const fn submit_failed(&mut self) {
        self.submitting = false;
    }
}

fn parse_form_date(text: &str) -> Result<Option<NaiveDate>, ValidationError> {
    let text = text.trim();
    if text.is_empty() {
        return Ok(None);
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .map(Some)
        .map_err(|_| ValidationError::InvalidDueDate(text.to_string()))
}

/// Field of the board form that has keyboard focus.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BoardField {
    /// Name text.
    #[default]
    Name,
    /// Description text.
    Description,
}

/// Create/rename form for a board.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BoardForm {
    /// Board being edited; `None` when creating.
    pub editing: Option<BoardId>,
    /// Name as typed.
    pub name: String,
    /// Description as typed.
    pub description: String,
    /// Focused field.
    pub focus: BoardField,
    submitting: bool,
}

impl BoardForm {
    /// Empty form.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Form pre-filled from a cached board.
    #[must_use]
    pub fn edit(board: &Board) -> Self {
        Self {
            editing: Some(board.id),
            name: board.name.clone(),
            description: board.description.clone().unwrap_or_default(),
            ..Self::default()
        }
    }

    /// Whether a submit is in flight.
    #[must_use]
    pub const fn is_submitting(&self) -> bool {
        self.submitting
    }

    /// Switches focus between name and description.
    pub const fn toggle_focus(&mut self) {
        self.focus = match self.focus {
            BoardField::Name => BoardField::Description,
            BoardField::Description => BoardField::Name,
        };
    }

    /// Types a character into the focused field.
    pub fn insert_char(&mut self, c: char) {
        match self.focus {
            BoardField::Name => self.name.push(c),
            BoardField::Description => self.description.push(c),
        }
    }

    /// Deletes the last character of the focused field.
    pub fn backspace(&mut self) {
        match self.focus {
            BoardField::Name => self.name.pop(),
            BoardField::Description => self.description.pop(),
        };
    }

    /// Validates the form and produces a draft; `Ok(None)` while in flight.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::EmptyBoardName`] for a blank name.
    pub fn submit(&mut self) -> Result<Option<BoardDraft>, ValidationError> {
        if self.submitting {
            return Ok(None);
        }
        let name = self.name.trim();
        if name.is_empty() {
            return Err(ValidationError::EmptyBoardName);
        }
        let description = self.description.trim();
        let draft = BoardDraft::new(
            name,
            (!description.is_empty()).then(|| description.to_string()),
        );
        self.submitting = true;
        Ok(Some(draft))
    }

    /// Clears the in-flight flag so the user can retry.
    pub const fn submit_failed(&mut self) {
        self.submitting = false;
    }
}
