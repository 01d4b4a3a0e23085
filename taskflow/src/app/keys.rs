//! Keyboard bindings.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use super::{App, Focus, Modal};
use crate::sync::SyncCommand;
use crate::tasks::TaskField;

impl App {
    /// Handles a key press. Returns a command when the key triggered a
    /// remote operation.
    pub fn handle_key_event(&mut self, key: KeyEvent) -> Option<SyncCommand> {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.should_quit = true;
            return None;
        }

        match self.modal {
            Some(Modal::Task(_)) => return self.handle_task_form_key(key),
            Some(Modal::Board(_)) => return self.handle_board_form_key(key),
            Some(Modal::Search) => {
                self.handle_search_key(key);
                return None;
            }
            None => {}
        }

        // Global shortcuts
        match key.code {
            KeyCode::Char('q') => {
                self.should_quit = true;
                return None;
            }
            KeyCode::Tab | KeyCode::BackTab => {
                self.focus = match self.focus {
                    Focus::Sidebar => Focus::Columns,
                    Focus::Columns => Focus::Sidebar,
                };
                return None;
            }
            KeyCode::Esc => {
                if self.drag.is_dragging() {
                    self.drag.cancel();
                } else if !self.store.filter().search.is_empty() {
                    self.set_search(String::new());
                }
                return None;
            }
            KeyCode::Char('/') => {
                self.modal = Some(Modal::Search);
                return None;
            }
            KeyCode::Char('p') => {
                self.cycle_priority_filter();
                return None;
            }
            KeyCode::Char('s') => {
                self.cycle_sort_key();
                return None;
            }
            KeyCode::Char('o') => {
                self.toggle_sort_direction();
                return None;
            }
            KeyCode::Char('t') => {
                self.toggle_theme();
                return None;
            }
            KeyCode::Char('r') => return Some(self.load_boards()),
            KeyCode::Char('b') => {
                self.open_board_form();
                return None;
            }
            KeyCode::Char('B') => {
                self.open_board_edit_form();
                return None;
            }
            KeyCode::Char('D') => return self.delete_selected_board(),
            KeyCode::Char('n') => {
                self.open_task_form();
                return None;
            }
            _ => {}
        }

        match self.focus {
            Focus::Sidebar => self.handle_sidebar_key(key),
            Focus::Columns => self.handle_columns_key(key),
        }
    }

    fn handle_sidebar_key(&mut self, key: KeyEvent) -> Option<SyncCommand> {
        let len = self.store.boards().items.len();
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => {
                self.sidebar_cursor = self.sidebar_cursor.saturating_sub(1);
                None
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.sidebar_cursor = (self.sidebar_cursor + 1).min(len.saturating_sub(1));
                None
            }
            KeyCode::Enter => {
                let id = self.store.boards().items.get(self.sidebar_cursor)?.id;
                let command = self.select_board(id);
                self.focus = Focus::Columns;
                command
            }
            _ => None,
        }
    }

    fn handle_columns_key(&mut self, key: KeyEvent) -> Option<SyncCommand> {
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => self.move_row(false),
            KeyCode::Down | KeyCode::Char('j') => self.move_row(true),
            KeyCode::Left | KeyCode::Char('h') => self.move_column(false),
            KeyCode::Right | KeyCode::Char('l') => self.move_column(true),
            KeyCode::Char(' ') => {
                if self.drag.is_dragging() {
                    return self.drop_task();
                }
                if self.begin_drag_focused() {
                    self.drag_over(self.column);
                }
            }
            KeyCode::Char('e') | KeyCode::Enter => self.open_edit_form(),
            KeyCode::Char('x') => return self.delete_focused_task(),
            _ => {}
        }
        None
    }

    fn handle_task_form_key(&mut self, key: KeyEvent) -> Option<SyncCommand> {
        let Some(Modal::Task(form)) = &mut self.modal else {
            return None;
        };
        match key.code {
            KeyCode::Esc => self.modal = None,
            KeyCode::Tab => form.focus = form.focus.next(),
            KeyCode::BackTab => form.focus = form.focus.prev(),
            KeyCode::Enter if form.focus == TaskField::Tags && !form.tag_input.trim().is_empty() => {
                form.commit_tag_input();
            }
            KeyCode::Enter => return self.submit_task_form(),
            KeyCode::Backspace => form.backspace(),
            KeyCode::Char(c) => form.insert_char(c),
            _ => {}
        }
        None
    }

    fn handle_board_form_key(&mut self, key: KeyEvent) -> Option<SyncCommand> {
        let Some(Modal::Board(form)) = &mut self.modal else {
            return None;
        };
        match key.code {
            KeyCode::Esc => self.modal = None,
            KeyCode::Tab | KeyCode::BackTab => form.toggle_focus(),
            KeyCode::Enter => return self.submit_board_form(),
            KeyCode::Backspace => form.backspace(),
            KeyCode::Char(c) => form.insert_char(c),
            _ => {}
        }
        None
    }

    fn handle_search_key(&mut self, key: KeyEvent) {
        let mut term = self.store.filter().search.clone();
        match key.code {
            KeyCode::Esc => {
                self.modal = None;
                term.clear();
            }
            KeyCode::Enter => {
                self.modal = None;
                return;
            }
            KeyCode::Backspace => {
                term.pop();
            }
            KeyCode::Char(c) => term.push(c),
            _ => return,
        }
        self.set_search(term);
    }
}
