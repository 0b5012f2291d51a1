//! Single-line editor for the pattern and "Examine:" prompts.

use crate::input::keys::EditOp;

/// What an edit did to the buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditStatus {
    Edited,
    /// Backspace ran past the start of the body; the prompt is abandoned.
    Cancelled,
}

/// A prompt plus an editable body with an explicit cursor. The prompt is
/// immutable; every operation is bounded to the body.
#[derive(Debug)]
pub struct LineEditor {
    prompt: String,
    chars: Vec<char>,
    cursor: usize,
}

impl LineEditor {
    pub fn new(prompt: &str) -> Self {
        Self {
            prompt: prompt.to_string(),
            chars: Vec::new(),
            cursor: 0,
        }
    }

    pub fn body(&self) -> String {
        self.chars.iter().collect()
    }

    /// Prompt and body as shown in the status row.
    pub fn display(&self) -> String {
        format!("{}{}", self.prompt, self.body())
    }

    /// Cursor position in the status row, prompt included.
    pub fn cursor_column(&self) -> usize {
        self.prompt.chars().count() + self.cursor
    }

    /// Replace the body (history recall), cursor to the end.
    pub fn set_body(&mut self, body: &str) {
        self.chars = body.chars().collect();
        self.cursor = self.chars.len();
    }

    pub fn apply(&mut self, op: EditOp) -> EditStatus {
        match op {
            EditOp::Insert(c) => {
                self.chars.insert(self.cursor, c);
                self.cursor += 1;
            }
            EditOp::Backspace => {
                if self.cursor == 0 {
                    return EditStatus::Cancelled;
                }
                self.cursor -= 1;
                self.chars.remove(self.cursor);
            }
            EditOp::Delete => {
                if self.cursor < self.chars.len() {
                    self.chars.remove(self.cursor);
                }
            }
            EditOp::DeleteWord => self.delete_word(),
            EditOp::DeleteLine => {
                self.chars.clear();
                self.cursor = 0;
            }
            EditOp::Left => self.cursor = self.cursor.saturating_sub(1),
            EditOp::Right => self.cursor = (self.cursor + 1).min(self.chars.len()),
            EditOp::Home => self.cursor = 0,
            EditOp::End => self.cursor = self.chars.len(),
            EditOp::NextWord => self.cursor = self.next_word(),
            EditOp::PrevWord => self.cursor = self.prev_word(),
            // Resolved by the interpreter before reaching the editor.
            EditOp::Accept | EditOp::Cancel | EditOp::HistoryUp | EditOp::HistoryDown => {}
        }
        EditStatus::Edited
    }

    fn next_word(&self) -> usize {
        for i in self.cursor..self.chars.len() {
            if self.chars[i] == ' ' {
                return i + 1;
            }
        }
        self.chars.len()
    }

    fn prev_word(&self) -> usize {
        let mut i = self.cursor.saturating_sub(2);
        while i > 0 {
            if self.chars[i] == ' ' {
                return i + 1;
            }
            i -= 1;
        }
        0
    }

    /// Delete the word under the cursor: forward to the next space, then
    /// backward through the preceding run and its separating space.
    fn delete_word(&mut self) {
        while self.cursor < self.chars.len() && self.chars[self.cursor] != ' ' {
            self.chars.remove(self.cursor);
        }
        while self.cursor > 0 {
            self.cursor -= 1;
            let was_space = self.chars[self.cursor] == ' ';
            self.chars.remove(self.cursor);
            if was_space {
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn editor_with(body: &str) -> LineEditor {
        let mut ed = LineEditor::new("/");
        ed.set_body(body);
        ed
    }

    #[test]
    fn insert_and_cursor_motion() {
        let mut ed = LineEditor::new("/");
        for c in "foo".chars() {
            ed.apply(EditOp::Insert(c));
        }
        assert_eq!(ed.display(), "/foo");
        assert_eq!(ed.cursor_column(), 4);

        ed.apply(EditOp::Left);
        ed.apply(EditOp::Insert('X'));
        assert_eq!(ed.body(), "foXo");

        ed.apply(EditOp::Home);
        assert_eq!(ed.cursor_column(), 1);
        ed.apply(EditOp::End);
        assert_eq!(ed.cursor_column(), 5);
    }

    #[test]
    fn backspace_past_the_start_cancels() {
        let mut ed = editor_with("a");
        assert_eq!(ed.apply(EditOp::Backspace), EditStatus::Edited);
        assert_eq!(ed.apply(EditOp::Backspace), EditStatus::Cancelled);
    }

    #[test]
    fn delete_is_bounded_by_the_end() {
        let mut ed = editor_with("ab");
        ed.apply(EditOp::Home);
        ed.apply(EditOp::Delete);
        assert_eq!(ed.body(), "b");
        ed.apply(EditOp::End);
        ed.apply(EditOp::Delete);
        assert_eq!(ed.body(), "b");
    }

    #[test]
    fn word_motion_lands_after_spaces() {
        let mut ed = editor_with("one two three");
        ed.apply(EditOp::Home);
        ed.apply(EditOp::NextWord);
        assert_eq!(ed.cursor_column(), 5);
        ed.apply(EditOp::NextWord);
        assert_eq!(ed.cursor_column(), 9);

        ed.apply(EditOp::PrevWord);
        assert_eq!(ed.cursor_column(), 5);
        ed.apply(EditOp::PrevWord);
        assert_eq!(ed.cursor_column(), 1);
    }

    #[test]
    fn delete_word_removes_the_word_and_its_separator() {
        let mut ed = editor_with("one two three");
        // Cursor inside "two".
        ed.apply(EditOp::Home);
        ed.apply(EditOp::NextWord);
        ed.apply(EditOp::Right);
        ed.apply(EditOp::DeleteWord);
        assert_eq!(ed.body(), "one three");
    }

    #[test]
    fn delete_line_clears_only_the_body() {
        let mut ed = editor_with("pattern");
        ed.apply(EditOp::DeleteLine);
        assert_eq!(ed.display(), "/");
        assert_eq!(ed.cursor_column(), 1);
    }

    #[test]
    fn set_body_moves_the_cursor_to_the_end() {
        let mut ed = LineEditor::new("&");
        ed.set_body("recalled");
        assert_eq!(ed.display(), "&recalled");
        assert_eq!(ed.cursor_column(), 9);
    }
}
