/// Cursor over the sidebar chat list. The list itself lives in the controller
/// state; the picker only tracks which row is highlighted.
#[derive(Debug, Clone, Default)]
pub struct ChatPicker {
    pub selected: usize,
}

impl ChatPicker {
    pub fn move_up(&mut self, len: usize) {
        if len > 0 {
            if self.selected == 0 {
                self.selected = len - 1;
            } else {
                self.selected -= 1;
            }
        }
    }

    pub fn move_down(&mut self, len: usize) {
        if len > 0 {
            self.selected = (self.selected + 1) % len;
        }
    }

    /// Keep the cursor inside a list that may have shrunk or grown.
    pub fn clamp(&mut self, len: usize) {
        self.selected = self.selected.min(len.saturating_sub(1));
    }

    /// Point the cursor at `index`, e.g. the chat that just became current.
    pub fn select(&mut self, index: usize) {
        self.selected = index;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn movement_wraps_around() {
        let mut picker = ChatPicker::default();
        picker.move_up(3);
        assert_eq!(picker.selected, 2);
        picker.move_down(3);
        assert_eq!(picker.selected, 0);
    }

    #[test]
    fn empty_lists_leave_cursor_alone() {
        let mut picker = ChatPicker::default();
        picker.move_down(0);
        picker.move_up(0);
        assert_eq!(picker.selected, 0);
    }

    #[test]
    fn clamp_follows_shrinking_lists() {
        let mut picker = ChatPicker { selected: 5 };
        picker.clamp(2);
        assert_eq!(picker.selected, 1);
        picker.clamp(0);
        assert_eq!(picker.selected, 0);
    }
}
