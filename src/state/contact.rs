// Contact form draft for the terminal preview.
// Field focus and text editing; validation and sending live in the contact widget.

use crate::widgets::ContactMessage;

/// Form fields in tab order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ContactField {
    #[default]
    Name,
    Email,
    Subject,
    Message,
}

impl ContactField {
    pub const ALL: [ContactField; 4] = [
        ContactField::Name,
        ContactField::Email,
        ContactField::Subject,
        ContactField::Message,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            ContactField::Name => "Name",
            ContactField::Email => "Email",
            ContactField::Subject => "Subject",
            ContactField::Message => "Message",
        }
    }

    pub fn next(&self) -> Self {
        match self {
            ContactField::Name => ContactField::Email,
            ContactField::Email => ContactField::Subject,
            ContactField::Subject => ContactField::Message,
            ContactField::Message => ContactField::Name,
        }
    }

    pub fn prev(&self) -> Self {
        match self {
            ContactField::Name => ContactField::Message,
            ContactField::Email => ContactField::Name,
            ContactField::Subject => ContactField::Email,
            ContactField::Message => ContactField::Subject,
        }
    }
}

/// Text being typed into the contact form.
#[derive(Debug, Clone, Default)]
pub struct ContactDraft {
    pub focus: ContactField,
    values: ContactMessage,
}

impl ContactDraft {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn value(&self, field: ContactField) -> &str {
        match field {
            ContactField::Name => &self.values.name,
            ContactField::Email => &self.values.email,
            ContactField::Subject => &self.values.subject,
            ContactField::Message => &self.values.message,
        }
    }

    fn value_mut(&mut self, field: ContactField) -> &mut String {
        match field {
            ContactField::Name => &mut self.values.name,
            ContactField::Email => &mut self.values.email,
            ContactField::Subject => &mut self.values.subject,
            ContactField::Message => &mut self.values.message,
        }
    }

    pub fn insert(&mut self, c: char) {
        self.value_mut(self.focus).push(c);
    }

    pub fn backspace(&mut self) {
        self.value_mut(self.focus).pop();
    }

    pub fn focus_next(&mut self) {
        self.focus = self.focus.next();
    }

    pub fn focus_prev(&mut self) {
        self.focus = self.focus.prev();
    }

    pub fn message(&self) -> ContactMessage {
        self.values.clone()
    }

    /// Clear every field after a successful send.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_typing_goes_to_focused_field() {
        let mut draft = ContactDraft::new();
        for c in "Ada".chars() {
            draft.insert(c);
        }
        draft.focus_next();
        draft.insert('a');
        draft.insert('x');
        draft.backspace();

        assert_eq!(draft.value(ContactField::Name), "Ada");
        assert_eq!(draft.value(ContactField::Email), "a");
        assert_eq!(draft.message().name, "Ada");
    }

    #[test]
    fn test_focus_wraps() {
        let mut draft = ContactDraft::new();
        draft.focus_prev();
        assert_eq!(draft.focus, ContactField::Message);
        draft.focus_next();
        assert_eq!(draft.focus, ContactField::Name);
    }

    #[test]
    fn test_reset_clears_fields() {
        let mut draft = ContactDraft::new();
        draft.insert('x');
        draft.focus_next();
        draft.reset();
        assert_eq!(draft.value(ContactField::Name), "");
        assert_eq!(draft.focus, ContactField::Name);
    }
}
