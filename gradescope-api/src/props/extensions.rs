//! Assignment extensions page, rendered by the `AddExtension` component. Its props hold the students
//! who can be given an extension and the assignment's live due dates.

use scraper::Html;
use serde::Deserialize;

use crate::error::Result;
use crate::student::RawUserId;
use crate::util::selectors;

selectors! {
    ADD_EXTENSION = "[data-react-class=AddExtension]",
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExtensionPanel {
    #[serde(default)]
    students: Vec<ExtensionStudent>,
    assignment: PanelAssignment,
}

#[derive(Debug, Clone, Deserialize)]
struct ExtensionStudent {
    #[serde(default)]
    email: Option<String>,
    id: RawUserId,
}

#[derive(Debug, Clone, Deserialize)]
struct PanelAssignment {
    due_date: String,
    #[serde(default)]
    hard_due_date: Option<String>,
}

impl ExtensionPanel {
    pub fn user_id(&self, email: &str) -> Option<&RawUserId> {
        self.students
            .iter()
            .find(|student| student.email.as_deref() == Some(email))
            .map(|student| &student.id)
    }

    pub fn due_date(&self) -> &str {
        &self.assignment.due_date
    }

    pub fn hard_due_date(&self) -> Option<&str> {
        self.assignment
            .hard_due_date
            .as_deref()
            .filter(|date| !date.is_empty())
    }
}

pub fn decode(html: &str) -> Result<ExtensionPanel> {
    let document = Html::parse_document(html);
    super::react_props(&document, &ADD_EXTENSION, "AddExtension")
}
