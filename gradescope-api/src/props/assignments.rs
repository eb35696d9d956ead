//! Course assignments page, rendered by the `AssignmentsTable` component.

use scraper::Html;
use serde::Deserialize;
use serde_json::Value;
use serde_with::serde_as;

use crate::assignment::{AssignmentId, AssignmentIdAfterUnderscore};
use crate::error::Result;
use crate::util::selectors;

selectors! {
    ASSIGNMENTS_TABLE = "[data-react-class=AssignmentsTable]",
}

#[derive(Debug, Clone, Deserialize)]
struct AssignmentsTableProps {
    #[serde(rename = "table_data", default)]
    assignments: Vec<AssignmentRow>,
}

#[serde_as]
#[derive(Debug, Clone, Deserialize)]
pub struct AssignmentRow {
    #[serde_as(as = "AssignmentIdAfterUnderscore")]
    #[serde(default)]
    id: AssignmentId,
    title: String,
    #[serde(default)]
    submission_window: Option<Value>,
}

impl AssignmentRow {
    pub fn id(&self) -> &AssignmentId {
        &self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// Raw site-local due date, if the row has one and it is a string.
    pub fn due_date(&self) -> Option<&str> {
        self.submission_window
            .as_ref()?
            .get("due_date")?
            .as_str()
    }
}

pub fn decode(html: &str) -> Result<Vec<AssignmentRow>> {
    let document = Html::parse_document(html);
    let props: AssignmentsTableProps =
        super::react_props(&document, &ASSIGNMENTS_TABLE, "AssignmentsTable")?;
    Ok(props.assignments)
}
