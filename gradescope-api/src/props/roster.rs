//! Course memberships page. There is no single props blob here: each roster row carries its own
//! JSON in the edit button's `data-cm` attribute.

use scraper::{ElementRef, Html};
use serde::Deserialize;
use serde_with::serde_as;

use crate::error::{Error, Result};
use crate::student::{StringFromNumber, Student, UserId};
use crate::util::{selectors, text};

selectors! {
    ROSTER_ROW = "tr.rosterRow",
    ROSTER_NAME = "button.js-rosterName",
    SELECTED_ROLE = "option[selected]",
    EDIT_BUTTON = "button.rosterCell--editIcon",
}

const STUDENT_ROLE: &str = "Student";
const USER_ID_PARAM: &str = "?user_id=";

#[serde_as]
#[derive(Debug, Deserialize)]
struct EditableMetadata {
    full_name: Option<String>,
    first_name: Option<String>,
    last_name: Option<String>,
    #[serde_as(as = "Option<StringFromNumber>")]
    sid: Option<String>,
}

/// Students on the roster, in page order. Instructors, TAs, readers, and rows the current user
/// cannot edit are left out.
pub fn decode(html: &str) -> Result<Vec<Student>> {
    let document = Html::parse_document(html);

    let mut rows = document.select(&ROSTER_ROW).peekable();
    if rows.peek().is_none() {
        return Err(Error::NotFound("roster rows".to_owned()));
    }

    rows.filter_map(|row| parse_row(row).transpose()).collect()
}

fn parse_row(row: ElementRef) -> Result<Option<Student>> {
    let role = row.select(&SELECTED_ROLE).next().map(text);
    if role.as_deref().map(str::trim) != Some(STUDENT_ROLE) {
        return Ok(None);
    }

    let (Some(name_button), Some(edit_button)) = (
        row.select(&ROSTER_NAME).next(),
        row.select(&EDIT_BUTTON).next(),
    ) else {
        return Ok(None);
    };

    let user_id = name_button
        .value()
        .attr("data-url")
        .and_then(|url| url.split_once(USER_ID_PARAM))
        .and_then(|(_, params)| params.split('&').next())
        .filter(|id| !id.is_empty())
        .ok_or_else(|| Error::NotFound("user id of roster row".to_owned()))?;

    let email = edit_button
        .value()
        .attr("data-email")
        .ok_or_else(|| Error::NotFound(format!("email of roster user {user_id}")))?;

    let metadata = edit_button
        .value()
        .attr("data-cm")
        .ok_or_else(|| Error::NotFound(format!("metadata of roster user {user_id}")))?;
    let metadata: EditableMetadata = serde_json::from_str(metadata)
        .map_err(|source| Error::decode(format!("metadata of roster user {user_id}"), source))?;

    Ok(Some(Student::new(
        UserId::new(user_id.to_owned()),
        metadata.full_name,
        metadata.first_name,
        metadata.last_name,
        metadata.sid,
        email.to_owned(),
    )))
}
