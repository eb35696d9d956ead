use std::fmt;

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use serde_with::serde_conv;
use url::Url;

use crate::course::{Course, CourseId};
use crate::error::Result;
use crate::extension;
use crate::student::UserId;
use crate::util::{EXTENSIONS_ASSIGNMENT_PATH, assignment_path};

/// An assignment as listed on a course's assignments page. Two assignments are equal when their
/// ids are, whatever their titles or due dates.
#[derive(Debug, Clone, Serialize)]
pub struct Assignment {
    course_id: CourseId,
    id: AssignmentId,
    title: String,
    due_date: Option<DateTime<Utc>>,
}

impl Assignment {
    pub fn new(
        course_id: CourseId,
        id: AssignmentId,
        title: String,
        due_date: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            course_id,
            id,
            title,
            due_date,
        }
    }

    pub fn course_id(&self) -> &CourseId {
        &self.course_id
    }

    pub fn id(&self) -> &AssignmentId {
        &self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn due_date(&self) -> Option<DateTime<Utc>> {
        self.due_date
    }
}

impl PartialEq for Assignment {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Assignment {}

/// Handle to an assignment of a course. Building one checks nothing; the first request made through
/// it finds out whether the assignment exists.
#[derive(Debug, Clone)]
pub struct AssignmentClient<'a> {
    course: &'a Course,
    id: AssignmentId,
}

impl<'a> AssignmentClient<'a> {
    pub fn new(course: &'a Course, id: AssignmentId) -> Self {
        Self { course, id }
    }

    pub fn course(&self) -> &'a Course {
        self.course
    }

    pub fn id(&self) -> &AssignmentId {
        &self.id
    }

    pub fn url(&self) -> Result<Url> {
        self.path_url("")
    }

    pub(crate) fn extensions_url(&self) -> Result<Url> {
        self.path_url(EXTENSIONS_ASSIGNMENT_PATH)
    }

    fn path_url(&self, path: &str) -> Result<Url> {
        self.course
            .gradescope()
            .url(&assignment_path(self.course.id(), &self.id, path))
    }

    /// Pushes the due date of the student with `email` back by `offset`, starting from the
    /// assignment's due date as the site shows it right now. The hard due date moves by the same
    /// amount if the assignment has one.
    ///
    /// Not idempotent: calling this twice extends twice.
    pub async fn apply_extension(&self, email: &str, offset: TimeDelta) -> Result<()> {
        extension::apply_extension(self, email, offset).await
    }

    /// Sets an absolute due date for one student. Without `hard_due_date` the hard due date is set
    /// to `due_date`.
    #[deprecated(note = "use `apply_extension`, which offsets the assignment's live due date")]
    pub async fn create_extension(
        &self,
        user_id: &UserId,
        due_date: DateTime<Utc>,
        hard_due_date: Option<DateTime<Utc>>,
    ) -> Result<()> {
        extension::create_extension(self, user_id, due_date, hard_due_date).await
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssignmentId {
    id: String,
}

impl AssignmentId {
    pub fn new(id: String) -> Self {
        Self { id }
    }

    /// Id from the composite ids of the assignments table (`assignment_4191897`): everything after
    /// the last underscore, or nothing if there is no underscore.
    pub fn from_composite(composite: &str) -> Self {
        let id = composite
            .rsplit_once('_')
            .map(|(_, id)| id)
            .unwrap_or_default();
        Self::new(id.to_owned())
    }

    pub fn as_str(&self) -> &str {
        &self.id
    }
}

impl fmt::Display for AssignmentId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.id.fmt(f)
    }
}

impl From<&str> for AssignmentId {
    fn from(id: &str) -> Self {
        Self::new(id.to_owned())
    }
}

serde_conv! {
    pub(crate) AssignmentIdAfterUnderscore,
    AssignmentId,
    |assignment_id: &AssignmentId| format!("assignment_{}", assignment_id.id),
    |value: String| -> Result<_, std::convert::Infallible> {
        Ok(AssignmentId::from_composite(&value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn composite_ids() {
        assert_eq!(AssignmentId::from_composite("Assignment_4191897").as_str(), "4191897");
        assert_eq!(AssignmentId::from_composite("a_b_c").as_str(), "c");
        assert_eq!(AssignmentId::from_composite("4191897").as_str(), "");
        assert_eq!(AssignmentId::from_composite("trailing_").as_str(), "");
    }

    #[test]
    fn equality_is_by_id() {
        let course_id = CourseId::from("1");
        let fresh = Assignment::new(course_id.clone(), "7".into(), "Homework 1".to_owned(), None);
        let stale = Assignment::new(
            course_id.clone(),
            "7".into(),
            "HW1 (old title)".to_owned(),
            Some(Utc::now()),
        );
        let other = Assignment::new(course_id, "8".into(), "Homework 1".to_owned(), None);

        assert_eq!(fresh, stale);
        assert_ne!(fresh, other);
    }
}
