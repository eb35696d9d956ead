use std::fmt;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use url::Url;

use crate::assignment::{Assignment, AssignmentClient, AssignmentId};
use crate::client::{Auth, Client};
use crate::date;
use crate::error::{Error, Result};
use crate::props;
use crate::student::Student;
use crate::util::{ASSIGNMENTS_COURSE_PATH, MEMBERSHIPS_COURSE_PATH, course_path, id_from_url};

/// A course on a logged-in session. The roster is fetched on first use and then kept for the life
/// of this value; nothing refreshes it.
#[derive(Debug, Clone)]
pub struct Course {
    gradescope: Client<Auth>,
    id: CourseId,
    roster: OnceLock<Vec<Student>>,
}

impl Course {
    pub fn new(gradescope: Client<Auth>, id: CourseId) -> Self {
        Self {
            gradescope,
            id,
            roster: OnceLock::new(),
        }
    }

    pub fn id(&self) -> &CourseId {
        &self.id
    }

    pub fn gradescope(&self) -> &Client<Auth> {
        &self.gradescope
    }

    pub fn url(&self) -> Result<Url> {
        self.gradescope.url(&course_path(&self.id, ""))
    }

    /// Students on the roster, from the cache when it has been filled.
    ///
    /// An empty roster is not cached. Concurrent first calls may each fetch the page; whichever
    /// finishes first fills the cache and the others return what it holds.
    #[tracing::instrument(skip(self), fields(course = %self.id), err)]
    pub async fn get_roster(&self) -> Result<&[Student]> {
        if let Some(roster) = self.roster.get() {
            debug!(count = roster.len(), "roster from cache");
            return Ok(roster.as_slice());
        }

        let url = self
            .gradescope
            .url(&course_path(&self.id, MEMBERSHIPS_COURSE_PATH))?;
        let page = self.gradescope.get_html(&url, "failed to get roster").await?;
        let students = props::roster::decode(&page)?;
        debug!(count = students.len(), "fetched roster");

        if students.is_empty() {
            return Ok(&[]);
        }
        Ok(self.roster.get_or_init(|| students).as_slice())
    }

    /// Assignments as currently listed on the site; never cached. Due dates that are missing or
    /// unreadable come back as `None`.
    #[tracing::instrument(skip(self), fields(course = %self.id), err)]
    pub async fn get_assignments(&self) -> Result<Vec<Assignment>> {
        let url = self
            .gradescope
            .url(&course_path(&self.id, ASSIGNMENTS_COURSE_PATH))?;
        let page = self
            .gradescope
            .get_html(&url, "failed to get assignments")
            .await?;
        let rows = props::assignments::decode(&page)?;
        debug!(count = rows.len(), "fetched assignments");

        let assignments = rows
            .into_iter()
            .map(|row| {
                let due_date = row.due_date().and_then(|raw| {
                    let due_date = date::parse_site_local(raw).map(date::localize);
                    if due_date.is_none() {
                        warn!(raw, title = row.title(), "ignoring unreadable due date");
                    }
                    due_date
                });
                Assignment::new(
                    self.id.clone(),
                    row.id().clone(),
                    row.title().to_owned(),
                    due_date,
                )
            })
            .collect();

        Ok(assignments)
    }

    /// First roster entry matching `sid` or `email`; for each student `sid` is tried before
    /// `email`. At least one of the two is required.
    pub async fn get_student(
        &self,
        sid: Option<&str>,
        email: Option<&str>,
    ) -> Result<Option<&Student>> {
        if sid.is_none() && email.is_none() {
            return Err(Error::InvalidArgument(
                "looking up a student needs a sid or an email".to_owned(),
            ));
        }

        let roster = self.get_roster().await?;
        let student = roster.iter().find(|student| {
            sid.is_some_and(|sid| student.sid() == Some(sid))
                || email.is_some_and(|email| student.email() == email)
        });

        Ok(student)
    }

    /// Handle for an assignment given by id, or by a URL such as
    /// `https://www.gradescope.com/courses/1/assignments/2`. Nothing is fetched, so the assignment
    /// may not exist.
    pub fn get_assignment(
        &self,
        assignment_id: Option<AssignmentId>,
        assignment_url: Option<&str>,
    ) -> Result<AssignmentClient<'_>> {
        let assignment_id = match (assignment_id, assignment_url) {
            (Some(assignment_id), _) => assignment_id,
            (None, Some(url)) => AssignmentId::new(id_from_url(url, "assignments")?),
            (None, None) => {
                return Err(Error::InvalidArgument(
                    "an assignment needs an id or a URL".to_owned(),
                ));
            }
        };

        Ok(AssignmentClient::new(self, assignment_id))
    }

    pub fn with_assignment(&self, assignment: &Assignment) -> AssignmentClient<'_> {
        AssignmentClient::new(self, assignment.id().clone())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CourseId {
    id: String,
}

impl CourseId {
    pub fn new(id: String) -> Self {
        Self { id }
    }

    pub fn as_str(&self) -> &str {
        &self.id
    }
}

impl fmt::Display for CourseId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.id.fmt(f)
    }
}

impl From<&str> for CourseId {
    fn from(id: &str) -> Self {
        Self::new(id.to_owned())
    }
}
