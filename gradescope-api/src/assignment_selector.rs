use crate::assignment::Assignment;

/// Picks an assignment out of a course's list by id, falling back to its title.
#[derive(Debug, Clone)]
pub struct AssignmentSelector {
    selector: String,
}

impl AssignmentSelector {
    pub fn new(selector: String) -> Self {
        Self { selector }
    }

    pub fn select_from<'a>(&self, assignments: &'a [Assignment]) -> Option<&'a Assignment> {
        self.select_as_id(assignments)
            .or_else(|| self.select_as_title(assignments))
    }

    fn select_as_id<'a>(&self, assignments: &'a [Assignment]) -> Option<&'a Assignment> {
        assignments
            .iter()
            .find(|assignment| assignment.id().as_str() == self.selector)
    }

    fn select_as_title<'a>(&self, assignments: &'a [Assignment]) -> Option<&'a Assignment> {
        assignments
            .iter()
            .find(|assignment| assignment.title() == self.selector)
    }
}
