use scraper::ElementRef;
use url::Url;

use crate::assignment::AssignmentId;
use crate::course::CourseId;
use crate::error::{Error, Result};

pub const BASE_URL: &str = "https://www.gradescope.com";
pub const LOGIN_PATH: &str = "/login";
pub const MEMBERSHIPS_COURSE_PATH: &str = "/memberships";
pub const ASSIGNMENTS_COURSE_PATH: &str = "/assignments";
pub const EXTENSIONS_ASSIGNMENT_PATH: &str = "/extensions";

macro_rules! selectors {
    ($name:ident = $x:expr $(,)?) => {
        lazy_static::lazy_static! { static ref $name: scraper::Selector = scraper::Selector::parse($x).unwrap(); }
    };

    ($name:ident = $x:expr, $($names:ident = $xs:expr),+ $(,)?) => {
        selectors! { $name = $x }
        selectors! {
            $($names = $xs),+
        }
    };
}
pub(crate) use selectors;

pub fn gs_url(base_url: &Url, path: &str) -> Result<Url> {
    base_url.join(path).map_err(|source| Error::InvalidUrl {
        url: format!("{base_url}{path}"),
        source,
    })
}

pub fn course_path(course_id: &CourseId, path: &str) -> String {
    format!("/courses/{course_id}{path}")
}

pub fn assignment_path(course_id: &CourseId, assignment_id: &AssignmentId, path: &str) -> String {
    course_path(course_id, &format!("/assignments/{assignment_id}{path}"))
}

pub fn text(el: ElementRef) -> String {
    el.text().flat_map(|text| text.chars()).collect()
}

/// Pulls the id following the `kind` segment out of a Gradescope URL, e.g. `735697` from
/// `https://www.gradescope.com/courses/735697/` with kind `courses`.
pub fn id_from_url(url: &str, kind: &str) -> Result<String> {
    let parsed = Url::parse(url).map_err(|source| Error::InvalidUrl {
        url: url.to_owned(),
        source,
    })?;

    parsed
        .path_segments()
        .and_then(|mut segments| {
            segments.find(|segment| *segment == kind)?;
            segments.next()
        })
        .filter(|id| !id.is_empty())
        .map(ToOwned::to_owned)
        .ok_or_else(|| Error::InvalidArgument(format!("`{url}` has no `{kind}` id")))
}
