//! Per-student due date overrides, posted as JSON to an assignment's extensions endpoint.

use chrono::{DateTime, TimeDelta, Utc};
use serde_json::{Value, json};
use tracing::info;
use url::Url;

use crate::assignment::AssignmentClient;
use crate::client::{Auth, Client, FormSubmission};
use crate::date;
use crate::error::{Error, Result};
use crate::props;
use crate::student::{RawUserId, UserId};
use crate::token::TokenLocator;

/// New due dates for one student on one assignment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtensionOverride {
    pub user_id: RawUserId,
    pub due_date: DateTime<Utc>,
    pub hard_due_date: Option<DateTime<Utc>>,
}

impl ExtensionOverride {
    pub fn payload(&self) -> Value {
        let mut settings = json!({ "due_date": absolute(&self.due_date) });
        if let Some(hard_due_date) = &self.hard_due_date {
            settings["hard_due_date"] = absolute(hard_due_date);
        }

        json!({
            "override": {
                "user_id": self.user_id,
                "settings": settings,
            }
        })
    }
}

fn absolute(instant: &DateTime<Utc>) -> Value {
    json!({ "type": "absolute", "value": date::format_absolute(instant) })
}

#[tracing::instrument(skip(assignment), fields(course = %assignment.course().id(), assignment = %assignment.id()), err)]
pub(crate) async fn apply_extension(
    assignment: &AssignmentClient<'_>,
    email: &str,
    offset: TimeDelta,
) -> Result<()> {
    let gradescope = assignment.course().gradescope();
    let url = assignment.extensions_url()?;

    let page = gradescope
        .get_html(&url, "could not load assignment")
        .await?;
    let panel = props::extensions::decode(&page)?;

    let user_id = panel
        .user_id(email)
        .ok_or_else(|| Error::NotFound(format!("student email `{email}`")))?
        .clone();
    let due_date = shift(panel.due_date(), offset)?;
    let hard_due_date = panel
        .hard_due_date()
        .map(|hard_due_date| shift(hard_due_date, offset))
        .transpose()?;

    let extension = ExtensionOverride {
        user_id,
        due_date,
        hard_due_date,
    };
    submit_override(gradescope, &url, &extension).await
}

fn shift(raw: &str, offset: TimeDelta) -> Result<DateTime<Utc>> {
    let local = date::parse_site_local(raw).ok_or_else(|| {
        Error::decode(
            "due date",
            format!("`{raw}` is not a timestamp the site renders"),
        )
    })?;
    Ok(date::shift_due_date(local, offset))
}

#[tracing::instrument(skip(assignment), fields(course = %assignment.course().id(), assignment = %assignment.id()), err)]
pub(crate) async fn create_extension(
    assignment: &AssignmentClient<'_>,
    user_id: &UserId,
    due_date: DateTime<Utc>,
    hard_due_date: Option<DateTime<Utc>>,
) -> Result<()> {
    if let Some(hard_due_date) = hard_due_date {
        if hard_due_date < due_date {
            return Err(Error::InvalidArgument(format!(
                "hard due date {hard_due_date} is before due date {due_date}"
            )));
        }
    }

    let url = assignment.extensions_url()?;
    let extension = ExtensionOverride {
        user_id: RawUserId::from(user_id),
        due_date,
        hard_due_date: Some(hard_due_date.unwrap_or(due_date)),
    };
    submit_override(assignment.course().gradescope(), &url, &extension).await
}

async fn submit_override(
    gradescope: &Client<Auth>,
    url: &Url,
    extension: &ExtensionOverride,
) -> Result<()> {
    let csrf_token = gradescope.token(url, &TokenLocator::csrf_meta()).await?;

    let submission = FormSubmission::new(url.clone())
        .with_json(extension.payload())
        .with_csrf_token(csrf_token);
    let response = gradescope.submit_form(submission).await?;

    if !response.ok() {
        return Err(Error::request("creating an extension failed", &response));
    }

    info!(
        user_id = %extension.user_id,
        due_date = %extension.due_date,
        hard_due_date = ?extension.hard_due_date,
        "extension created"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn utc(value: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(value).unwrap().with_timezone(&Utc)
    }

    #[test]
    fn payload_without_hard_due_date() {
        let extension = ExtensionOverride {
            user_id: RawUserId::Number(42),
            due_date: utc("2024-01-03T04:59:00Z"),
            hard_due_date: None,
        };

        assert_eq!(
            extension.payload(),
            json!({
                "override": {
                    "user_id": 42,
                    "settings": {
                        "due_date": {"type": "absolute", "value": "2024-01-03T04:59:00Z"}
                    }
                }
            })
        );
    }

    #[test]
    fn payload_with_hard_due_date() {
        let extension = ExtensionOverride {
            user_id: RawUserId::from(&UserId::from("42")),
            due_date: Utc.with_ymd_and_hms(2024, 1, 3, 4, 59, 0).unwrap(),
            hard_due_date: Some(Utc.with_ymd_and_hms(2024, 1, 5, 4, 59, 0).unwrap()),
        };

        let payload = extension.payload();
        assert_eq!(payload["override"]["user_id"], json!("42"));
        assert_eq!(
            payload["override"]["settings"]["hard_due_date"],
            json!({"type": "absolute", "value": "2024-01-05T04:59:00Z"})
        );
    }

    #[test]
    fn unreadable_due_date_is_a_decode_error() {
        assert!(matches!(
            shift("next tuesday", TimeDelta::days(1)),
            Err(Error::Decode { .. })
        ));
        assert_eq!(
            shift("2024-01-01T23:59:00", TimeDelta::days(1)).unwrap(),
            utc("2024-01-03T04:59:00Z")
        );
    }
}
