//! Anti-forgery token extraction. Gradescope renders a fresh token into every page, either as a
//! `<meta>` tag (for AJAX requests) or as a hidden `authenticity_token` field in each form.

use std::fmt;

use scraper::{ElementRef, Html};

use crate::error::{Error, Result};
use crate::util::selectors;

selectors! {
    META = "meta",
    FORM = "form",
    AUTHENTICITY_TOKEN = "input[name=authenticity_token]",
}

pub const CSRF_TOKEN_META: &str = "csrf-token";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenLocator {
    /// `content` of the `<meta>` tag with this `name`.
    Meta(String),
    /// Hidden token field of the form whose `action` is exactly this.
    FormAction(String),
    /// Hidden token field of the first form on the page.
    FirstForm,
}

impl TokenLocator {
    pub fn csrf_meta() -> Self {
        Self::Meta(CSRF_TOKEN_META.to_owned())
    }
}

impl fmt::Display for TokenLocator {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Meta(name) => write!(f, "`{name}` meta tag"),
            Self::FormAction(action) => write!(f, "form with action `{action}`"),
            Self::FirstForm => f.write_str("first form"),
        }
    }
}

pub fn extract_token(html: &str, locator: &TokenLocator) -> Result<String> {
    let document = Html::parse_document(html);

    match locator {
        TokenLocator::Meta(name) => document
            .select(&META)
            .find(|meta| meta.value().attr("name") == Some(name.as_str()))
            .and_then(|meta| meta.value().attr("content"))
            .map(ToOwned::to_owned)
            .ok_or_else(|| Error::NotFound(locator.to_string())),
        TokenLocator::FormAction(action) => {
            let form = document
                .select(&FORM)
                .find(|form| form.value().attr("action") == Some(action.as_str()))
                .ok_or_else(|| Error::NotFound(locator.to_string()))?;
            form_token(form, locator)
        }
        TokenLocator::FirstForm => {
            let form = document
                .select(&FORM)
                .next()
                .ok_or_else(|| Error::NotFound(locator.to_string()))?;
            form_token(form, locator)
        }
    }
}

fn form_token(form: ElementRef, locator: &TokenLocator) -> Result<String> {
    form.select(&AUTHENTICITY_TOKEN)
        .next()
        .and_then(|input| input.value().attr("value"))
        .map(ToOwned::to_owned)
        .ok_or_else(|| Error::NotFound(format!("`authenticity_token` in {locator}")))
}
