//! Typed decoders for the state Gradescope embeds in its pages. Each submodule knows the markup of
//! exactly one page, so a change to that page only breaks its decoder.

use itertools::Itertools;
use scraper::{Html, Selector};
use serde::de::DeserializeOwned;

use crate::error::{Error, Result};

pub mod assignments;
pub mod extensions;
pub mod roster;

const REACT_PROPS: &str = "data-react-props";

/// Decodes the props of the one React component on the page matched by `selector`.
fn react_props<T: DeserializeOwned>(
    document: &Html,
    selector: &Selector,
    component: &str,
) -> Result<T> {
    let element = document.select(selector).exactly_one().map_err(|err_it| {
        Error::NotFound(format!(
            "unique `{component}` component (found {})",
            err_it.count()
        ))
    })?;

    let props = element
        .value()
        .attr(REACT_PROPS)
        .ok_or_else(|| Error::NotFound(format!("`{REACT_PROPS}` of `{component}`")))?;

    serde_json::from_str(props).map_err(|source| Error::decode(format!("`{component}` props"), source))
}
