use anyhow::Error;
use reqwest::get;

use crate::{Catalog, decode_catalog};

/// Fetches a published catalog, e.g. the raw `effects.json` of the content repo.
pub async fn get_remote_catalog(url: &str) -> Result<Catalog, Error> {
    let response = get(url).await?.error_for_status()?;
    let bytes = response.bytes().await?;

    Catalog::new(decode_catalog(&bytes)?)
}
