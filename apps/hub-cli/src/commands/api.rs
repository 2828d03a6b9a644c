//! Guarded backend calls.

use super::{api_failure, open_session};
use crate::output::{self, OutputFormat};
use anyhow::Result;
use hub_config::{Config, Paths};

/// GET `path` and print the JSON body.
pub async fn get(
    paths: &Paths,
    config: &Config,
    path: &str,
    query: &[(String, String)],
    format: &OutputFormat,
) -> Result<()> {
    let session = open_session(paths, config, *format)?;
    let query: Vec<(&str, &str)> = query
        .iter()
        .map(|(k, v)| (k.as_str(), v.as_str()))
        .collect();

    let body: serde_json::Value = session
        .client
        .get_json(path, &query)
        .await
        .map_err(api_failure)?;

    match format {
        OutputFormat::Text => println!("{}", serde_json::to_string_pretty(&body)?),
        OutputFormat::Json => output::print(&body, format),
    }
    Ok(())
}
