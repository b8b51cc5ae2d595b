use super::HookOptions;
use hookup_core::specifier::file_url_to_path;
use hookup_core::ResolveContext;
use miette::{IntoDiagnostic, Result};
use serde::Serialize;
use std::path::Path;

#[derive(Debug, Serialize)]
struct ResolveReport<'a> {
    specifier: &'a str,
    parent: &'a str,
    require: bool,
    url: &'a str,
    format: Option<&'a str>,
    path: Option<String>,
}

/// Run the resolve command.
///
/// Prints the resolved URL, or one JSON object with `--json`.
pub fn run(
    cwd: &Path,
    specifier: &str,
    options: HookOptions,
    require: bool,
    json: bool,
) -> Result<()> {
    let session = options.into_session(cwd, false)?;
    let context = if require {
        ResolveContext::require(session.parent_url.as_str())
    } else {
        ResolveContext::new(session.parent_url.as_str())
    };

    let output = session
        .host
        .resolve(specifier, &context)
        .into_diagnostic()?;
    tracing::debug!(specifier, url = %output.url, "resolved");

    if json {
        let report = ResolveReport {
            specifier,
            parent: &session.parent_url,
            require,
            url: &output.url,
            format: output.format.as_deref(),
            path: file_url_to_path(&output.url).map(|p| p.display().to_string()),
        };
        println!("{}", serde_json::to_string_pretty(&report).into_diagnostic()?);
    } else {
        println!("{}", output.url);
    }

    Ok(())
}
