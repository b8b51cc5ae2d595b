use super::HookOptions;
use hookup_core::{ImportAttributes, LoadContext, ModuleSource, ResolveContext};
use miette::{IntoDiagnostic, Result};
use serde::Serialize;
use std::io::Write;
use std::path::Path;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct LoadReport<'a> {
    url: &'a str,
    kind: &'a str,
    format: &'a str,
    short_circuit: bool,
    source: Option<String>,
}

/// Run the load command.
///
/// Resolves `specifier` first, then loads the result with the given
/// import-attribute type. `text` and `buffer` loaders are available unless
/// the config file declares its own loaders.
pub fn run(
    cwd: &Path,
    specifier: &str,
    kind: Option<&str>,
    options: HookOptions,
    json: bool,
) -> Result<()> {
    let session = options.into_session(cwd, true)?;
    let resolved = session
        .host
        .resolve(specifier, &ResolveContext::new(session.parent_url.as_str()))
        .into_diagnostic()?;

    let attributes = kind.map(ImportAttributes::with_kind).unwrap_or_default();
    let mut context = LoadContext::new().with_attributes(attributes.clone());
    context.format = resolved.format.clone();

    let output = session
        .host
        .load(&resolved.url, &context)
        .into_diagnostic()?;

    if json {
        let report = LoadReport {
            url: &resolved.url,
            kind: attributes.content_type(),
            format: &output.format,
            short_circuit: output.short_circuit,
            source: output.source.as_ref().map(|s| s.to_text().into_owned()),
        };
        println!("{}", serde_json::to_string_pretty(&report).into_diagnostic()?);
        return Ok(());
    }

    let mut out = std::io::stdout().lock();
    match &output.source {
        Some(ModuleSource::Text(text)) => writeln!(out, "{text}").into_diagnostic()?,
        Some(ModuleSource::Bytes(bytes)) => out.write_all(bytes).into_diagnostic()?,
        None => {}
    }
    Ok(())
}
