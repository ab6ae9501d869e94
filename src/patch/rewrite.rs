use regex::Regex;

/// Result of rewriting a lockfile's text.
///
/// - `text`: the full rewritten text (identical to the input when nothing matched).
/// - `previous`: the version value that was replaced, or `None` if the package
///   block was not found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rewrite {
    pub text: String,
    pub previous: Option<String>,
}

/// Build the pattern locating `package`'s version field.
///
/// The pattern matches a `name = "<package>"` line, a single separator
/// character (or a CRLF pair), then `version = "<value>"`. Group 1 is everything
/// up to and including `version = `; group 2 is the quoted value.
///
/// `.` never crosses a newline, so the value stays on the version line.
pub fn version_pattern(package: &str) -> Result<Regex, regex::Error> {
    Regex::new(&format!(
        r#"(name = "{}"(?:\r\n|[\s\S])version = )"(.*)""#,
        regex::escape(package)
    ))
}

/// Replace the version value of the first `package` block with `tag`.
///
/// Everything outside the quoted value is copied through unchanged, and `tag`
/// is inserted literally (no `$` expansion). When the block is missing the
/// text comes back untouched and [`Rewrite::previous`] is `None`.
///
/// # Errors
/// Returns an error only if the pattern cannot be compiled.
pub fn rewrite_version(text: &str, package: &str, tag: &str) -> Result<Rewrite, regex::Error> {
    let re = version_pattern(package)?;
    let Some(caps) = re.captures(text) else {
        return Ok(Rewrite {
            text: text.to_string(),
            previous: None,
        });
    };
    // Groups 1 and 2 are not optional, so a match always carries them.
    let whole = caps.get_match();

    let mut out = String::with_capacity(text.len() + tag.len());
    out.push_str(&text[..whole.start()]);
    out.push_str(&caps[1]);
    out.push('"');
    out.push_str(tag);
    out.push('"');
    out.push_str(&text[whole.end()..]);

    Ok(Rewrite {
        text: out,
        previous: Some(caps[2].to_string()),
    })
}

/// Read the version value of the first `package` block, if any.
pub fn current_version(text: &str, package: &str) -> Result<Option<String>, regex::Error> {
    let re = version_pattern(package)?;
    Ok(re
        .captures(text)
        .and_then(|c| c.get(2))
        .map(|m| m.as_str().to_string()))
}
