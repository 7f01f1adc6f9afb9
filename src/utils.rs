use reqwest::header::{HeaderMap, LINK};
use url::{ParseError, Url};

use crate::error::AuditError;

// Finds the target of the first `rel="next"` entry across all Link header values.
// A missing, empty or non-UTF-8 header simply means there is no next page.
pub fn next_link(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(LINK)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .find_map(|value| find_rel(value, "next"))
}

// Parses `<url>; rel="a b", <url>; rel=c` and returns the first url carrying `rel`.
pub fn find_rel(header: &str, rel: &str) -> Option<String> {
    let mut rest = header;

    loop {
        let start = rest.find('<')?;
        let end = start + rest[start..].find('>')?;
        let target = rest[start + 1..end].trim();

        // Parameters run until the next comma outside quotes.
        let params_and_tail = &rest[end + 1..];
        let params_end = unquoted_find(params_and_tail, ',').unwrap_or(params_and_tail.len());
        let params = &params_and_tail[..params_end];

        if has_rel(params, rel) {
            return Some(target.to_string());
        }

        if params_end == params_and_tail.len() {
            return None;
        }
        rest = &params_and_tail[params_end + 1..];
    }
}

fn unquoted_find(s: &str, sep: char) -> Option<usize> {
    let mut quoted = false;
    for (i, c) in s.char_indices() {
        match c {
            '"' => quoted = !quoted,
            c if c == sep && !quoted => return Some(i),
            _ => {}
        }
    }
    None
}

// Splits on `sep` outside quoted strings.
fn unquoted_split(mut s: &str, sep: char) -> Vec<&str> {
    let mut parts = Vec::new();
    while let Some(i) = unquoted_find(s, sep) {
        parts.push(&s[..i]);
        s = &s[i + sep.len_utf8()..];
    }
    parts.push(s);
    parts
}

fn has_rel(params: &str, rel: &str) -> bool {
    unquoted_split(params, ';')
        .into_iter()
        .filter_map(|param| param.split_once('='))
        .filter(|(key, _)| key.trim().eq_ignore_ascii_case("rel"))
        .any(|(_, value)| {
            value
                .trim()
                .trim_matches('"')
                .split_whitespace()
                .any(|r| r.eq_ignore_ascii_case(rel))
        })
}

// Appends each segment to `base`, percent-encoding anything that would
// otherwise change the path, query or fragment.
pub fn url_with_segments<'a, I>(base: &str, segments: I) -> Result<Url, AuditError>
where
    I: IntoIterator<Item = &'a str>,
{
    let invalid = |source| AuditError::InvalidUrl {
        url: base.to_string(),
        source,
    };
    let mut url = Url::parse(base).map_err(invalid)?;
    url.path_segments_mut()
        .map_err(|_| invalid(ParseError::RelativeUrlWithCannotBeABaseBase))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}
