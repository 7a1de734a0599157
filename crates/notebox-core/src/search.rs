use std::io::BufRead;

use crate::matcher::Matcher;
use crate::model::{NodeId, SearchHit, SearchResult};

/// Scan a single note body line by line.
///
/// Returns `None` when the body has no match. Lines are 1-based; a line is
/// recorded once no matter how many matches it holds, while every match
/// counts towards `hits_count`.
pub fn search_note<R: BufRead>(
    matcher: &Matcher,
    id: NodeId,
    reader: R,
) -> std::io::Result<Option<SearchResult>> {
    let mut hits = Vec::new();
    let mut hits_count = 0;

    for (index, line) in reader.lines().enumerate() {
        let text = line?;
        if !matcher.is_match(&text) {
            continue;
        }

        hits_count += matcher.count(&text);
        hits.push(SearchHit {
            text,
            line_num: index + 1,
        });
    }

    if hits.is_empty() {
        return Ok(None);
    }

    Ok(Some(SearchResult {
        id,
        hits,
        hits_count,
    }))
}

/// Search in-memory bodies.
///
/// Results follow the iteration order of `bodies`; notes without hits are
/// dropped. Blank queries are expected to be filtered out by the caller.
pub fn search<'a, I>(query: &str, bodies: I) -> crate::Result<Vec<SearchResult>>
where
    I: IntoIterator<Item = (&'a NodeId, &'a str)>,
{
    let matcher = Matcher::build(query)?;
    let mut results = Vec::new();

    for (id, body) in bodies {
        if let Some(result) = search_note(&matcher, id.clone(), body.as_bytes())? {
            results.push(result);
        }
    }

    Ok(results)
}
