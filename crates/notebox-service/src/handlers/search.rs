use std::sync::Arc;

use tokio::sync::Semaphore;

use notebox_core::search::search_note;
use notebox_core::utils::is_blank_query;
use notebox_core::{Error, Matcher, Result};

use super::{join_error, with_engine};
use crate::protocol::Response;
use crate::state::GlobalState;

/// Handle "search": scan every live body, a bounded number at a time.
///
/// Results come back in store listing order regardless of which scan
/// finishes first. Unreadable notes are logged and skipped.
pub async fn handle_search(state: &GlobalState, query: String) -> Result<Response> {
    if is_blank_query(&query) {
        return Ok(Response::SearchResults {
            results: Vec::new(),
        });
    }

    let matcher = Arc::new(Matcher::build(&query)?);
    let (fs, max_workers) = with_engine(state, |engine| {
        Ok((engine.fs(), engine.config().search.max_workers))
    })
    .await?;

    let ids = {
        let fs = Arc::clone(&fs);
        tokio::task::spawn_blocking(move || fs.list_live_note_ids())
            .await
            .map_err(join_error)??
    };

    let workers = max_workers.min(ids.len()).max(1);
    let permits = Arc::new(Semaphore::new(workers));
    log::debug!("Searching {} note(s) with {} worker(s)", ids.len(), workers);

    let mut scans = Vec::with_capacity(ids.len());
    for id in ids {
        let permit = Arc::clone(&permits)
            .acquire_owned()
            .await
            .map_err(|e| Error::Io(std::io::Error::other(e)))?;
        let fs = Arc::clone(&fs);
        let matcher = Arc::clone(&matcher);
        scans.push(tokio::task::spawn_blocking(move || {
            let _permit = permit;
            let scanned = fs
                .open_body(&id)
                .and_then(|reader| search_note(&matcher, id.clone(), reader));
            (id, scanned)
        }));
    }

    let mut results = Vec::new();
    for scan in scans {
        match scan.await {
            Ok((_, Ok(Some(result)))) => results.push(result),
            Ok((_, Ok(None))) => {}
            Ok((id, Err(e))) => log::warn!("Failed to search note {}: {}", id, e),
            Err(e) => log::warn!("Search task failed: {}", e),
        }
    }

    Ok(Response::SearchResults { results })
}
