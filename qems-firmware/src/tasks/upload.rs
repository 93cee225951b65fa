//! Upload notification routing
//!
//! The web server stores an uploaded file as `/<lowercased name>`. Once the
//! file is closed it hands the name to [`route_upload`], which reloads every
//! store reading that path.

use heapless::Vec;

use qems_core::config::SourceId;
use qems_core::metric::{Metric, PerMetric};
use qems_core::store::StoreLoader;
use qems_core::traits::{Clock, LineSource};
use qems_core::LoadOutcome;

use crate::channels::Channels;

/// File system path an uploaded file is written to
///
/// Returns `None` if the name does not fit a source identifier.
pub fn upload_path(filename: &str) -> Option<SourceId> {
    let mut path = SourceId::new();
    path.push('/').ok()?;
    for c in filename.chars().flat_map(char::to_lowercase) {
        path.push(c).ok()?;
    }
    Some(path)
}

/// Reload the stores backed by a freshly uploaded file
///
/// Must only be called after the upload has been written and closed.
/// Returns the metrics whose store was reloaded. A store busy with another
/// load is skipped and the loader task is asked for a reload pass instead.
pub fn route_upload<C: Clock, S: LineSource, const N: usize>(
    filename: &str,
    stores: &PerMetric<StoreLoader<'_, C, S, N>>,
    channels: &Channels,
) -> Vec<Metric, 2> {
    let mut reloaded = Vec::new();

    let Some(path) = upload_path(filename) else {
        warn!("Upload name too long, ignored");
        return reloaded;
    };

    let mut matched = false;
    for (metric, store) in stores.iter() {
        if store.source_id() != path.as_str() {
            continue;
        }
        matched = true;

        match store.load() {
            LoadOutcome::Busy => {
                warn!("[{}] busy, upload deferred to the loader task", path.as_str());
                channels.request_reload();
            }
            outcome => {
                info!("Reloaded [{}] after upload: {:?}", path.as_str(), outcome);
                let _ = reloaded.push(metric);
            }
        }
    }

    if !matched {
        debug!("Upload [{}] is not a schedule", path.as_str());
    }

    reloaded
}
