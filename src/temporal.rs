//! Temporal pairing and grouping of input files.

use chrono::NaiveDateTime;
use std::collections::BTreeMap;
use tracing::info;

use crate::discovery::{FileDiscovery, FileRef};
use crate::logging::PROGRESS_TARGET;

/// Sorted, deduplicated acquisition (start) times.
pub fn observation_dates(file_refs: &[FileRef]) -> Vec<NaiveDateTime> {
    let mut dates: Vec<NaiveDateTime> = file_refs.iter().map(|f| f.start_time).collect();
    dates.sort();
    dates.dedup();
    dates
}

/// Consecutive date pairs `[d_i, d_i+1)`.
pub fn observation_windows(dates: &[NaiveDateTime]) -> Vec<(NaiveDateTime, NaiveDateTime)> {
    dates.windows(2).map(|pair| (pair[0], pair[1])).collect()
}

pub fn in_window(time: NaiveDateTime, start: NaiveDateTime, end: NaiveDateTime) -> bool {
    start <= time && time < end
}

/// Groups files by their literal start time.
///
/// Variables are assumed to cover exactly one day (start == end). A
/// variable spanning several days is still keyed by its start time only,
/// so files of the same period but different start days end up in separate
/// groups.
pub fn group_by_date(file_refs: &[FileRef]) -> BTreeMap<NaiveDateTime, Vec<FileRef>> {
    let mut groups: BTreeMap<NaiveDateTime, Vec<FileRef>> = BTreeMap::new();
    for file_ref in file_refs {
        groups
            .entry(file_ref.start_time)
            .or_default()
            .push(file_ref.clone());
    }
    groups
}

/// Picks, per variable, the first file of the group valid for it.
pub fn select_variable_files<D: FileDiscovery + ?Sized>(
    group: &[FileRef],
    variable_names: &[String],
    discovery: &D,
) -> BTreeMap<String, String> {
    variable_names
        .iter()
        .filter_map(|variable_name| {
            group
                .iter()
                .find(|file_ref| discovery.is_valid(&file_ref.url, variable_name))
                .map(|file_ref| (variable_name.clone(), file_ref.url.clone()))
        })
        .collect()
}

/// Progress after observation window `index` of a run with `num_dates` dates.
pub fn observation_progress(index: usize, num_dates: usize) -> u32 {
    if num_dates < 2 {
        return 100;
    }
    (index * 100 / (num_dates - 1)) as u32
}

/// Progress after date group `index` of `num_groups`.
pub fn variable_progress(index: usize, num_groups: usize) -> u32 {
    if num_groups == 0 {
        return 100;
    }
    (index * 100 / num_groups) as u32
}

/// Emits a progress event for `processor` on the progress target.
pub fn report_progress(processor: &str, percent: u32) {
    info!(target: PROGRESS_TARGET, processor, progress = percent, "{}%", percent);
}
