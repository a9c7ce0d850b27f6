//! Views over the stored packages.

use crate::package::PackageFilter;
use crate::store::{StateFile, StoredDistribution};

/// Longest `pip install` command line that will be produced.
pub const MAX_COMMAND_LENGTH: usize = 4095;

/// Stored packages `filter` lets through, in name order.
pub fn visible<'s>(state: &'s StateFile, filter: &PackageFilter) -> Vec<&'s StoredDistribution> {
    state
        .iter()
        .filter(|d| filter.is_visible(&d.name, !d.apps.is_empty(), d.is_editable))
        .collect()
}

pub fn outdated_count(dists: &[&StoredDistribution]) -> usize {
    dists.iter().filter(|d| d.is_outdated == Some(true)).count()
}

/// `pip install name==latest ...` for every package with a known latest
/// version, stopping before the line would exceed [`MAX_COMMAND_LENGTH`].
pub fn install_command(dists: &[&StoredDistribution]) -> String {
    let mut command = String::from("pip install");

    for dist in dists.iter().filter(|d| !d.latest_version.is_empty()) {
        let pin = format!(" {}=={}", dist.name, dist.latest_version);
        if command.len() + pin.len() > MAX_COMMAND_LENGTH {
            break;
        }
        command.push_str(&pin);
    }

    command
}
