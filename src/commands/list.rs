use anyhow::Result;
use log::debug;

use crate::{
    application::{outdated_count, visible},
    package::PackageFilter,
    runtime::Runtime,
    store::StoredDistribution,
};

use super::config::{Config, GlobalOptions};

#[derive(Debug, Clone, Copy, Default)]
pub struct ListOptions {
    /// Only packages with a newer release
    pub outdated: bool,
    /// Ignore the visibility settings
    pub all: bool,
    pub json: bool,
}

/// List stored packages
#[tracing::instrument(skip(runtime, options))]
pub fn list<R: Runtime>(runtime: R, options: GlobalOptions, list: ListOptions) -> Result<()> {
    let config = Config::new(runtime, options)?;
    let state = config.store().load()?;

    let filter = if list.all {
        PackageFilter::everything()
    } else {
        PackageFilter::from_settings(&config.settings)
    };
    let mut dists = visible(&state, &filter);
    debug!("{} of {} stored packages visible", dists.len(), state.len());
    if list.outdated {
        dists.retain(|d| d.is_outdated == Some(true));
    }

    if list.json {
        println!("{}", serde_json::to_string_pretty(&dists)?);
        return Ok(());
    }

    if dists.is_empty() {
        println!("No packages.");
        return Ok(());
    }

    print!("{}", format_table(&dists));
    println!("{} of {} packages outdated", outdated_count(&dists), dists.len());
    Ok(())
}

fn status(dist: &StoredDistribution) -> &'static str {
    match dist.is_outdated {
        Some(true) => "outdated",
        Some(false) => "current",
        None => "unknown",
    }
}

fn format_table(dists: &[&StoredDistribution]) -> String {
    let header = ["NAME", "INSTALLED", "LATEST", "STATUS", "APPS"];
    let rows: Vec<[String; 5]> = dists
        .iter()
        .map(|d| {
            [
                d.name.clone(),
                d.installed_version.clone(),
                if d.latest_version.is_empty() {
                    "?".to_string()
                } else {
                    d.latest_version.clone()
                },
                status(d).to_string(),
                d.apps.join(", "),
            ]
        })
        .collect();

    let mut widths = header.map(str::len);
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.len());
        }
    }

    let mut out = String::new();
    let mut push_row = |cells: [&str; 5]| {
        let line: Vec<String> = cells
            .iter()
            .zip(widths)
            .map(|(cell, width)| format!("{:<width$}", cell, width = width))
            .collect();
        out.push_str(line.join("  ").trim_end());
        out.push('\n');
    };

    push_row(header);
    for row in &rows {
        push_row(row.each_ref().map(String::as_str));
    }
    out
}
