//! Terminal rendering for catalog entities
//!
//! The catalog models are tolerant readers, so nearly every field arrives
//! as an `Option`. These helpers render placeholders for absent data
//! instead of failing, keeping the command handlers free of unwrap noise.

use chrono::{DateTime, NaiveDate, Utc};
use geojson::GeoJson;
use indicatif::HumanDuration;

use crate::app::datasets::ListCompleteness;
use crate::app::models::{
    filter_known_external_ids, BoundingBox, Feed, GtfsDataset, SearchResults, ValidationReport,
};
use crate::app::supporting::{
    RouteRow, SupportingFileData, SupportingFileKey, SupportingFileState, SupportingFiles,
};

/// Placeholder printed for absent values
const ABSENT: &str = "-";

/// Format a timestamp as `YYYY-MM-DD`, or "unknown" when absent
pub fn format_date(date: Option<DateTime<Utc>>) -> String {
    date.map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

/// Format a calendar date, or "unknown" when absent
pub fn format_naive_date(date: Option<NaiveDate>) -> String {
    date.map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

/// Describe how long ago a timestamp was, in round units
pub fn format_age(date: Option<DateTime<Utc>>) -> String {
    let Some(date) = date else {
        return "unknown".to_string();
    };

    match Utc::now().signed_duration_since(date).to_std() {
        Ok(elapsed) => format!("{} ago", HumanDuration(elapsed)),
        // signed_duration_since went negative: the timestamp is ahead of us
        Err(_) => "in the future".to_string(),
    }
}

/// Render an optional string, or a placeholder
pub fn format_optional(value: Option<&str>) -> String {
    value
        .filter(|v| !v.is_empty())
        .unwrap_or(ABSENT)
        .to_string()
}

/// Render an optional count, or a placeholder
pub fn format_count(value: Option<u64>) -> String {
    value
        .map(|v| v.to_string())
        .unwrap_or_else(|| ABSENT.to_string())
}

/// Human label for a listing completeness verdict
pub fn completeness_label(completeness: ListCompleteness) -> &'static str {
    match completeness {
        ListCompleteness::Complete => "complete",
        ListCompleteness::Incomplete => "more available",
        ListCompleteness::Unknown => "completeness unknown",
    }
}

/// Truncate long display strings, marking the cut with an ellipsis
fn truncate(value: &str, max_chars: usize) -> String {
    if value.chars().count() <= max_chars {
        return value.to_string();
    }
    let kept: String = value.chars().take(max_chars.saturating_sub(1)).collect();
    format!("{}…", kept)
}

/// Print the common fields of a feed, one labelled line per present field
pub fn render_feed_summary(feed: &Feed) {
    println!("Id:        {}", feed.id);
    println!(
        "Type:      {}",
        feed.data_type.map(|t| t.label()).unwrap_or(ABSENT)
    );
    println!("Status:    {}", format_optional(feed.status.as_deref()));
    println!("Name:      {}", format_optional(feed.feed_name.as_deref()));
    if feed.official == Some(true) {
        println!("Official:  yes");
    }

    let providers = feed.sorted_providers();
    if !providers.is_empty() {
        println!("Providers: {}", providers.join(", "));
    }

    let locations: Vec<String> = feed.locations.iter().filter_map(|l| l.describe()).collect();
    if !locations.is_empty() {
        println!("Locations: {}", locations.join("; "));
    }

    let external = filter_known_external_ids(&feed.external_ids);
    if !external.is_empty() {
        let entries: Vec<String> = external
            .iter()
            .map(|entry| {
                format!(
                    "{}:{}",
                    entry.source.as_deref().unwrap_or(ABSENT),
                    entry.external_id.as_deref().unwrap_or(ABSENT)
                )
            })
            .collect();
        println!("Registry:  {}", entries.join(", "));
    }

    if let Some(info) = &feed.source_info {
        if let Some(url) = &info.producer_url {
            println!("Producer:  {}", url);
        }
        if let Some(url) = &info.license_url {
            println!("License:   {}", url);
        }
    }

    for redirect in &feed.redirects {
        let target = format_optional(redirect.target_id.as_deref());
        match &redirect.comment {
            Some(comment) if !comment.is_empty() => {
                println!("Redirect:  {} ({})", target, comment)
            }
            _ => println!("Redirect:  {}", target),
        }
    }

    if let Some(note) = &feed.note {
        if !note.is_empty() {
            println!("Note:      {}", note);
        }
    }
}

/// Print a dataset's detail block: provenance, service window, validation
pub fn render_dataset_summary(dataset: &GtfsDataset) {
    println!("Dataset:    {}", dataset.id);
    println!(
        "Downloaded: {} ({})",
        format_date(dataset.downloaded_at),
        format_age(dataset.downloaded_at)
    );
    println!(
        "Service:    {} to {}",
        format_naive_date(dataset.service_date_range_start),
        format_naive_date(dataset.service_date_range_end)
    );
    if let Some(hash) = &dataset.hash {
        println!("Hash:       {}", hash);
    }
    if let Some(url) = &dataset.hosted_url {
        println!("Hosted at:  {}", url);
    }

    if let Some(bounding_box) = &dataset.bounding_box {
        render_bounding_box(bounding_box);
    }
    if let Some(report) = &dataset.validation_report {
        render_validation_report(report);
    }
}

/// Print the dataset extent as polygon corners, or "unknown" when degenerate
pub fn render_bounding_box(bounding_box: &BoundingBox) {
    match bounding_box.to_polygon() {
        Some(corners) => {
            let rendered: Vec<String> = corners
                .iter()
                .map(|[lat, lon]| format!("({:.4}, {:.4})", lat, lon))
                .collect();
            println!("Extent:     {}", rendered.join(" "));
        }
        None => println!("Extent:     unknown"),
    }
}

/// Print the validation summary line plus features and report link
pub fn render_validation_report(report: &ValidationReport) {
    println!(
        "Validation: {} errors, {} warnings, {} infos (validator {})",
        format_count(report.total_error),
        format_count(report.total_warning),
        format_count(report.total_info),
        format_optional(report.validator_version.as_deref())
    );
    if !report.features.is_empty() {
        println!("Features:   {}", report.features.join(", "));
    }
    if let Some(url) = &report.url_html {
        println!("Report:     {}", url);
    }
}

/// Print a feed listing as an aligned table
pub fn render_feeds_table(feeds: &[Feed]) {
    if feeds.is_empty() {
        println!("No feeds to show.");
        return;
    }

    let id_width = feeds.iter().map(|f| f.id.len()).max().unwrap_or(0).max(8);

    println!(
        "{:<id_width$}  {:<8}  {:<10}  {}",
        "Feed",
        "Type",
        "Status",
        "Provider",
        id_width = id_width
    );
    println!("{}", "-".repeat(id_width + 8 + 10 + 30 + 6));

    for feed in feeds {
        println!(
            "{:<id_width$}  {:<8}  {:<10}  {}",
            feed.id,
            feed.data_type.map(|t| t.api_value()).unwrap_or(ABSENT),
            truncate(feed.status.as_deref().unwrap_or(ABSENT), 10),
            truncate(feed.provider.as_deref().unwrap_or(ABSENT), 40),
            id_width = id_width
        );
    }
}

/// Print a dataset history as an aligned table, one row per dataset
pub fn render_dataset_table(datasets: &[GtfsDataset]) {
    if datasets.is_empty() {
        println!("No datasets to show.");
        return;
    }

    let id_width = datasets
        .iter()
        .map(|d| d.id.len())
        .max()
        .unwrap_or(0)
        .max(10);

    println!(
        "{:<id_width$}  {:<12}  {:<26}  {}",
        "Dataset",
        "Downloaded",
        "Service range",
        "Errors",
        id_width = id_width
    );
    println!("{}", "-".repeat(id_width + 12 + 26 + 6 + 6));

    for dataset in datasets {
        let service = format!(
            "{} to {}",
            format_naive_date(dataset.service_date_range_start),
            format_naive_date(dataset.service_date_range_end)
        );
        let errors = dataset
            .validation_report
            .as_ref()
            .and_then(|report| report.total_error);
        println!(
            "{:<id_width$}  {:<12}  {:<26}  {}",
            dataset.id,
            format_date(dataset.downloaded_at),
            service,
            format_count(errors),
            id_width = id_width
        );
    }
}

/// Print search hits as a table, followed by the server's total when known
pub fn render_search_results(results: &SearchResults) {
    if results.results.is_empty() {
        println!("No matches.");
        return;
    }

    let id_width = results
        .results
        .iter()
        .map(|hit| hit.id.len())
        .max()
        .unwrap_or(0)
        .max(8);

    println!(
        "{:<id_width$}  {:<8}  {:<10}  {:<30}  {}",
        "Feed",
        "Type",
        "Status",
        "Provider",
        "Location",
        id_width = id_width
    );
    println!("{}", "-".repeat(id_width + 8 + 10 + 30 + 20 + 8));

    for hit in &results.results {
        let location = hit
            .locations
            .iter()
            .filter_map(|l| l.describe())
            .next()
            .unwrap_or_else(|| ABSENT.to_string());
        println!(
            "{:<id_width$}  {:<8}  {:<10}  {:<30}  {}",
            hit.id,
            hit.data_type.map(|t| t.api_value()).unwrap_or(ABSENT),
            truncate(hit.status.as_deref().unwrap_or(ABSENT), 10),
            truncate(hit.provider.as_deref().unwrap_or(ABSENT), 30),
            truncate(&location, 36),
            id_width = id_width
        );
    }

    if let Some(total) = results.total {
        println!();
        println!("{} of {} matching feeds shown", results.results.len(), total);
    }
}

/// Print one status line per supporting file, expanding loaded routes
pub fn render_supporting_files(snapshot: &SupportingFiles, routes_limit: usize) {
    for key in SupportingFileKey::ALL {
        match snapshot.state(key) {
            SupportingFileState::Uninitialized => println!("{}: not available", key.name()),
            SupportingFileState::Loading => println!("{}: still loading", key.name()),
            SupportingFileState::Failed { message } => {
                println!("{}: failed ({})", key.name(), message)
            }
            SupportingFileState::Loaded(data) => match data {
                SupportingFileData::Coverage(geometry) => {
                    println!("{}: {}", key.name(), describe_geometry(geometry))
                }
                SupportingFileData::Routes(routes) => {
                    println!("{}: {} routes", key.name(), routes.len());
                    render_route_rows(routes, routes_limit);
                }
            },
        }
    }
}

/// Print a preview of the route extract, capped at `limit` rows
pub fn render_route_rows(routes: &[RouteRow], limit: usize) {
    for route in routes.iter().take(limit) {
        let route_type = route
            .route_type
            .as_ref()
            .map(|t| t.to_string())
            .unwrap_or_else(|| ABSENT.to_string());
        println!(
            "  {:<10} {:<6} {}",
            truncate(route.route_id.as_deref().unwrap_or(ABSENT), 10),
            route_type,
            route.route_name.as_deref().unwrap_or(ABSENT)
        );
    }
    if routes.len() > limit {
        println!("  ... and {} more routes", routes.len() - limit);
    }
}

/// One-line summary of loaded coverage geometry
fn describe_geometry(geometry: &GeoJson) -> String {
    match geometry {
        GeoJson::Geometry(_) => "geometry loaded".to_string(),
        GeoJson::Feature(_) => "1 feature loaded".to_string(),
        GeoJson::FeatureCollection(collection) => {
            format!("{} features loaded", collection.features.len())
        }
    }
}
