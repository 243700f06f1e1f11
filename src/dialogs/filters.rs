/*
 * File-type filters for the open/save dialogs. Filters are written as
 * `"Name|*.a;*.b|Other|*.c"`: display names and pattern lists alternating,
 * separated by `|`. The selected filter is addressed by a 1-based index, the
 * native convention, where index 0 means "no selection".
 */

use crate::error::{PlatformError, Result as PlatformResult};
use crate::services::FileFilter;

use std::path::{Path, PathBuf};

pub fn parse_filter_spec(spec: &str) -> PlatformResult<Vec<FileFilter>> {
    let spec = spec.strip_suffix('|').unwrap_or(spec);
    if spec.trim().is_empty() {
        return Ok(Vec::new());
    }
    let parts: Vec<&str> = spec.split('|').collect();
    if parts.len() % 2 != 0 {
        return Err(PlatformError::InvalidState(format!(
            "Filter spec '{spec}' has a name without patterns"
        )));
    }
    parts
        .chunks(2)
        .map(|pair| {
            let name = pair[0].trim();
            let patterns: Vec<String> = pair[1]
                .split(';')
                .map(str::trim)
                .filter(|p| !p.is_empty())
                .map(str::to_string)
                .collect();
            if name.is_empty() || patterns.is_empty() {
                return Err(PlatformError::InvalidState(format!(
                    "Filter entry '{}|{}' is incomplete",
                    pair[0], pair[1]
                )));
            }
            Ok(FileFilter {
                name: name.to_string(),
                patterns,
            })
        })
        .collect()
}

/*
 * The double-NUL terminated list the native dialog expects:
 * `name\0patterns\0...name\0patterns\0\0`.
 */
pub fn native_filter_string(filters: &[FileFilter]) -> String {
    let mut native = String::new();
    for filter in filters {
        native.push_str(&filter.name);
        native.push('\0');
        native.push_str(&filter.patterns.join(";"));
        native.push('\0');
    }
    native.push('\0');
    native
}

/// The filter at the 1-based `index`, if there is one.
pub fn selected_filter(filters: &[FileFilter], index: u32) -> Option<&FileFilter> {
    let position = usize::try_from(index).ok()?.checked_sub(1)?;
    filters.get(position)
}

/*
 * The extension the first pattern of a filter implies: `*.txt` gives `txt`.
 * Wildcard extensions (`*.*`, `*.t?t`) imply none.
 */
pub fn filter_extension(filter: &FileFilter) -> Option<String> {
    let pattern = filter.patterns.first()?;
    let extension = pattern.rsplit_once('.')?.1;
    if extension.is_empty() || extension.contains(['*', '?']) {
        return None;
    }
    Some(extension.to_string())
}

/*
 * Appends an extension to a save path that has none: the selected filter's
 * extension when it implies one, otherwise `fallback`.
 */
pub fn apply_default_extension(
    path: &Path,
    filters: &[FileFilter],
    filter_index: u32,
    fallback: Option<&str>,
) -> PathBuf {
    if path.extension().is_some() {
        return path.to_path_buf();
    }
    let extension = selected_filter(filters, filter_index)
        .and_then(filter_extension)
        .or_else(|| fallback.map(|e| e.trim_start_matches('.').to_string()))
        .filter(|e| !e.is_empty());
    match extension {
        Some(extension) => {
            let mut name = path.as_os_str().to_os_string();
            name.push(".");
            name.push(&extension);
            PathBuf::from(name)
        }
        None => path.to_path_buf(),
    }
}
