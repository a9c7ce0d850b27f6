/// Normalize a distribution name for matching (PEP 503).
///
/// Lower-cases the name and collapses every run of `-`, `_` and `.` into a
/// single `-`, so `Django_Extensions`, `django.extensions` and
/// `django--extensions` all compare equal.
pub fn canonicalize_name(name: &str) -> String {
    let mut canonical = String::with_capacity(name.len());
    let mut in_separator = false;

    for c in name.trim().chars() {
        if matches!(c, '-' | '_' | '.') {
            if !in_separator {
                canonical.push('-');
                in_separator = true;
            }
        } else {
            canonical.extend(c.to_lowercase());
            in_separator = false;
        }
    }

    canonical
}
