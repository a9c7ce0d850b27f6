//! Readers for the files inside a `.dist-info` directory.

/// Header fields of a core metadata file (`METADATA` / `PKG-INFO`).
///
/// The format is RFC 822 style: `Key: value` lines up to the first blank
/// line, with indented lines continuing the previous value. Keys repeat for
/// multi-valued fields such as `Requires-Dist`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CoreMetadata {
    fields: Vec<(String, String)>,
}

impl CoreMetadata {
    pub fn parse(content: &str) -> Self {
        let mut fields: Vec<(String, String)> = Vec::new();

        for line in content.lines() {
            if line.trim().is_empty() {
                // Body (long description) starts here
                break;
            }

            if line.starts_with([' ', '\t']) {
                if let Some((_, value)) = fields.last_mut() {
                    value.push('\n');
                    value.push_str(line.trim());
                }
                continue;
            }

            if let Some((key, value)) = line.split_once(':') {
                fields.push((key.trim().to_string(), value.trim().to_string()));
            }
        }

        Self { fields }
    }

    /// First value of `key` (case-insensitive).
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
    }

    /// Every value of `key` (case-insensitive), in file order.
    pub fn get_all(&self, key: &str) -> Vec<String> {
        self.fields
            .iter()
            .filter(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.clone())
            .collect()
    }
}

/// File paths listed in a `RECORD` file (first CSV column).
pub fn parse_record(content: &str) -> Vec<String> {
    content
        .lines()
        .filter_map(|line| {
            let line = line.trim_end_matches('\r');
            if line.is_empty() {
                return None;
            }
            let path = match line.strip_prefix('"') {
                Some(quoted) => {
                    let mut path = String::new();
                    let mut chars = quoted.chars().peekable();
                    while let Some(c) = chars.next() {
                        if c == '"' {
                            if chars.peek() == Some(&'"') {
                                chars.next();
                                path.push('"');
                            } else {
                                break;
                            }
                        } else {
                            path.push(c);
                        }
                    }
                    path
                }
                None => line.split(',').next().unwrap_or_default().to_string(),
            };
            (!path.is_empty()).then_some(path)
        })
        .collect()
}
