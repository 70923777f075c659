use sha2::{Digest, Sha256};

/// Export filename: `{slug(title)}--{short_hash(property_id)}.csv`.
///
/// The slug lowercases ASCII letters and digits and turns everything else
/// into `_`; the hash keeps properties with equal titles apart.
pub fn export_filename(title: &str, property_id: &str) -> String {
    let mut slug: String = title
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '_'
            }
        })
        .collect();
    if slug.trim_matches('_').is_empty() {
        slug = "property".to_string();
    }
    slug.truncate(80);
    format!("{slug}--{}.csv", short_hash(property_id))
}

fn short_hash(input: &str) -> String {
    let digest = Sha256::digest(input.as_bytes());
    let mut hex = String::with_capacity(8);
    for byte in digest.iter().take(4) {
        use std::fmt::Write;
        let _ = write!(&mut hex, "{byte:02x}");
    }
    hex
}
