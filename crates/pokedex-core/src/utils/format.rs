/// Base URL for official artwork sprites, keyed by numeric id
const ARTWORK_BASE_URL: &str =
    "https://raw.githubusercontent.com/PokeAPI/sprites/master/sprites/pokemon/other/official-artwork";

/// Last non-empty path segment of a resource URL.
/// `https://x/pokemon/25/` yields `25`; an empty URL yields an empty string.
pub fn id_from_url(url: &str) -> &str {
    url.split('/').filter(|s| !s.is_empty()).last().unwrap_or("")
}

pub fn artwork_url(id: &str) -> String {
    format!("{}/{}.png", ARTWORK_BASE_URL, id)
}

/// "mr-mime" -> "Mr Mime"
pub fn title_case(name: &str) -> String {
    name.split(['-', ' '])
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

/// Truncate a string to a maximum length, adding ellipsis if needed
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len <= 3 {
        s.chars().take(max_len).collect()
    } else {
        let truncated: String = s.chars().take(max_len - 3).collect();
        format!("{}...", truncated)
    }
}

/// Case-insensitive substring check
pub fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}
