/// Uppercases the first character of `word` and leaves the rest alone.
fn upper_first(word: &str) -> String {
    let mut chars = word.chars();
    chars.next().map_or_else(String::new, |first| first.to_uppercase().chain(chars).collect())
}

/// `"hello WORLD"` → `"Hello World"`.
#[must_use]
pub fn title_case(s: &str) -> String {
    s.split_whitespace().map(|w| upper_first(&w.to_lowercase())).collect::<Vec<_>>().join(" ")
}

/// `"hello wORLD"` → `"Hello WORLD"`; only first letters change.
#[must_use]
pub fn capitalize_words(s: &str) -> String {
    s.split_whitespace().map(upper_first).collect::<Vec<_>>().join(" ")
}

#[must_use]
pub fn snake_case(s: &str) -> String {
    s.to_lowercase().replace(' ', "_")
}

#[must_use]
pub fn kebab_case(s: &str) -> String {
    s.to_lowercase().replace(' ', "-")
}

/// `"user_profile id"` → `"userProfileId"`.
#[must_use]
pub fn camel_case(s: &str) -> String {
    let spaced = s.replace('_', " ");
    let mut words = spaced.split_whitespace();
    let Some(first) = words.next() else {
        return String::new();
    };
    words.fold(first.to_lowercase(), |mut acc, word| {
        acc.push_str(&upper_first(&word.to_lowercase()));
        acc
    })
}

/// `"user_profile id"` → `"UserProfileId"`.
#[must_use]
pub fn pascal_case(s: &str) -> String {
    s.replace('_', " ").split_whitespace().map(|w| upper_first(&w.to_lowercase())).collect()
}
