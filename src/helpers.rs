/// Upper-case the first letter of every whitespace-separated word.
///
/// Runs of whitespace collapse to a single space; the rest of each word is
/// left as is, so `"led zeppelin"` becomes `"Led Zeppelin"` and `"AC/DC"`
/// stays `"AC/DC"`.
#[must_use]
pub fn capitalize(input: &str) -> String {
    input
        .split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}
