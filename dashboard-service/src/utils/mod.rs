/// Capitalize the first letter of every word and lowercase the rest.
pub fn to_title_case(s: &str) -> String {
    s.split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Up to two uppercase initials from the words of `name`.
pub fn initials(name: &str) -> String {
    name.split_whitespace()
        .filter_map(|word| word.chars().next())
        .flat_map(char::to_uppercase)
        .take(2)
        .collect()
}

/// Display form of the `user` cookie: lowercase, whitespace as dots.
pub fn display_email(user: &str) -> String {
    user.trim()
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(".")
}
