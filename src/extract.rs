//! Link extraction from free-form message text.

const SCHEMES: [&str; 2] = ["http://", "https://"];

/// Return the first space-separated token that starts with `http://` or
/// `https://`, verbatim.
///
/// Tokens are split on the ASCII space only. Tabs and newlines stay inside a
/// token, so `"see\nhttps://x"` does not match.
pub fn extract_url(text: &str) -> Option<&str> {
    text.split(' ').find(|token| is_link(token))
}

fn is_link(token: &str) -> bool {
    SCHEMES.iter().any(|scheme| token.starts_with(scheme))
}
