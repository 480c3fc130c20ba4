//! Normalization of user-supplied port and volume mapping lists.
//!
//! Both lists are comma separated. Tokens that do not match the expected
//! shape are dropped instead of failing the whole request, and the
//! survivors are re-joined with a bare comma in their original order.

/// Keeps only `hostPort:containerPort` tokens made of ASCII digits.
#[must_use]
pub fn sanitize_ports(raw: &str) -> String {
    sanitize(raw, is_port_pair)
}

/// Keeps only `hostPath:containerPath` tokens without whitespace.
#[must_use]
pub fn sanitize_volumes(raw: &str) -> String {
    sanitize(raw, is_volume_pair)
}

fn sanitize(raw: &str, keep: fn(&str) -> bool) -> String {
    raw.split(',')
        .map(str::trim)
        .filter(|token| keep(token))
        .collect::<Vec<_>>()
        .join(",")
}

fn is_port_pair(token: &str) -> bool {
    let is_number = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
    token
        .split_once(':')
        .is_some_and(|(host, container)| is_number(host) && is_number(container))
}

fn is_volume_pair(token: &str) -> bool {
    if token.is_empty() || token.chars().any(char::is_whitespace) {
        return false;
    }
    // Any colon with at least one character on each side satisfies `\S+:\S+`.
    token
        .char_indices()
        .any(|(i, c)| c == ':' && i > 0 && i + 1 < token.len())
}

/// Splits a canonical list back into its tokens.
pub fn entries(canonical: &str) -> impl Iterator<Item = &str> {
    canonical.split(',').filter(|s| !s.is_empty())
}
