// Denylist matching - pure, no I/O.

/// Find the first denylisted term contained in `content`, case-insensitively.
///
/// Terms are stored lowercase, so only the message needs normalizing.
/// Plain substring containment by contract: "class" matches "classic".
/// Denylists are small per guild, so the O(terms x length) scan is fine.
pub fn find_blocked_term<'a>(content: &str, denylist: &'a [String]) -> Option<&'a str> {
    if denylist.is_empty() {
        return None;
    }

    let normalized = content.to_lowercase();
    denylist
        .iter()
        .find(|term| normalized.contains(term.as_str()))
        .map(|term| term.as_str())
}
