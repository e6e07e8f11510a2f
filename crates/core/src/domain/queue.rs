// Queue Domain Model

/// Queue identifier as Resque knows it (e.g. `"mailers"`)
pub type QueueName = String;

/// Normalize a queue name taken from user input
///
/// Accepts symbol-style input (`":test"`) and surrounding whitespace,
/// returns `None` when nothing is left.
pub fn normalize_queue_name(raw: &str) -> Option<QueueName> {
    let name = raw.trim().trim_start_matches(':');
    if name.is_empty() {
        None
    } else {
        Some(name.to_string())
    }
}
