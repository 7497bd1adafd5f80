//! ID generation utilities.

use uuid::Uuid;

/// Generate a new UUID v4.
pub fn uuid() -> String {
    Uuid::new_v4().to_string()
}

/// Generate a short correlation ID for one dispatch call.
///
/// Attached to every diagnostic line of the call's attempt trail so the
/// failover path can be reconstructed from logs.
pub fn dispatch_id() -> String {
    let simple = Uuid::new_v4().simple().to_string();
    simple[..12].to_string()
}
