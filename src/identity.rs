use crate::model::User;

pub const UNKNOWN_USER: &str = "Unknown User";

/// Name to show for `user`: the display name when it is set and non-empty,
/// otherwise the login. An absent user resolves to [`UNKNOWN_USER`].
pub fn resolve_name(user: Option<&User>) -> String {
    match user {
        None => UNKNOWN_USER.to_string(),
        Some(user) => match user.display_name.as_deref() {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => user.login.clone(),
        },
    }
}
