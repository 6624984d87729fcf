use super::profile::ProfileStatus;
use serde::Serialize;

/// A profile-status transition observed by the change feed.
/// `previous == None` means the profile was not known before.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChangeEvent {
    pub user_id: String,
    pub previous: Option<ProfileStatus>,
    pub current: ProfileStatus,
}
