#![forbid(unsafe_code)]

use serde::{Deserialize, Serialize};

use crate::error::PmError;
use crate::model::{ensure_hours, ensure_not_blank};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub avatar: String,
    pub daily_capacity_hours: f64,
}

impl User {
    pub fn validate(&self) -> Result<(), PmError> {
        ensure_not_blank("user", &self.id, "id", &self.id)?;
        ensure_not_blank("user", &self.id, "name", &self.name)?;
        ensure_hours("user", &self.id, "dailyCapacityHours", self.daily_capacity_hours)
    }

    /// Initials shown in place of an avatar, e.g. `AC` for "Alex Chen".
    #[must_use]
    pub fn initials(&self) -> String {
        self.name
            .split_whitespace()
            .filter_map(|w| w.chars().next())
            .flat_map(char::to_uppercase)
            .take(2)
            .collect()
    }
}

#[must_use]
pub fn find_user<'a>(users: &'a [User], id: &str) -> Option<&'a User> {
    users.iter().find(|u| u.id == id)
}
