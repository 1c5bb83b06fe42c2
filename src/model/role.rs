use serde::{Deserialize, Serialize};

#[derive(
    Debug,
    Copy,
    Clone,
    Eq,
    PartialEq,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Student,
    Faculty,
    Hod,
}

impl Role {
    pub fn from_label(label: &str) -> Option<Self> {
        label.parse().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_round_trip() {
        for (label, role) in [
            ("student", Role::Student),
            ("faculty", Role::Faculty),
            ("hod", Role::Hod),
        ] {
            assert_eq!(Role::from_label(label), Some(role));
            assert_eq!(role.to_string(), label);
        }
    }

    #[test]
    fn unknown_label_is_rejected() {
        assert_eq!(Role::from_label("admin"), None);
        assert_eq!(Role::from_label(""), None);
    }
}
