use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Current-user payload. The server is known to attach fields beyond the
/// closed set below; they are kept in `extra` instead of a free-form map
/// over the whole struct.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub coin: u32,
    pub jar_id: String,
    pub nickname: String,
    #[serde(default)]
    pub last_login_at: String,
    #[serde(default)]
    pub phone_number: String,
    pub user_id: String,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

/// One sealed message as listed in a jar. Content is not included; it
/// comes back only from the open-capsule endpoints.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Capsule {
    pub capsule_id: String,
    pub author_nickname: String,
    pub created_at: String,
    pub emoji: u32,
    #[serde(default)]
    pub emoji_reply: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    pub color: String,
    pub public: bool,
    pub read: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Jar {
    pub coin: u32,
    pub user_nickname: String,
    pub capsules: Vec<Capsule>,
}

/// Full capsule payload returned by the open endpoints (chosen or random).
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CapsuleDetail {
    #[serde(default)]
    pub author_nickname: String,
    #[serde(default)]
    pub author_id: String,
    pub content: String,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub emoji: u32,
    #[serde(default)]
    pub jar_id: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub public: bool,
    #[serde(default)]
    pub read: bool,
    #[serde(default)]
    pub replied: bool,
    #[serde(default)]
    pub reply_capsule: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LoginForm {
    pub id: String,
    pub password: String,
}

/// Payload of a successful login.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginData {
    pub token: String,
    #[serde(default)]
    pub jar_id: String,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupForm {
    pub id: String,
    pub password: String,
    pub password_confirm: String,
    pub nickname: String,
    pub phone_number: String,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WritePayload {
    pub content: String,
    pub emoji: u32,
    pub is_public: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_keeps_unknown_fields_in_extra() {
        let raw = r#"{
            "coin": 3,
            "jarId": "j1",
            "nickname": "ami",
            "lastLoginAt": "2024-01-01",
            "phoneNumber": "01012345678",
            "userId": "u1",
            "badgeCount": 7
        }"#;
        let user: User = serde_json::from_str(raw).unwrap();
        assert_eq!(user.jar_id, "j1");
        assert_eq!(user.extra.get("badgeCount"), Some(&serde_json::json!(7)));
    }

    #[test]
    fn write_payload_uses_wire_field_names() {
        let payload = WritePayload {
            content: "hello there!".to_string(),
            emoji: 2,
            is_public: false,
        };
        let raw = serde_json::to_string(&payload).unwrap();
        assert!(raw.contains("\"isPublic\":false"));
        assert!(raw.contains("\"emoji\":2"));
    }

    #[test]
    fn capsule_type_field_round_trips() {
        // The color value contains a '#', so the literal needs wider
        // raw-string delimiters.
        let raw = r##"{
            "capsuleId": "c1",
            "authorNickname": "ami",
            "createdAt": "2024-01-01",
            "emoji": 0,
            "emojiReply": "",
            "type": "normal",
            "color": "#A1B2C3",
            "public": true,
            "read": false
        }"##;
        let capsule: Capsule = serde_json::from_str(raw).unwrap();
        assert_eq!(capsule.kind, "normal");
        let back = serde_json::to_value(&capsule).unwrap();
        assert_eq!(back["type"], "normal");
    }
}
