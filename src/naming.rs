//! Bucket names and object key layouts used by the app.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Bucket {
    DoctorCertificates,
    DoctorProfiles,
    UserProfiles,
    ChatImages,
}

impl Bucket {
    pub const ALL: [Bucket; 4] = [
        Bucket::DoctorCertificates,
        Bucket::DoctorProfiles,
        Bucket::UserProfiles,
        Bucket::ChatImages,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Bucket::DoctorCertificates => "doctor-certificates",
            Bucket::DoctorProfiles => "doctor-profiles",
            Bucket::UserProfiles => "user-profiles",
            Bucket::ChatImages => "chat-images",
        }
    }

    pub fn parse(raw: &str) -> Option<Bucket> {
        Bucket::ALL.into_iter().find(|b| b.as_str() == raw)
    }
}

impl fmt::Display for Bucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Milliseconds since the epoch, used to keep generated keys unique per user action.
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

pub fn certificate_key(user_id: &str, millis: i64, index: usize, ext: &str) -> String {
    format!("{user_id}/certificate_{millis}_{index}.{ext}")
}

pub fn doctor_profile_key(user_id: &str, millis: i64) -> String {
    format!("doctor_profile_{user_id}_{millis}.jpg")
}

pub fn user_profile_key(user_id: &str, millis: i64) -> String {
    format!("user_profile_{user_id}_{millis}.jpg")
}

pub fn chat_image_key(chat_id: &str, millis: i64) -> String {
    format!("chat_images/{chat_id}/{millis}.jpg")
}
