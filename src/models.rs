use serde::{Deserialize, Serialize};

/// Body of the create and edit endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct StoryPayload {
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub url: String,
}

impl StoryPayload {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        StoryPayload {
            title: title.into(),
            description: description.into(),
            url: String::new(),
        }
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    pub fn empty() -> Self {
        StoryPayload::new("", "")
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest<'a> {
    pub login_email: &'a str,
    pub login_password: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub access_token: Option<String>,
}

/// The loose `{msg, id}` shape most endpoints answer with.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiEnvelope {
    pub msg: Option<String>,
    pub id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreatedStory {
    pub msg: Option<String>,
    pub id: Option<String>,
}

/// One entry of `GET /api/Story/All`.
#[derive(Debug, Clone, Deserialize)]
pub struct StorySummary {
    pub id: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EditedStory {
    pub msg: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DeletedStory {
    pub msg: Option<String>,
}

/// Responses that carry a human readable `msg`.
pub trait Message {
    fn message(&self) -> Option<&str>;
}

macro_rules! impl_message {
    ($($ty:ty),*) => {
        $(impl Message for $ty {
            fn message(&self) -> Option<&str> {
                self.msg.as_deref()
            }
        })*
    };
}

impl_message!(ApiEnvelope, CreatedStory, EditedStory, DeletedStory);
