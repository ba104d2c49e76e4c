/// A desktop notification about review activity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    title: String,
    message: String,
    url: Option<String>,
}

impl Notification {
    pub fn new(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
            url: None,
        }
    }

    /// Sets the URL opened when the notification is clicked.
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }
}
