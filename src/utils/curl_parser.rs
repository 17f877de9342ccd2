use crate::upload::UploadError;

/// Pulls a session out of whatever the photographer pasted: a bare token, an
/// `Authorization: Bearer` header line, or a browser "Copy as cURL" command.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CurlParser {
    pub access_token: Option<String>,
    pub base_url: Option<String>,
    pub event_id: Option<String>,
}

const BEARER_PREFIX: &str = "authorization: bearer ";

fn is_token_end(c: char) -> bool {
    c.is_whitespace() || c == '\'' || c == '"'
}

impl CurlParser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn parse(&mut self, text: &str) -> Result<(), UploadError> {
        let text = text.trim();
        let url = Self::find_url(text);

        let token = Self::find_bearer(text)
            .or_else(|| Self::bare_token(text))
            .ok_or_else(|| {
                UploadError::Auth("Could not find a bearer token in the pasted text".to_string())
            })?;

        self.base_url = url.and_then(Self::base_of);
        self.event_id = url.and_then(Self::event_of);
        self.access_token = Some(token);

        Ok(())
    }

    fn find_bearer(text: &str) -> Option<String> {
        // ASCII lowercasing keeps byte offsets aligned with `text`.
        let lower = text.to_ascii_lowercase();
        let start = lower.find(BEARER_PREFIX)? + BEARER_PREFIX.len();
        let rest = text[start..].trim_start();
        let token: String = rest.chars().take_while(|c| !is_token_end(*c)).collect();
        (!token.is_empty()).then_some(token)
    }

    fn bare_token(text: &str) -> Option<String> {
        let single_word = !text.is_empty() && !text.contains(char::is_whitespace);
        (single_word && !text.contains("://")).then(|| text.to_string())
    }

    fn find_url(text: &str) -> Option<&str> {
        let start = text.find("https://").or_else(|| text.find("http://"))?;
        let rest = &text[start..];
        let end = rest.find(is_token_end).unwrap_or(rest.len());
        Some(&rest[..end])
    }

    fn base_of(url: &str) -> Option<String> {
        let scheme_end = url.find("://")? + 3;
        let host_end = url[scheme_end..]
            .find('/')
            .map(|i| scheme_end + i)
            .unwrap_or(url.len());
        (host_end > scheme_end).then(|| url[..host_end].to_string())
    }

    fn event_of(url: &str) -> Option<String> {
        const MARKER: &str = "/api/events/";
        let start = url.find(MARKER)? + MARKER.len();
        let segment: String = url[start..]
            .chars()
            .take_while(|c| *c != '/' && *c != '?' && *c != '#')
            .collect();
        (!segment.is_empty() && segment != "photographer").then_some(segment)
    }
}
