use std::time::Duration;

use {
    secrecy::{ExposeSecret, Secret},
    serde::{Deserialize, Serialize, de::DeserializeOwned},
};

use crate::{
    entities::{Account, SearchResults, Status},
    error::{Error, Result},
};

/// Per-call timeout for plain REST requests. The streaming endpoint is
/// long-lived and sets no total timeout (see `streaming.rs`).
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// One channel's Mastodon account credentials, as carried in the config.
///
/// `client_id`/`client_secret` identify the OAuth application and are only
/// needed when (re)issuing tokens; every API call authenticates with the
/// bearer `access_token`.
#[derive(Clone)]
pub struct Credentials {
    pub client_id: String,
    pub client_secret: Secret<String>,
    pub access_token: Secret<String>,
    pub api_base_url: String,
}

/// Thin client over the handful of Mastodon endpoints the relay uses.
///
/// Cheap to build; the relay constructs one per command invocation from the
/// channel's credentials.
#[derive(Clone)]
pub struct Client {
    http: reqwest::Client,
    base_url: String,
    access_token: Secret<String>,
}

impl Client {
    pub fn new(credentials: &Credentials) -> Result<Self> {
        let base_url = credentials.api_base_url.trim_end_matches('/').to_string();
        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(Error::BaseUrl(credentials.api_base_url.clone()));
        }
        let http = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self {
            http,
            base_url,
            access_token: credentials.access_token.clone(),
        })
    }

    /// `GET /api/v1/accounts/verify_credentials` — the bot's own account.
    pub async fn verify_credentials(&self) -> Result<Account> {
        self.execute(self.get("/api/v1/accounts/verify_credentials"))
            .await
    }

    /// `GET /api/v2/search`. With `resolve`, the instance fetches unknown
    /// remote URLs, which is what turns a toot permalink into a status.
    pub async fn search(&self, query: &str, resolve: bool) -> Result<SearchResults> {
        let request = self
            .get("/api/v2/search")
            .query(&[("q", query), ("resolve", bool_param(resolve))]);
        self.execute(request).await
    }

    /// Resolve a toot URL (or any search query) to its first status hit.
    pub async fn resolve_status(&self, query: &str) -> Result<Option<Status>> {
        let results = self.search(query, true).await?;
        Ok(results.statuses.into_iter().next())
    }

    /// `POST /api/v1/statuses`.
    pub async fn post_status(&self, text: &str, in_reply_to_id: Option<&str>) -> Result<Status> {
        #[derive(Serialize)]
        struct NewStatus<'a> {
            status: &'a str,
            #[serde(skip_serializing_if = "Option::is_none")]
            in_reply_to_id: Option<&'a str>,
        }

        let request = self.post("/api/v1/statuses").json(&NewStatus {
            status: text,
            in_reply_to_id,
        });
        self.execute(request).await
    }

    pub async fn favourite(&self, id: &str) -> Result<Status> {
        self.execute(self.post(&format!("/api/v1/statuses/{id}/favourite")))
            .await
    }

    pub async fn reblog(&self, id: &str) -> Result<Status> {
        self.execute(self.post(&format!("/api/v1/statuses/{id}/reblog")))
            .await
    }

    pub async fn delete_status(&self, id: &str) -> Result<()> {
        let request = self
            .http
            .delete(self.endpoint(&format!("/api/v1/statuses/{id}")))
            .bearer_auth(self.access_token.expose_secret());
        self.execute_ok(request).await
    }

    /// `GET /api/v1/accounts/search`. `following` restricts hits to
    /// accounts the bot already follows (used by unfollow).
    pub async fn search_accounts(&self, query: &str, following: bool) -> Result<Vec<Account>> {
        let request = self.get("/api/v1/accounts/search").query(&[
            ("q", query),
            ("resolve", "true"),
            ("following", bool_param(following)),
        ]);
        self.execute(request).await
    }

    pub async fn follow(&self, id: &str) -> Result<()> {
        self.execute_ok(self.post(&format!("/api/v1/accounts/{id}/follow")))
            .await
    }

    pub async fn unfollow(&self, id: &str) -> Result<()> {
        self.execute_ok(self.post(&format!("/api/v1/accounts/{id}/unfollow")))
            .await
    }

    pub(crate) fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.http
            .get(self.endpoint(path))
            .bearer_auth(self.access_token.expose_secret())
    }

    fn post(&self, path: &str) -> reqwest::RequestBuilder {
        self.http
            .post(self.endpoint(path))
            .bearer_auth(self.access_token.expose_secret())
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    async fn execute<T: DeserializeOwned>(&self, request: reqwest::RequestBuilder) -> Result<T> {
        let response = request.timeout(REQUEST_TIMEOUT).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(api_error(status, response).await);
        }
        Ok(response.json().await?)
    }

    async fn execute_ok(&self, request: reqwest::RequestBuilder) -> Result<()> {
        let response = request.timeout(REQUEST_TIMEOUT).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(api_error(status, response).await);
        }
        Ok(())
    }
}

pub(crate) async fn api_error(status: reqwest::StatusCode, response: reqwest::Response) -> Error {
    #[derive(Deserialize)]
    struct ApiErrorBody {
        error: String,
    }

    let message = match response.json::<ApiErrorBody>().await {
        Ok(body) => body.error,
        Err(_) => status
            .canonical_reason()
            .unwrap_or("unknown error")
            .to_string(),
    };
    Error::Api {
        status: status.as_u16(),
        message,
    }
}

fn bool_param(value: bool) -> &'static str {
    if value { "true" } else { "false" }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use {super::*, mockito::Matcher};

    fn test_client(server: &mockito::ServerGuard) -> Client {
        Client::new(&Credentials {
            client_id: "cid".into(),
            client_secret: Secret::new("csecret".into()),
            access_token: Secret::new("tok".into()),
            api_base_url: server.url(),
        })
        .unwrap()
    }

    const ACCOUNT_JSON: &str = r#"{"id":"1","acct":"bot","url":"https://m.example/@bot"}"#;

    fn status_json(id: &str) -> String {
        format!(
            r#"{{"id":"{id}","url":"https://m.example/@bot/{id}",
                 "uri":"https://m.example/users/bot/statuses/{id}",
                 "content":"<p>hi</p>",
                 "account":{ACCOUNT_JSON}}}"#
        )
    }

    #[test]
    fn rejects_non_http_base_url() {
        let result = Client::new(&Credentials {
            client_id: String::new(),
            client_secret: Secret::new(String::new()),
            access_token: Secret::new(String::new()),
            api_base_url: "mastodon.example".into(),
        });
        assert!(matches!(result, Err(Error::BaseUrl(_))));
    }

    #[tokio::test]
    async fn verify_credentials_sends_bearer_token() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/api/v1/accounts/verify_credentials")
            .match_header("authorization", "Bearer tok")
            .with_body(ACCOUNT_JSON)
            .create_async()
            .await;

        let account = test_client(&server).verify_credentials().await.unwrap();
        assert_eq!(account.url, "https://m.example/@bot");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn search_passes_query_and_resolve() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/api/v2/search")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("q".into(), "https://m.example/@bot/7".into()),
                Matcher::UrlEncoded("resolve".into(), "true".into()),
            ]))
            .with_body(format!(r#"{{"statuses":[{}]}}"#, status_json("7")))
            .create_async()
            .await;

        let status = test_client(&server)
            .resolve_status("https://m.example/@bot/7")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(status.id, "7");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn resolve_status_empty_results_is_none() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/api/v2/search")
            .match_query(Matcher::Any)
            .with_body(r#"{"accounts":[],"statuses":[],"hashtags":[]}"#)
            .create_async()
            .await;

        let status = test_client(&server).resolve_status("nothing").await.unwrap();
        assert!(status.is_none());
    }

    #[tokio::test]
    async fn post_status_serializes_reply_id() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/v1/statuses")
            .match_body(Matcher::Json(serde_json::json!({
                "status": "@alice ja!",
                "in_reply_to_id": "41"
            })))
            .with_body(status_json("42"))
            .create_async()
            .await;

        let status = test_client(&server)
            .post_status("@alice ja!", Some("41"))
            .await
            .unwrap();
        assert_eq!(status.link(), "https://m.example/@bot/42");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn post_status_omits_reply_id_when_absent() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/v1/statuses")
            .match_body(Matcher::Json(serde_json::json!({"status": "moin"})))
            .with_body(status_json("43"))
            .create_async()
            .await;

        test_client(&server).post_status("moin", None).await.unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn api_error_body_becomes_api_variant() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/api/v1/statuses/9/favourite")
            .with_status(422)
            .with_body(r#"{"error":"Validation failed"}"#)
            .create_async()
            .await;

        let err = test_client(&server).favourite("9").await.unwrap_err();
        match err {
            Error::Api { status, message } => {
                assert_eq!(status, 422);
                assert_eq!(message, "Validation failed");
            },
            other => panic!("expected Api error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn api_error_without_body_uses_canonical_reason() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("DELETE", "/api/v1/statuses/9")
            .with_status(404)
            .create_async()
            .await;

        let err = test_client(&server).delete_status("9").await.unwrap_err();
        match err {
            Error::Api { status, message } => {
                assert_eq!(status, 404);
                assert_eq!(message, "Not Found");
            },
            other => panic!("expected Api error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn unfollow_searches_with_following_filter() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/api/v1/accounts/search")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("q".into(), "@alice@m.example".into()),
                Matcher::UrlEncoded("following".into(), "true".into()),
            ]))
            .with_body(format!("[{ACCOUNT_JSON}]"))
            .create_async()
            .await;

        let accounts = test_client(&server)
            .search_accounts("@alice@m.example", true)
            .await
            .unwrap();
        assert_eq!(accounts.len(), 1);
        mock.assert_async().await;
    }
}
