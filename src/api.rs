//! HTTP collaborator. Thin JSON-over-fetch calls with a fixed transport
//! timeout; every response is decoded into the uniform envelope and
//! callers branch on `status` alone. Transport failures are surfaced as
//! [`ApiError`] and logged through one shared handler.

use std::fmt;

use gloo::timers::callback::Timeout;
use serde::de::DeserializeOwned;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{AbortController, Request, RequestInit, Response};

use capsulejar_core::form::CheckField;
use capsulejar_core::{
    CapsuleDetail, Envelope, Jar, LoginData, LoginForm, SignupForm, User, WritePayload,
};

const REQUEST_TIMEOUT_MS: u32 = 3_000;

const PATH_USER: &str = "user";
const PATH_USER_LOGIN: &str = "user/login";
const PATH_USER_CHECK: &str = "user/check";
const PATH_JAR: &str = "jar";

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum ApiError {
    Timeout,
    Network(String),
    Decode(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Timeout => write!(f, "request timed out"),
            ApiError::Network(detail) => write!(f, "network failure: {detail}"),
            ApiError::Decode(detail) => write!(f, "invalid response payload: {detail}"),
        }
    }
}

impl std::error::Error for ApiError {}

pub(crate) fn default_base_url() -> String {
    if let Some(raw) =
        option_env!("CAPSULEJAR_SERVER_URL").or(option_env!("TRUNK_PUBLIC_SERVER_URL"))
    {
        let trimmed = raw.trim().trim_end_matches('/');
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }
    let origin = web_sys::window()
        .and_then(|window| window.location().origin().ok())
        .unwrap_or_default();
    format!("{origin}/api")
}

fn js_err(err: JsValue) -> String {
    err.as_string().unwrap_or_else(|| format!("{err:?}"))
}

fn is_abort_error(err: &JsValue) -> bool {
    js_sys::Reflect::get(err, &JsValue::from_str("name"))
        .ok()
        .and_then(|name| name.as_string())
        .map(|name| name == "AbortError")
        .unwrap_or(false)
}

fn encode_query_value(value: &str) -> String {
    js_sys::encode_uri_component(value)
        .as_string()
        .unwrap_or_else(|| value.to_string())
}

fn handle_api_error(path: &str, err: &ApiError) {
    gloo::console::error!("API error", path.to_string(), err.to_string());
}

/// Built once at boot. The bearer token is captured here and never
/// re-read; a login in the same session takes effect on the next reload.
pub(crate) struct ApiClient {
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    pub(crate) fn new(base_url: String, token: Option<String>) -> Self {
        Self { base_url, token }
    }

    async fn request(
        &self,
        method: &str,
        path: &str,
        body: Option<String>,
    ) -> Result<String, ApiError> {
        let result = self.request_inner(method, path, body).await;
        if let Err(err) = &result {
            handle_api_error(path, err);
        }
        result
    }

    async fn request_inner(
        &self,
        method: &str,
        path: &str,
        body: Option<String>,
    ) -> Result<String, ApiError> {
        let controller = AbortController::new().map_err(|err| ApiError::Network(js_err(err)))?;
        let signal = controller.signal();
        let timeout = Timeout::new(REQUEST_TIMEOUT_MS, move || controller.abort());

        let opts = RequestInit::new();
        opts.set_method(method);
        opts.set_signal(Some(&signal));
        if let Some(body) = body {
            opts.set_body(&JsValue::from_str(&body));
        }

        let url = format!("{}/{path}", self.base_url);
        let request = Request::new_with_str_and_init(&url, &opts)
            .map_err(|err| ApiError::Network(js_err(err)))?;
        let headers = request.headers();
        headers
            .set("Content-Type", "application/json")
            .map_err(|err| ApiError::Network(js_err(err)))?;
        if let Some(token) = &self.token {
            headers
                .set("Authorization", &format!("Bearer {token}"))
                .map_err(|err| ApiError::Network(js_err(err)))?;
        }

        let window = web_sys::window()
            .ok_or_else(|| ApiError::Network("no window".to_string()))?;
        let response = JsFuture::from(window.fetch_with_request(&request))
            .await
            .map_err(|err| {
                if is_abort_error(&err) {
                    ApiError::Timeout
                } else {
                    ApiError::Network(js_err(err))
                }
            })?;
        timeout.cancel();

        let response: Response = response
            .dyn_into()
            .map_err(|err| ApiError::Network(js_err(err)))?;
        let text = JsFuture::from(
            response
                .text()
                .map_err(|err| ApiError::Network(js_err(err)))?,
        )
        .await
        .map_err(|err| ApiError::Network(js_err(err)))?;
        text.as_string()
            .ok_or_else(|| ApiError::Decode("non-text response body".to_string()))
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<Envelope<T>, ApiError> {
        let text = self.request("GET", path, None).await?;
        decode_envelope(path, &text)
    }

    async fn post<T: DeserializeOwned>(
        &self,
        path: &str,
        body: &impl serde::Serialize,
    ) -> Result<Envelope<T>, ApiError> {
        let body = serde_json::to_string(body).map_err(|err| ApiError::Decode(err.to_string()))?;
        let text = self.request("POST", path, Some(body)).await?;
        decode_envelope(path, &text)
    }

    pub(crate) async fn signup(
        &self,
        form: &SignupForm,
    ) -> Result<Envelope<serde_json::Value>, ApiError> {
        self.post(PATH_USER, form).await
    }

    pub(crate) async fn login(&self, form: &LoginForm) -> Result<Envelope<LoginData>, ApiError> {
        self.post(PATH_USER_LOGIN, form).await
    }

    pub(crate) async fn check_duplicate(
        &self,
        field: CheckField,
        value: &str,
    ) -> Result<Envelope<serde_json::Value>, ApiError> {
        let path = format!(
            "{PATH_USER_CHECK}?{}={}",
            field.query_key(),
            encode_query_value(value)
        );
        self.get(&path).await
    }

    pub(crate) async fn current_user(&self) -> Result<Envelope<User>, ApiError> {
        self.get(PATH_USER).await
    }

    pub(crate) async fn jar_contents(&self, jar_id: &str) -> Result<Envelope<Jar>, ApiError> {
        self.get(&format!("{PATH_JAR}/{jar_id}")).await
    }

    pub(crate) async fn create_capsule(
        &self,
        jar_id: &str,
        payload: &WritePayload,
    ) -> Result<Envelope<serde_json::Value>, ApiError> {
        self.post(&format!("{PATH_JAR}/{jar_id}"), payload).await
    }

    pub(crate) async fn reply_capsule(
        &self,
        jar_id: &str,
        capsule_id: &str,
        payload: &WritePayload,
    ) -> Result<Envelope<serde_json::Value>, ApiError> {
        self.post(&format!("{PATH_JAR}/{jar_id}/{capsule_id}/reply"), payload)
            .await
    }

    pub(crate) async fn get_capsule(
        &self,
        jar_id: &str,
        capsule_id: &str,
    ) -> Result<Envelope<CapsuleDetail>, ApiError> {
        self.get(&format!("{PATH_JAR}/{jar_id}/{capsule_id}")).await
    }

    pub(crate) async fn random_capsule(
        &self,
        jar_id: &str,
    ) -> Result<Envelope<CapsuleDetail>, ApiError> {
        self.get(&format!("{PATH_JAR}/{jar_id}/random")).await
    }

    // Part of the collaborator surface; no view invokes it yet.
    #[allow(dead_code)]
    pub(crate) async fn reply_with_emoji(
        &self,
        jar_id: &str,
        capsule_id: &str,
        emoji: u32,
        dump_field: &str,
    ) -> Result<Envelope<serde_json::Value>, ApiError> {
        let body = serde_json::json!({ "emoji": emoji, "dumpField": dump_field });
        self.post(&format!("{PATH_JAR}/{jar_id}/{capsule_id}/reply/emoji"), &body)
            .await
    }
}

fn decode_envelope<T: DeserializeOwned>(path: &str, text: &str) -> Result<Envelope<T>, ApiError> {
    serde_json::from_str(text).map_err(|err| {
        let err = ApiError::Decode(err.to_string());
        handle_api_error(path, &err);
        err
    })
}
