//! Client-local persistence. The only durable state is the auth token,
//! read once at boot into the API client; a token written after login is
//! not picked up until the next full reload.

#[cfg(target_arch = "wasm32")]
const AUTH_TOKEN_KEY: &str = "capsulejar.auth";

#[cfg(target_arch = "wasm32")]
pub(crate) fn load_auth_token() -> Option<String> {
    let window = web_sys::window()?;
    let storage = window.local_storage().ok()??;
    storage
        .get_item(AUTH_TOKEN_KEY)
        .ok()
        .flatten()
        .filter(|token| !token.is_empty())
}

#[cfg(not(target_arch = "wasm32"))]
pub(crate) fn load_auth_token() -> Option<String> {
    None
}

#[cfg(target_arch = "wasm32")]
pub(crate) fn save_auth_token(token: &str) {
    let Some(window) = web_sys::window() else {
        return;
    };
    let Ok(Some(storage)) = window.local_storage() else {
        return;
    };
    let _ = storage.set_item(AUTH_TOKEN_KEY, token);
}

#[cfg(not(target_arch = "wasm32"))]
pub(crate) fn save_auth_token(_token: &str) {}
