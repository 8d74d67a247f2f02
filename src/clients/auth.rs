// src/clients/auth.rs
//
// Company/realm identity. Loaded once; everything else gates on it.

use serde::Deserialize;
use tracing::{debug, warn};

use crate::config::consts::API_BASE;
use crate::engine::Job;
use crate::net::{NetError, Transport};
use crate::state::AppState;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AuthData {
    pub company_id: Option<i64>,
    pub realm_id: Option<i32>,
}

#[derive(Deserialize)]
struct AuthResponse {
    #[serde(rename = "authCompany")]
    auth_company: Option<AuthCompany>,
}

#[derive(Deserialize)]
struct AuthCompany {
    #[serde(rename = "companyId")]
    company_id: Option<i64>,
    #[serde(rename = "realmId")]
    realm_id: Option<i32>,
}

fn url() -> String {
    format!("{API_BASE}/api/v3/companies/auth-data/")
}

/// Load-once guard: no-op while loading or after a successful load.
pub fn ensure(state: &mut AppState) -> Option<Job> {
    let auth = &mut state.auth;
    if auth.loaded || auth.loading {
        return None;
    }
    auth.loading = true;
    auth.error = None;
    Some(Job::Auth)
}

pub fn run(transport: &dyn Transport) -> Result<AuthData, NetError> {
    let body = transport.get(&url())?;
    let resp: AuthResponse =
        serde_json::from_str(&body).map_err(|e| NetError::Decode(e.to_string()))?;
    let company = resp.auth_company.unwrap_or(AuthCompany {
        company_id: None,
        realm_id: None,
    });
    Ok(AuthData {
        company_id: company.company_id,
        realm_id: company.realm_id,
    })
}

pub fn apply(state: &mut AppState, result: Result<AuthData, NetError>) {
    let auth = &mut state.auth;
    auth.loading = false;
    match result {
        Ok(data) => {
            auth.company_id = data.company_id;
            auth.realm_id = data.realm_id;
            auth.loaded = true;
            debug!(
                "Auth: resolved company={:?} realm={:?}",
                auth.company_id, auth.realm_id
            );
        }
        Err(e) => {
            // loaded stays false so a later attempt can retry
            auth.error = Some(e.to_string());
            warn!("Auth: load failed: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Canned(&'static str);
    impl Transport for Canned {
        fn get(&self, _url: &str) -> Result<String, NetError> {
            Ok(self.0.to_string())
        }
    }

    #[test]
    fn parses_auth_payload() {
        let t = Canned(r#"{"authCompany":{"companyId":42,"realmId":1}}"#);
        let data = run(&t).unwrap();
        assert_eq!(data.company_id, Some(42));
        assert_eq!(data.realm_id, Some(1));
    }

    #[test]
    fn missing_company_is_not_an_error() {
        let t = Canned(r#"{}"#);
        let data = run(&t).unwrap();
        assert_eq!(data, AuthData::default());
    }

    #[test]
    fn guard_is_idempotent_and_failure_allows_retry() {
        let mut state = AppState::new();
        assert!(ensure(&mut state).is_some());
        assert!(ensure(&mut state).is_none()); // in flight

        apply(&mut state, Err(NetError::Status(500)));
        assert!(!state.auth.loaded);
        assert_eq!(state.auth.error.as_deref(), Some("HTTP 500"));
        assert!(ensure(&mut state).is_some()); // retry possible

        apply(
            &mut state,
            Ok(AuthData { company_id: Some(7), realm_id: Some(0) }),
        );
        assert!(state.auth.loaded);
        assert!(ensure(&mut state).is_none());
    }
}
