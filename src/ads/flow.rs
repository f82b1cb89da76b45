use super::auth::OAuthFlow;
use super::types::{Credential, OAuthClient, TokenGrant};
use crate::error::{AppError, Result};
use async_trait::async_trait;
use chrono::Utc;
use oauth2::{
    AuthUrl, AuthorizationCode, Client, ClientId, ClientSecret, CsrfToken, EndpointNotSet,
    EndpointSet, PkceCodeChallenge, RedirectUrl, RefreshToken, RequestTokenError, Scope,
    StandardRevocableToken, TokenResponse, TokenUrl,
    basic::{
        BasicClient, BasicErrorResponse, BasicRevocationErrorResponse,
        BasicTokenIntrospectionResponse, BasicTokenResponse,
    },
};
use reqwest::redirect::Policy;
use std::collections::BTreeSet;
use tiny_http::{Response, Server};
use tracing::{debug, instrument};
use url::Url;

// Type alias for the client when Auth and Token URLs are set
type ConfiguredClient = Client<
    BasicErrorResponse,
    BasicTokenResponse,
    BasicTokenIntrospectionResponse,
    StandardRevocableToken,
    BasicRevocationErrorResponse,
    EndpointSet,    // HasAuthUrl
    EndpointNotSet, // HasDeviceAuthUrl
    EndpointNotSet, // HasIntrospectionUrl
    EndpointNotSet, // HasRevocationUrl
    EndpointSet,    // HasTokenUrl
>;

/// Installed-application flow: browser consent redirected to a loopback server
pub struct InstalledAppFlow {
    http_client: reqwest::Client,
}

impl InstalledAppFlow {
    pub fn new() -> Result<Self> {
        let http_client = reqwest::ClientBuilder::new()
            .redirect(Policy::none())
            .build()
            .map_err(|e| AppError::Auth(format!("Failed to build reqwest client: {}", e)))?;

        Ok(Self { http_client })
    }

    fn oauth_client(client: &OAuthClient) -> Result<ConfiguredClient> {
        let auth_url = AuthUrl::new(client.auth_uri.clone())
            .map_err(|e| AppError::Auth(format!("Invalid auth URL: {}", e)))?;
        let token_url = TokenUrl::new(client.token_uri.clone())
            .map_err(|e| AppError::Auth(format!("Invalid token URL: {}", e)))?;

        Ok(BasicClient::new(ClientId::new(client.client_id.clone()))
            .set_client_secret(ClientSecret::new(client.client_secret.clone()))
            .set_auth_uri(auth_url)
            .set_token_uri(token_url))
    }
}

#[async_trait]
impl OAuthFlow for InstalledAppFlow {
    #[instrument(name = "Authorizing with Google", skip_all)]
    async fn authorize(&self, client: &OAuthClient, scopes: &[&str]) -> Result<Credential> {
        // Ephemeral port, Google accepts any loopback port for installed apps
        let server = Server::http("127.0.0.1:0")
            .map_err(|e| AppError::Auth(format!("Failed to start callback server: {}", e)))?;
        let port = server
            .server_addr()
            .to_ip()
            .map(|addr| addr.port())
            .ok_or_else(|| AppError::Auth("Callback server has no TCP address".to_string()))?;
        let redirect_url = format!("http://localhost:{}/", port);

        let oauth_client = Self::oauth_client(client)?.set_redirect_uri(
            RedirectUrl::new(redirect_url)
                .map_err(|e| AppError::Auth(format!("Invalid redirect URL: {}", e)))?,
        );

        let (pkce_challenge, pkce_verifier) = PkceCodeChallenge::new_random_sha256();
        let (auth_url, csrf_token) = oauth_client
            .authorize_url(CsrfToken::new_random)
            .add_scopes(scopes.iter().map(|s| Scope::new(s.to_string())))
            .set_pkce_challenge(pkce_challenge)
            // Google only issues a refresh token for offline access with fresh consent
            .add_extra_param("access_type", "offline")
            .add_extra_param("prompt", "consent")
            .url();

        println!("Open this URL in your browser:\n{}", auth_url);
        println!();
        println!("Waiting for authorization...");

        let code = wait_for_code(server, port, &csrf_token)?;

        let token_result = oauth_client
            .exchange_code(AuthorizationCode::new(code))
            .set_pkce_verifier(pkce_verifier)
            .request_async(&self.http_client)
            .await
            .map_err(|e| AppError::Auth(format!("Failed to exchange code: {:?}", e)))?;

        // The endpoint may narrow the granted scopes; otherwise assume what was asked
        let granted: BTreeSet<String> = match token_result.scopes() {
            Some(granted) => granted.iter().map(|s| s.as_str().to_owned()).collect(),
            None => scopes.iter().map(|s| s.to_string()).collect(),
        };

        debug!("Authorization code exchanged for tokens");

        Ok(Credential::from_grant(
            client,
            granted,
            token_grant(&token_result),
            Utc::now(),
        ))
    }

    #[instrument(name = "Refreshing Google access token", skip_all)]
    async fn refresh(&self, credential: &Credential) -> Result<TokenGrant> {
        let refresh_token = credential
            .refresh_token
            .clone()
            .ok_or_else(|| AppError::Refresh("No refresh token".to_string()))?;

        let token_result = Self::oauth_client(&credential.oauth_client())?
            .exchange_refresh_token(&RefreshToken::new(refresh_token))
            .request_async(&self.http_client)
            .await
            .map_err(refresh_error)?;

        Ok(token_grant(&token_result))
    }
}

/// Only an error response from the token endpoint (typically `invalid_grant`)
/// means the refresh token is dead; transport and parse failures are not.
fn refresh_error<RE>(e: RequestTokenError<RE, BasicErrorResponse>) -> AppError
where
    RE: std::error::Error + 'static,
{
    match e {
        RequestTokenError::ServerResponse(response) => AppError::Refresh(response.to_string()),
        other => AppError::Auth(format!("Token refresh request failed: {}", other)),
    }
}

/// Block until the browser is redirected back, then validate the callback
fn wait_for_code(server: Server, port: u16, csrf_token: &CsrfToken) -> Result<String> {
    let request = server
        .recv()
        .map_err(|e| AppError::Auth(format!("Failed to receive request: {}", e)))?;

    let callback_url = format!("http://localhost:{}{}", port, request.url());
    let url = Url::parse(&callback_url)
        .map_err(|e| AppError::Auth(format!("Failed to parse callback URL: {}", e)))?;

    let param = |name: &str| {
        url.query_pairs()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.into_owned())
    };

    if let Some(error) = param("error") {
        let _ = request.respond(Response::from_string(
            "Authorization was not granted. You can close this window.",
        ));
        return Err(AppError::Auth(format!("Authorization denied: {}", error)));
    }

    let code = param("code").ok_or_else(|| AppError::Auth("No code in callback".to_string()))?;
    let state = param("state").ok_or_else(|| AppError::Auth("No state in callback".to_string()))?;

    if &state != csrf_token.secret() {
        return Err(AppError::Auth("CSRF token mismatch".to_string()));
    }

    let response = Response::from_string("Authentication successful! You can close this window.");
    request
        .respond(response)
        .map_err(|e| AppError::Auth(format!("Failed to send response: {}", e)))?;

    Ok(code)
}

fn token_grant(token_result: &BasicTokenResponse) -> TokenGrant {
    TokenGrant {
        access_token: token_result.access_token().secret().clone(),
        refresh_token: token_result
            .refresh_token()
            .map(|token| token.secret().clone()),
        expires_in_secs: token_result.expires_in().map(|d| d.as_secs() as i64),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use oauth2::basic::{BasicErrorResponseType, BasicTokenType};
    use oauth2::{AccessToken, EmptyExtraTokenFields, StandardTokenResponse};
    use std::io::{Read, Write};
    use std::net::TcpStream;
    use std::thread;
    use std::time::Duration;

    fn callback(query: &str) -> (Result<String>, String) {
        let server = Server::http("127.0.0.1:0").unwrap();
        let port = server.server_addr().to_ip().unwrap().port();
        let csrf_token = CsrfToken::new("expected-state".to_string());

        let request = format!(
            "GET /?{} HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n",
            query
        );
        let browser = thread::spawn(move || {
            let mut stream = TcpStream::connect(("127.0.0.1", port)).unwrap();
            stream.write_all(request.as_bytes()).unwrap();
            let mut body = String::new();
            let _ = stream.read_to_string(&mut body);
            body
        });

        let result = wait_for_code(server, port, &csrf_token);
        (result, browser.join().unwrap())
    }

    #[test]
    fn test_wait_for_code_accepts_matching_state() {
        let (result, body) = callback("state=expected-state&code=4%2Fabc&scope=adwords");

        assert_eq!(result.unwrap(), "4/abc");
        assert!(body.contains("Authentication successful"));
    }

    #[test]
    fn test_wait_for_code_rejects_csrf_mismatch() {
        let (result, _) = callback("state=forged&code=abc");
        assert!(matches!(result, Err(AppError::Auth(msg)) if msg.contains("CSRF")));
    }

    #[test]
    fn test_wait_for_code_reports_denied_consent() {
        let (result, body) = callback("error=access_denied&state=expected-state");

        assert!(matches!(result, Err(AppError::Auth(msg)) if msg.contains("access_denied")));
        assert!(body.contains("not granted"));
    }

    #[test]
    fn test_refresh_error_classification() {
        let rejected: RequestTokenError<std::io::Error, BasicErrorResponse> =
            RequestTokenError::ServerResponse(BasicErrorResponse::new(
                BasicErrorResponseType::InvalidGrant,
                Some("Token has been expired or revoked.".to_string()),
                None,
            ));
        assert!(
            matches!(refresh_error(rejected), AppError::Refresh(msg) if msg.contains("invalid_grant"))
        );

        let unreachable: RequestTokenError<std::io::Error, BasicErrorResponse> =
            RequestTokenError::Request(std::io::Error::other("connection refused"));
        assert!(matches!(refresh_error(unreachable), AppError::Auth(_)));
    }

    #[test]
    fn test_token_grant_from_response() {
        let mut response = StandardTokenResponse::new(
            AccessToken::new("ya29.access".to_string()),
            BasicTokenType::Bearer,
            EmptyExtraTokenFields {},
        );
        response.set_refresh_token(Some(RefreshToken::new("1//refresh".to_string())));
        response.set_expires_in(Some(&Duration::from_secs(3599)));

        let grant = token_grant(&response);

        assert_eq!(grant.access_token, "ya29.access");
        assert_eq!(grant.refresh_token.as_deref(), Some("1//refresh"));
        assert_eq!(grant.expires_in_secs, Some(3599));
    }
}
