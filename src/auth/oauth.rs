use anyhow::{Result, anyhow};
use log::{info, warn};
use oauth2::TokenResponse;
use oauth2::basic::BasicClient;
use oauth2::reqwest::http_client;
use oauth2::{
    AuthUrl, AuthorizationCode, ClientId, ClientSecret, CsrfToken, PkceCodeChallenge, RedirectUrl,
    RefreshToken, Scope, TokenUrl,
};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::{Duration, Instant};
use tiny_http::{Response, Server};
use url::Url;

const AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const CALLBACK_WAIT: Duration = Duration::from_secs(120);

/// Tokens returned by the oauth flow (in-memory)
pub struct Tokens {
    pub access_token: String,
    pub refresh_token: Option<String>,
    /// Scopes the provider reports as granted. `None` means "as requested".
    pub scopes: Option<Vec<String>>,
}

impl Tokens {
    fn from_response<T: TokenResponse<oauth2::basic::BasicTokenType>>(token: &T) -> Self {
        Self {
            access_token: token.access_token().secret().to_string(),
            refresh_token: token.refresh_token().map(|r| r.secret().to_string()),
            scopes: token
                .scopes()
                .map(|s| s.iter().map(|x| x.to_string()).collect()),
        }
    }

    /// True when every scope in `wanted` was granted.
    pub fn has_scopes(&self, wanted: &[&str]) -> bool {
        match &self.scopes {
            None => true,
            Some(granted) => wanted.iter().all(|w| granted.iter().any(|g| g == w)),
        }
    }
}

/// One interactive authorization request.
pub struct AuthRequest<'a> {
    pub client_id: &'a str,
    pub client_secret: Option<&'a str>,
    pub redirect_uri: &'a str,
    pub scopes: &'a [&'a str],
    /// Extra query parameters for the consent page (e.g. `login_hint`).
    pub extra_params: &'a [(&'a str, &'a str)],
}

fn client(client_id: &str, client_secret: Option<&str>) -> Result<BasicClient> {
    let client_id = ClientId::new(client_id.to_string());
    let client_secret = client_secret.map(|s| ClientSecret::new(s.to_string()));

    let auth_url = AuthUrl::new(AUTH_URL.to_string())?;
    let token_url = TokenUrl::new(TOKEN_URL.to_string())?;

    Ok(BasicClient::new(
        client_id,
        client_secret,
        auth_url,
        Some(token_url),
    ))
}

/// Exchange a refresh token for a new access token using the oauth2 crate
pub fn refresh_access_token(
    client_id: &str,
    client_secret: Option<&str>,
    refresh_token: &str,
) -> Result<Tokens> {
    let oauth_client = client(client_id, client_secret)?;

    let rt = RefreshToken::new(refresh_token.to_string());
    let token = oauth_client
        .exchange_refresh_token(&rt)
        .request(http_client)?;

    Ok(Tokens::from_response(&token))
}

/// Parse the loopback redirect so the bind address matches it exactly.
fn callback_addr(redirect_uri: &str) -> Result<(String, u16, SocketAddr)> {
    let redirect = Url::parse(redirect_uri)
        .map_err(|e| anyhow!("Invalid redirect_uri '{redirect_uri}': {e}"))?;

    let host = redirect
        .host_str()
        .ok_or_else(|| anyhow!("redirect_uri missing host: {redirect_uri}"))?
        .to_string();

    let port = redirect
        .port_or_known_default()
        .ok_or_else(|| anyhow!("redirect_uri missing/unknown port: {redirect_uri}"))?;

    let bind_ip: IpAddr = match host.as_str() {
        "localhost" | "127.0.0.1" => IpAddr::V4(Ipv4Addr::LOCALHOST),
        other => other.parse::<IpAddr>().map_err(|_| {
            anyhow!("redirect_uri host must be localhost/127.0.0.1 or an IP: {other}")
        })?,
    };

    Ok((host, port, SocketAddr::new(bind_ip, port)))
}

/// Pull `code` out of a redirect request path, checking `state`.
fn code_from_callback(
    host: &str,
    port: u16,
    path_and_query: &str,
    expected_state: &str,
) -> Result<Option<String>> {
    let full = format!("http://{host}:{port}{path_and_query}");
    let parsed = Url::parse(&full).map_err(|e| anyhow!("Bad redirect: {e}"))?;

    let mut code = None;
    let mut state = None;
    for (k, v) in parsed.query_pairs() {
        match k.as_ref() {
            "code" => code = Some(v.into_owned()),
            "state" => state = Some(v.into_owned()),
            "error" => return Err(anyhow!("Authorization denied: {v}")),
            _ => {}
        }
    }

    if code.is_none() {
        return Ok(None);
    }
    if state.as_deref() != Some(expected_state) {
        return Err(anyhow!("OAuth state mismatch"));
    }
    Ok(code)
}

/// Perform Authorization Code + PKCE flow. Opens system browser and captures code via tiny server.
pub fn perform_pkce_flow(req: &AuthRequest<'_>) -> Result<Tokens> {
    let (host, port, bind_addr) = callback_addr(req.redirect_uri)?;

    // Listen before the browser can redirect to us.
    let server = Server::http(bind_addr)
        .map_err(|e| anyhow!("Failed to bind OAuth callback server on {bind_addr}: {e:?}"))?;

    let oauth_client = client(req.client_id, req.client_secret)?
        .set_redirect_uri(RedirectUrl::new(req.redirect_uri.to_string())?);

    let (pkce_challenge, pkce_verifier) = PkceCodeChallenge::new_random_sha256();

    let mut auth = oauth_client
        .authorize_url(CsrfToken::new_random)
        .add_scopes(req.scopes.iter().map(|s| Scope::new(s.to_string())))
        .set_pkce_challenge(pkce_challenge);
    for (k, v) in req.extra_params {
        auth = auth.add_extra_param(*k, *v);
    }
    let (auth_url, csrf_token) = auth.url();

    println!("Open this URL in your browser:\n{auth_url}");
    // best-effort: don't fail if browser can't be opened
    if let Err(e) = open::that(auth_url.as_str()) {
        warn!("could not open browser automatically: {e}");
    }

    let mut code_opt: Option<String> = None;
    let wait_until = Instant::now() + CALLBACK_WAIT;

    while Instant::now() < wait_until {
        let Ok(maybe_request) = server.recv_timeout(Duration::from_millis(500)) else {
            continue;
        };

        let Some(request) = maybe_request else {
            continue;
        };

        match code_from_callback(&host, port, request.url(), csrf_token.secret()) {
            Ok(Some(code)) => {
                code_opt = Some(code);
                let _ = request.respond(Response::from_string(
                    "Authorization received. You can close this tab.",
                ));
                break;
            }
            Ok(None) => {
                let _ = request.respond(Response::from_string(
                    "No code found in redirect. You can close this tab.",
                ));
            }
            Err(e) => {
                let _ = request.respond(Response::from_string(format!("{e}")));
                return Err(e);
            }
        }
    }

    let code = code_opt.ok_or_else(|| anyhow!("No code received within timeout"))?;

    let token = oauth_client
        .exchange_code(AuthorizationCode::new(code))
        .set_pkce_verifier(pkce_verifier)
        .request(http_client)
        .map_err(|e| anyhow!("Token exchange failed: {e}"))?;

    info!("authorization code exchanged");
    Ok(Tokens::from_response(&token))
}
