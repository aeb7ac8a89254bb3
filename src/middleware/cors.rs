//! CORS policy for browser clients.
//!
//! Note:
//! - CORS is enforced by browsers. Native apps and server-to-server calls are
//!   not restricted by it.
//! - Applied at the Router level, inside telemetry so preflights are still
//!   logged and counted.
//!
//! Policy:
//! - Wildcard origin → `Access-Control-Allow-Origin: *`.
//! - Otherwise the request `Origin` is echoed back only on an exact allow-list
//!   match; a non-matching origin gets no allow-origin header but the request
//!   still proceeds.
//! - `OPTIONS` is answered here with `200` and an empty body.

use std::{
    sync::{Arc, LazyLock, OnceLock},
    time::Duration,
};

use axum::{
    body::Body,
    extract::Request,
    http::{
        HeaderMap, HeaderName, HeaderValue, Method, StatusCode,
        header::{self, ORIGIN},
    },
    response::Response,
};
use tracing::{debug, warn};

use crate::middleware::chain::{BoxFuture, Interceptor, Next};
use crate::middleware::recorder::{MatchedRoute, PREFLIGHT_ROUTE};

const WILDCARD: &str = "*";

static DEFAULT_POLICY: LazyLock<CorsPolicy> = LazyLock::new(CorsPolicy::default);

/// Raw CORS configuration as read from the environment.
///
/// Empty lists mean "use the default for this field".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
    pub allowed_methods: Vec<String>,
    pub allowed_headers: Vec<String>,
    pub credentials: bool,
    pub max_age: Option<Duration>,
}

/// Validated policy applied to every response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorsPolicy {
    origins: Vec<String>,
    methods: Vec<Method>,
    headers: Vec<HeaderName>,
    credentials: bool,
    max_age: Option<Duration>,
}

impl Default for CorsPolicy {
    fn default() -> Self {
        Self {
            origins: vec![WILDCARD.to_owned()],
            methods: default_methods(),
            headers: default_headers(),
            credentials: false,
            max_age: None,
        }
    }
}

fn default_methods() -> Vec<Method> {
    vec![
        Method::GET,
        Method::POST,
        Method::PUT,
        Method::DELETE,
        Method::OPTIONS,
    ]
}

fn default_headers() -> Vec<HeaderName> {
    vec![header::CONTENT_TYPE, header::AUTHORIZATION]
}

impl CorsPolicy {
    /// Validate a configuration, falling back to defaults field by field.
    ///
    /// - empty origins / methods / headers → default list
    /// - `OPTIONS` is appended to the methods when missing
    /// - method tokens or header names that do not parse are dropped
    pub fn from_config(config: &CorsConfig) -> Self {
        let origins = if config.allowed_origins.is_empty() {
            vec![WILDCARD.to_owned()]
        } else {
            config.allowed_origins.clone()
        };

        let methods = if config.allowed_methods.is_empty() {
            default_methods()
        } else {
            let mut methods: Vec<Method> = config
                .allowed_methods
                .iter()
                .filter_map(|raw| match parse_method(raw) {
                    Some(m) => Some(m),
                    None => {
                        warn!(method = %raw, "dropping invalid CORS method");
                        None
                    }
                })
                .collect();
            if !methods.contains(&Method::OPTIONS) {
                methods.push(Method::OPTIONS);
            }
            methods
        };

        let headers = if config.allowed_headers.is_empty() {
            default_headers()
        } else {
            let headers: Vec<HeaderName> = config
                .allowed_headers
                .iter()
                .filter_map(|raw| match HeaderName::from_bytes(raw.trim().as_bytes()) {
                    Ok(h) => Some(h),
                    Err(_) => {
                        warn!(header = %raw, "dropping invalid CORS header");
                        None
                    }
                })
                .collect();
            if headers.is_empty() {
                default_headers()
            } else {
                headers
            }
        };

        Self {
            origins,
            methods,
            headers,
            credentials: config.credentials,
            max_age: config.max_age,
        }
    }

    pub fn allows_any_origin(&self) -> bool {
        self.origins.iter().any(|o| o == WILDCARD)
    }

    pub fn methods(&self) -> &[Method] {
        &self.methods
    }

    pub fn headers(&self) -> &[HeaderName] {
        &self.headers
    }

    /// Write the CORS response headers for a request carrying `origin`.
    pub fn apply(&self, origin: Option<&HeaderValue>, headers: &mut HeaderMap) {
        if self.allows_any_origin() {
            headers.insert(
                header::ACCESS_CONTROL_ALLOW_ORIGIN,
                HeaderValue::from_static(WILDCARD),
            );
        } else if let Some(origin) = origin
            && self.origins.iter().any(|o| o.as_bytes() == origin.as_bytes())
        {
            headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, origin.clone());
        }

        let methods = self
            .methods
            .iter()
            .map(Method::as_str)
            .collect::<Vec<_>>()
            .join(", ");
        if let Ok(v) = HeaderValue::from_str(&methods) {
            headers.insert(header::ACCESS_CONTROL_ALLOW_METHODS, v);
        }

        let allowed = self
            .headers
            .iter()
            .map(display_header)
            .collect::<Vec<_>>()
            .join(", ");
        if let Ok(v) = HeaderValue::from_str(&allowed) {
            headers.insert(header::ACCESS_CONTROL_ALLOW_HEADERS, v);
        }

        if self.credentials {
            headers.insert(
                header::ACCESS_CONTROL_ALLOW_CREDENTIALS,
                HeaderValue::from_static("true"),
            );
        }

        if let Some(max_age) = self.max_age {
            headers.insert(
                header::ACCESS_CONTROL_MAX_AGE,
                HeaderValue::from(max_age.as_secs()),
            );
        }
    }
}

fn parse_method(raw: &str) -> Option<Method> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    Method::from_bytes(raw.to_ascii_uppercase().as_bytes()).ok()
}

// HeaderName is always lowercase; keep the canonical spelling for the defaults.
fn display_header(name: &HeaderName) -> &str {
    if *name == header::CONTENT_TYPE {
        "Content-Type"
    } else if *name == header::AUTHORIZATION {
        "Authorization"
    } else {
        name.as_str()
    }
}

/// Set-once holder for the effective policy.
///
/// Built at startup and shared with the [`Cors`] interceptor. The first
/// successful `configure` wins, later calls (concurrent ones included) are
/// ignored. Until configured, the default policy applies.
#[derive(Debug, Default)]
pub struct CorsSettings {
    policy: OnceLock<CorsPolicy>,
}

impl CorsSettings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install `config`. Returns `false` if a policy was already installed.
    pub fn configure(&self, config: CorsConfig) -> bool {
        let mut installed = false;
        self.policy.get_or_init(|| {
            installed = true;
            CorsPolicy::from_config(&config)
        });
        if !installed {
            debug!("CORS already configured; ignoring new configuration");
        }
        installed
    }

    pub fn policy(&self) -> &CorsPolicy {
        self.policy.get().unwrap_or(&DEFAULT_POLICY)
    }
}

#[derive(Debug, Clone)]
pub struct Cors {
    settings: Arc<CorsSettings>,
}

impl Cors {
    pub fn new(settings: Arc<CorsSettings>) -> Self {
        Self { settings }
    }
}

impl Interceptor for Cors {
    fn intercept<'a>(&'a self, req: Request, next: Next<'a>) -> BoxFuture<'a, Response> {
        Box::pin(async move {
            let policy = self.settings.policy();
            let origin = req.headers().get(ORIGIN).cloned();

            let mut response = if *req.method() == Method::OPTIONS {
                let mut preflight = Response::new(Body::empty());
                *preflight.status_mut() = StatusCode::OK;
                preflight
                    .extensions_mut()
                    .insert(MatchedRoute::new(PREFLIGHT_ROUTE));
                preflight
            } else {
                next.run(req).await
            };

            policy.apply(origin.as_ref(), response.headers_mut());
            response
        })
    }
}
