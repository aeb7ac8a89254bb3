//! Interceptor chain.
//!
//! An [`Interceptor`] sees the request on the way in and the response on the
//! way out. A [`Chain`] is an ordered list of interceptors; applied to a
//! terminal service it produces a [`Pipeline`] where the first interceptor
//! added is the outermost one:
//!
//! ```text
//! Chain::new().with(a).with(b).layer(h)   ==   a(b(h))
//! ```
//!
//! `Chain` is a `tower::Layer`, so the same value can wrap a whole `Router`
//! (`router.layer(chain)`) or a single route (`get(h).route_layer(chain)`).

use std::{
    convert::Infallible,
    fmt,
    future::Future,
    pin::Pin,
    sync::Arc,
    task::{Context, Poll},
};

use axum::{extract::Request, response::Response};
use tower::{Layer, Service, ServiceExt, util::BoxCloneSyncService};

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

type Terminal = BoxCloneSyncService<Request, Response, Infallible>;

/// A single request/response stage.
///
/// Implementations either return a response of their own (short-circuit) or
/// hand the request to `next` and may post-process what comes back.
pub trait Interceptor: Send + Sync + 'static {
    fn intercept<'a>(&'a self, req: Request, next: Next<'a>) -> BoxFuture<'a, Response>;
}

/// The remainder of the chain after the current interceptor.
pub struct Next<'a> {
    rest: &'a [Arc<dyn Interceptor>],
    terminal: &'a Terminal,
}

impl<'a> Next<'a> {
    /// Run the remaining interceptors and then the terminal service.
    pub async fn run(self, req: Request) -> Response {
        match self.rest.split_first() {
            Some((head, rest)) => {
                let next = Next {
                    rest,
                    terminal: self.terminal,
                };
                head.intercept(req, next).await
            }
            None => match self.terminal.clone().oneshot(req).await {
                Ok(response) => response,
                Err(never) => match never {},
            },
        }
    }
}

/// Builder for an ordered list of interceptors.
#[derive(Clone, Default)]
pub struct Chain {
    interceptors: Vec<Arc<dyn Interceptor>>,
}

impl Chain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an interceptor. It runs inside every interceptor added before it.
    pub fn with<I: Interceptor>(mut self, interceptor: I) -> Self {
        self.interceptors.push(Arc::new(interceptor));
        self
    }

    pub fn len(&self) -> usize {
        self.interceptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.interceptors.is_empty()
    }
}

impl fmt::Debug for Chain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Chain")
            .field("interceptors", &self.interceptors.len())
            .finish()
    }
}

impl<S> Layer<S> for Chain
where
    S: Service<Request, Response = Response, Error = Infallible> + Clone + Send + Sync + 'static,
    S::Future: Send + 'static,
{
    type Service = Pipeline;

    fn layer(&self, inner: S) -> Self::Service {
        Pipeline {
            interceptors: self.interceptors.clone().into(),
            terminal: BoxCloneSyncService::new(inner),
        }
    }
}

/// A composed chain bound to its terminal service.
#[derive(Clone)]
pub struct Pipeline {
    interceptors: Arc<[Arc<dyn Interceptor>]>,
    terminal: Terminal,
}

impl Pipeline {
    pub async fn handle(&self, req: Request) -> Response {
        Next {
            rest: &self.interceptors,
            terminal: &self.terminal,
        }
        .run(req)
        .await
    }
}

impl fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline")
            .field("interceptors", &self.interceptors.len())
            .finish()
    }
}

impl Service<Request> for Pipeline {
    type Response = Response;
    type Error = Infallible;
    type Future = BoxFuture<'static, Result<Response, Infallible>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        // The terminal is driven through `oneshot` on a clone, which waits for readiness itself.
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: Request) -> Self::Future {
        let pipeline = self.clone();
        Box::pin(async move { Ok(pipeline.handle(req).await) })
    }
}
