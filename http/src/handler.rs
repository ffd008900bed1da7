use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::request::HttpRequest;
use crate::response::HttpResponse;

pub type HandlerFuture = Pin<Box<dyn Future<Output = HttpResponse> + Send + 'static>>;

/// Handler function type
///
/// Turns a parsed request into a response. Use [`handler_fn`] to build one
/// from an `async fn` or a closure returning a future.
///
/// # Examples
///
/// ```rust
/// use http::handler::{HandlerFn, handler_fn};
/// use http::request::HttpRequest;
/// use http::response::HttpResponse;
///
/// async fn example_handler(_req: HttpRequest) -> HttpResponse {
///     HttpResponse::new(200, "OK").with_body("Hello, world!".into())
/// }
///
/// let handler: HandlerFn = handler_fn(example_handler);
/// ```
pub type HandlerFn = Arc<dyn Fn(HttpRequest) -> HandlerFuture + Send + Sync + 'static>;

/// Box an async function into a [`HandlerFn`]
pub fn handler_fn<F, Fut>(f: F) -> HandlerFn
where
    F: Fn(HttpRequest) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = HttpResponse> + Send + 'static,
{
    Arc::new(move |req| Box::pin(f(req)))
}

/// Response layer
///
/// Runs on every outgoing response after the handler, in registration order.
pub type LayerFn = Arc<dyn Fn(&mut HttpResponse) + Send + Sync + 'static>;
