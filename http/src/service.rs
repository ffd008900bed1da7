use std::{fmt::Debug, sync::Arc};

use crate::{
    handler::{HandlerFn, LayerFn},
    request::HttpRequest,
    response::HttpResponse,
};

/// A handler plus the response layers wrapped around it.
///
/// Every response the server writes goes through [`HttpService::finish`],
/// including the ones it produces itself for unparsable requests.
#[must_use]
#[derive(Clone)]
pub struct HttpService {
    handler: HandlerFn,
    layers: Vec<LayerFn>,
}

impl HttpService {
    pub fn new(handler: HandlerFn) -> Self {
        HttpService {
            handler,
            layers: Vec::new(),
        }
    }

    /// Append a response layer
    pub fn layer<F>(mut self, layer: F) -> Self
    where
        F: Fn(&mut HttpResponse) + Send + Sync + 'static,
    {
        self.layers.push(Arc::new(layer));
        self
    }

    /// Run the handler, then the layers
    pub async fn call(&self, request: HttpRequest) -> HttpResponse {
        let mut response = self.handle(request).await;
        self.finish(&mut response);
        response
    }

    /// Run the handler only; the caller must [`finish`](Self::finish) the response
    pub async fn handle(&self, request: HttpRequest) -> HttpResponse {
        (self.handler)(request).await
    }

    /// Apply the layers to a response built outside the handler
    pub fn finish(&self, response: &mut HttpResponse) {
        for layer in &self.layers {
            layer(response);
        }
    }
}

impl Default for HttpService {
    fn default() -> Self {
        HttpService::new(crate::handler::handler_fn(|_req| async {
            HttpResponse::error(404, None)
        }))
    }
}

impl Debug for HttpService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpService")
            .field("handler", &"<dyn Fn>")
            .field("layers", &format!("{{ {} layer(s) }}", self.layers.len()))
            .finish()
    }
}
