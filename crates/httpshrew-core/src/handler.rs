//! Handler capability and the process-wide handler registry

use crate::recorder::ResponseRecorder;
use http::Request;
use parking_lot::RwLock;
use std::sync::Arc;

/// Request handler invoked by the dispatcher's workers.
///
/// Handlers run concurrently on every worker, so implementations must be
/// `Send + Sync`. Failures are the handler's own business to turn into a
/// response (for example by writing a 4xx/5xx status).
pub trait Handler: Send + Sync {
    fn serve(&self, request: Request<Vec<u8>>, response: &mut ResponseRecorder);
}

impl<F> Handler for F
where
    F: Fn(Request<Vec<u8>>, &mut ResponseRecorder) + Send + Sync,
{
    fn serve(&self, request: Request<Vec<u8>>, response: &mut ResponseRecorder) {
        self(request, response)
    }
}

/// Holds the single registered handler.
///
/// Expected to be set once during initialization and read by every worker
/// afterwards. Setting it again replaces the previous handler.
#[derive(Default)]
pub struct HandlerRegistry {
    handler: RwLock<Option<Arc<dyn Handler>>>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set<H: Handler + 'static>(&self, handler: H) {
        self.set_arc(Arc::new(handler));
    }

    pub fn set_arc(&self, handler: Arc<dyn Handler>) {
        let previous = self.handler.write().replace(handler);
        if previous.is_some() {
            log::warn!("request handler registered more than once, replacing previous handler");
        } else {
            log::debug!("request handler registered");
        }
    }

    pub fn get(&self) -> Option<Arc<dyn Handler>> {
        self.handler.read().clone()
    }

    pub fn is_set(&self) -> bool {
        self.handler.read().is_some()
    }
}

impl std::fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandlerRegistry")
            .field("is_set", &self.is_set())
            .finish()
    }
}
