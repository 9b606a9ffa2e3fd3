//! Inbound-event interceptor composition.
//!
//! Middleware wrap the terminal handler with the same input/output contract,
//! so composition is transparent to the terminal consumer. The chain is
//! folded into a single handler once at connection-start time, not per
//! event.

use std::{future::Future, pin::Pin, sync::Arc};

use botgate_common::types::InboundMessage;

use crate::error::Result;

/// Boxed future returned by inbound handlers.
pub type InboundFuture = Pin<Box<dyn Future<Output = Result<()>> + Send>>;

/// Handler for one normalized inbound event.
pub type InboundHandler = Arc<dyn Fn(InboundMessage) -> InboundFuture + Send + Sync>;

/// An interceptor wrapping an [`InboundHandler`] with an identical contract.
pub type Middleware = Arc<dyn Fn(InboundHandler) -> InboundHandler + Send + Sync>;

/// Build an [`InboundHandler`] from an async closure.
pub fn handler_fn<F, Fut>(f: F) -> InboundHandler
where
    F: Fn(InboundMessage) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<()>> + Send + 'static,
{
    Arc::new(move |message| Box::pin(f(message)))
}

/// Fold the middleware list right-to-left around `terminal`.
///
/// The first middleware in the list becomes the outermost wrapper: it is the
/// first to observe and the last to finish processing each inbound event.
pub fn compose(middlewares: &[Middleware], terminal: InboundHandler) -> InboundHandler {
    middlewares
        .iter()
        .rev()
        .fold(terminal, |next, middleware| middleware(next))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    fn tracing_middleware(label: &'static str, log: Arc<Mutex<Vec<String>>>) -> Middleware {
        Arc::new(move |next: InboundHandler| {
            let log = Arc::clone(&log);
            Arc::new(move |message: InboundMessage| {
                let log = Arc::clone(&log);
                let next = Arc::clone(&next);
                Box::pin(async move {
                    log.lock().unwrap().push(format!("{label}:before"));
                    let result = next(message).await;
                    log.lock().unwrap().push(format!("{label}:after"));
                    result
                })
            })
        })
    }

    fn message() -> InboundMessage {
        InboundMessage::new("test", "c1", "b1", "peer", "chat", "hello")
    }

    #[tokio::test]
    async fn first_registered_is_outermost() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let terminal = {
            let log = Arc::clone(&log);
            handler_fn(move |_| {
                let log = Arc::clone(&log);
                async move {
                    log.lock().unwrap().push("terminal".into());
                    Ok(())
                }
            })
        };

        let chain = [
            tracing_middleware("first", Arc::clone(&log)),
            tracing_middleware("second", Arc::clone(&log)),
        ];
        let handler = compose(&chain, terminal);
        handler(message()).await.unwrap();

        assert_eq!(
            *log.lock().unwrap(),
            vec![
                "first:before",
                "second:before",
                "terminal",
                "second:after",
                "first:after"
            ]
        );
    }

    #[tokio::test]
    async fn empty_chain_is_terminal() {
        let hit = Arc::new(Mutex::new(0));
        let terminal = {
            let hit = Arc::clone(&hit);
            handler_fn(move |_| {
                let hit = Arc::clone(&hit);
                async move {
                    *hit.lock().unwrap() += 1;
                    Ok(())
                }
            })
        };
        let handler = compose(&[], terminal);
        handler(message()).await.unwrap();
        assert_eq!(*hit.lock().unwrap(), 1);
    }

    #[tokio::test]
    async fn middleware_can_short_circuit() {
        let gate: Middleware = Arc::new(|_next: InboundHandler| {
            Arc::new(|_message: InboundMessage| {
                Box::pin(async { Err(crate::Error::invalid_input("dropped")) }) as InboundFuture
            })
        });

        let terminal = handler_fn(|_| async { panic!("terminal must not run") });
        let handler = compose(&[gate], terminal);
        assert!(handler(message()).await.is_err());
    }
}
