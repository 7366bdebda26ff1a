//! Request routing.
//!
//! Each plugin enumerates the operations it exposes as a [`PluginMethod`] type
//! and builds a [`Router`] mapping those methods to handler functions once, at
//! construction. Routing is a table lookup on the descriptor's method name: a
//! miss is a [`PluginError::MethodNotRecognized`], never a panic.

use crate::error::{PluginError, Result};
use crate::host::{LogLevel, PluginLogger};
use crate::types::{HttpVerb, QueryParams, RequestDescriptor, RequestPayload};
use futures::future::BoxFuture;
use serde::Serialize;
use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;

/// The closed set of operation names a plugin exposes.
pub trait PluginMethod: Copy + Eq + Hash + Send + Sync + 'static {
    /// Every exposed operation, in declaration order.
    const ALL: &'static [Self];

    /// Name the operation is routed by.
    fn as_str(&self) -> &'static str;

    /// HTTP verb the operation is declared with.
    fn http_verb(&self) -> HttpVerb;

    /// Look up an operation by its exact routed name.
    fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|method| method.as_str() == name)
    }
}

/// Handler bound to one operation: receives the plugin, the query parameters
/// and the body, in that order.
pub type Handler<P> =
    for<'a> fn(&'a P, QueryParams, RequestPayload) -> BoxFuture<'a, Result<serde_json::Value>>;

/// An operation as advertised to the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Operation {
    pub name: &'static str,
    pub http_verb: HttpVerb,
}

/// Dispatch table from method names to handlers.
pub struct Router<P, M> {
    plugin_name: String,
    logger: Arc<dyn PluginLogger>,
    handlers: HashMap<M, Handler<P>>,
}

impl<P, M> Router<P, M>
where
    P: Sync,
    M: PluginMethod,
{
    /// Create an empty router for `plugin_name`.
    pub fn new(plugin_name: impl Into<String>, logger: Arc<dyn PluginLogger>) -> Self {
        Self {
            plugin_name: plugin_name.into(),
            logger,
            handlers: HashMap::new(),
        }
    }

    /// Bind `handler` to `method`, replacing any previous binding.
    pub fn with_handler(mut self, method: M, handler: Handler<P>) -> Self {
        self.handlers.insert(method, handler);
        self
    }

    /// Operations with a bound handler, in declaration order.
    pub fn operations(&self) -> Vec<Operation> {
        M::ALL
            .iter()
            .filter(|method| self.handlers.contains_key(method))
            .map(|method| Operation {
                name: method.as_str(),
                http_verb: method.http_verb(),
            })
            .collect()
    }

    /// Whether `name` is routable.
    pub fn is_routable(&self, name: &str) -> bool {
        self.resolve(name).is_some()
    }

    fn resolve(&self, name: &str) -> Option<(M, Handler<P>)> {
        let method = M::from_name(name)?;
        self.handlers.get(&method).map(|handler| (method, *handler))
    }

    /// Dispatch `descriptor` to the matching handler on `plugin`.
    ///
    /// The handler's value is returned as is. Handler failures are logged and
    /// returned unchanged; wrapping is the handler's business.
    pub async fn route(&self, plugin: &P, descriptor: RequestDescriptor) -> Result<serde_json::Value> {
        let RequestDescriptor {
            method_name,
            http_verb,
            query_params,
            body,
        } = descriptor;

        let Some((method, handler)) = self.resolve(&method_name) else {
            let err = PluginError::MethodNotRecognized {
                verb: http_verb,
                method: method_name,
                plugin: self.plugin_name.clone(),
            };
            self.logger.log(LogLevel::Warn, &err.to_string());
            return Err(err);
        };

        self.logger.log(
            LogLevel::Debug,
            &format!("Routing {} {}", http_verb, method.as_str()),
        );

        match handler(plugin, query_params, body).await {
            Ok(value) => Ok(value),
            Err(err) => {
                self.logger.log(
                    LogLevel::Error,
                    &format!("{} {} failed: {}", self.plugin_name, method.as_str(), err),
                );
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::MemoryLogger;
    use serde_json::json;
    use std::sync::Mutex;

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    enum TestMethod {
        ListRepositories,
        Describe,
    }

    impl PluginMethod for TestMethod {
        const ALL: &'static [Self] = &[TestMethod::ListRepositories, TestMethod::Describe];

        fn as_str(&self) -> &'static str {
            match self {
                TestMethod::ListRepositories => "listRepositories",
                TestMethod::Describe => "describe",
            }
        }

        fn http_verb(&self) -> HttpVerb {
            HttpVerb::Get
        }
    }

    #[derive(Default)]
    struct StubPlugin {
        calls: Mutex<Vec<(QueryParams, RequestPayload)>>,
    }

    fn stub_list<'a>(
        plugin: &'a StubPlugin,
        query_params: QueryParams,
        body: RequestPayload,
    ) -> BoxFuture<'a, Result<serde_json::Value>> {
        Box::pin(async move {
            plugin.calls.lock().unwrap().push((query_params, body));
            Ok(json!({ "b": 2 }))
        })
    }

    fn failing_list<'a>(
        _plugin: &'a StubPlugin,
        _query_params: QueryParams,
        _body: RequestPayload,
    ) -> BoxFuture<'a, Result<serde_json::Value>> {
        Box::pin(async move {
            Err(PluginError::RemoteOperation {
                plugin: "Stub".to_string(),
                operation: "listRepositories",
                message: "boom".to_string(),
            })
        })
    }

    fn router(logger: &MemoryLogger, handler: Handler<StubPlugin>) -> Router<StubPlugin, TestMethod> {
        Router::new("Stub", Arc::new(logger.clone()))
            .with_handler(TestMethod::ListRepositories, handler)
    }

    fn query(value: serde_json::Value) -> QueryParams {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_from_name_is_exact() {
        assert_eq!(
            TestMethod::from_name("listRepositories"),
            Some(TestMethod::ListRepositories)
        );
        assert_eq!(TestMethod::from_name("ListRepositories"), None);
        assert_eq!(TestMethod::from_name("listRepositories "), None);
    }

    #[test]
    fn test_operations_only_lists_bound_methods() {
        let logger = MemoryLogger::new();
        let router = router(&logger, stub_list);

        assert_eq!(
            router.operations(),
            vec![Operation {
                name: "listRepositories",
                http_verb: HttpVerb::Get,
            }]
        );
        assert!(router.is_routable("listRepositories"));
        assert!(!router.is_routable("describe"));
    }

    #[tokio::test]
    async fn test_route_forwards_arguments_and_result() {
        let logger = MemoryLogger::new();
        let router = router(&logger, stub_list);
        let plugin = StubPlugin::default();

        let body = RequestPayload {
            page_length: Some(1),
            fields: None,
        };
        let descriptor = RequestDescriptor::new("listRepositories", HttpVerb::Get)
            .with_query_params(query(json!({ "a": 1 })))
            .with_body(body.clone());

        let result = router.route(&plugin, descriptor).await.unwrap();
        assert_eq!(result, json!({ "b": 2 }));

        let calls = plugin.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, query(json!({ "a": 1 })));
        assert_eq!(calls[0].1, body);
    }

    #[tokio::test]
    async fn test_route_unknown_method() {
        let logger = MemoryLogger::new();
        let router = router(&logger, stub_list);
        let plugin = StubPlugin::default();

        let err = router
            .route(&plugin, RequestDescriptor::new("deleteEverything", HttpVerb::Get))
            .await
            .unwrap_err();

        match &err {
            PluginError::MethodNotRecognized { verb, method, plugin } => {
                assert_eq!(*verb, HttpVerb::Get);
                assert_eq!(method, "deleteEverything");
                assert_eq!(plugin, "Stub");
            }
            other => panic!("unexpected error: {other:?}"),
        }

        let warnings = logger.messages_at(LogLevel::Warn);
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("deleteEverything"));
        assert!(warnings[0].contains("GET"));
        assert!(plugin.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_route_declared_but_unbound_method() {
        let logger = MemoryLogger::new();
        let router = router(&logger, stub_list);
        let plugin = StubPlugin::default();

        let err = router
            .route(&plugin, RequestDescriptor::new("describe", HttpVerb::Post))
            .await
            .unwrap_err();
        assert!(err.is_routing_error());
        assert!(logger.contains("The POST method describe is not recognized by Stub plugin."));
    }

    #[tokio::test]
    async fn test_route_passes_handler_error_through() {
        let logger = MemoryLogger::new();
        let router = router(&logger, failing_list);
        let plugin = StubPlugin::default();

        let err = router
            .route(&plugin, RequestDescriptor::new("listRepositories", HttpVerb::Get))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            PluginError::RemoteOperation { ref message, .. } if message == "boom"
        ));
        let errors = logger.messages_at(LogLevel::Error);
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("listRepositories"));
    }
}
