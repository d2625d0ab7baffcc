use std::{
    collections::{HashMap, HashSet},
    fmt::Debug,
    marker::PhantomData,
    time::Duration,
};

use reqwest::{header, header::HeaderValue, Client as HttpClient};
use reqwest_middleware::{ClientBuilder as HttpClientBuilder, ClientWithMiddleware};
use reqwest_retry::{policies::ExponentialBackoff, RetryTransientMiddleware};
use serde::{de::DeserializeOwned, Serialize};

use crate::jsonrpc;

// Retry parameters for rate limited requests.
const EXPONENT_BASE: u32 = 2;
const MIN_RETRY_INTERVAL: Duration = Duration::from_secs(1);
const MAX_RETRY_INTERVAL: Duration = Duration::from_secs(32);
const MAX_TRANSPORT_RETRIES: u32 = 9;

/// Number of attempts before a failing request or batch entry is given up on.
const MAX_ATTEMPTS: u32 = 5;

/// A JSON-RPC method invocation that knows its own method name.
pub trait RpcMethod: Serialize {
    /// The method's name, e.g. `eth_getBalance`.
    fn name(&self) -> &str;
}

/// Configuration of an [`RpcClient`].
#[derive(Clone, Debug)]
pub struct RpcClientConfig {
    /// Upper bound on idle keep-alive connections towards the upstream.
    pub max_sockets: usize,
    /// Whether the upstream supports JSON-RPC batch requests. When disabled,
    /// batches are sent as sequential single requests.
    pub supports_batching: bool,
    /// Method names that fail synchronously without any network traffic.
    pub unsupported_methods: HashSet<String>,
}

impl Default for RpcClientConfig {
    fn default() -> Self {
        Self {
            max_sockets: 10,
            supports_batching: true,
            unsupported_methods: HashSet::new(),
        }
    }
}

/// Specialized error types
#[derive(Debug, thiserror::Error)]
pub enum RpcClientError {
    /// The message could not be sent to the remote node
    #[error(transparent)]
    FailedToSend(#[from] reqwest_middleware::Error),

    /// The remote node failed to reply with the body of the response
    #[error("The response text was corrupted: {0}.")]
    CorruptedResponse(reqwest::Error),

    /// The server returned an error code.
    #[error("The Http server returned error status code: {0}")]
    HttpStatus(reqwest::Error),

    /// The request cannot be serialized as JSON.
    #[error(transparent)]
    InvalidJsonRequest(serde_json::Error),

    /// The server returned an invalid JSON-RPC response.
    #[error("Response '{response}' failed to parse with expected type '{expected_type}', due to error: '{error}'")]
    InvalidResponse {
        /// The response text
        response: String,
        /// The expected type of the response
        expected_type: &'static str,
        /// The parse error
        error: serde_json::Error,
    },

    /// The server returned a response with an id that matches no request.
    #[error("The server returned an unknown id in response: '{response}'")]
    InvalidId {
        /// The response text
        response: String,
    },

    /// Invalid URL format
    #[error(transparent)]
    InvalidUrl(#[from] url::ParseError),

    /// The JSON-RPC server returned an error.
    #[error("{error}. Request: {request}")]
    JsonRpcError {
        /// The JSON-RPC error
        error: jsonrpc::Error,
        /// The request JSON
        request: String,
    },

    /// The method is on the client's deny-list.
    #[error("method not supported by the provider: {method}")]
    UnsupportedMethod {
        /// The method's name
        method: String,
    },
}

/// A client for executing RPC methods on a remote Ethereum node.
#[derive(Debug)]
pub struct RpcClient<MethodT: RpcMethod> {
    url: url::Url,
    client: ClientWithMiddleware,
    config: RpcClientConfig,
    _phantom: PhantomData<MethodT>,
}

impl<MethodT: RpcMethod> RpcClient<MethodT> {
    /// Create a new instance, given a remote node URL.
    pub fn new(url: &str, config: RpcClientConfig) -> Result<Self, RpcClientError> {
        let retry_policy = ExponentialBackoff::builder()
            .retry_bounds(MIN_RETRY_INTERVAL, MAX_RETRY_INTERVAL)
            .base(EXPONENT_BASE)
            .build_with_max_retries(MAX_TRANSPORT_RETRIES);

        let mut headers = header::HeaderMap::new();
        headers.append(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );

        let client = HttpClient::builder()
            .default_headers(headers)
            .pool_max_idle_per_host(config.max_sockets)
            .build()
            .expect("Default construction nor setting default headers can cause an error");

        let client = HttpClientBuilder::new(client)
            .with(RetryTransientMiddleware::new_with_policy(retry_policy))
            .build();

        Ok(RpcClient {
            url: url.parse()?,
            client,
            config,
            _phantom: PhantomData,
        })
    }

    /// Calls the provided JSON-RPC method and returns the result.
    ///
    /// Failed invocations are retried up to a fixed number of attempts; the
    /// last error is surfaced when all attempts are exhausted.
    pub async fn call<SuccessT: DeserializeOwned>(
        &self,
        method: MethodT,
    ) -> Result<SuccessT, RpcClientError> {
        self.ensure_supported_method(&method)?;

        let mut last_error = None;
        for attempt in 0..MAX_ATTEMPTS {
            if attempt > 0 {
                tracing::debug!(
                    method = method.name(),
                    attempt,
                    "retrying failed JSON-RPC request"
                );
            }

            let (request, _) = self.serialize_request(&method)?;
            match self.execute::<SuccessT>(&request).await {
                Ok(result) => return Ok(result),
                Err(error) => last_error = Some(error),
            }
        }

        Err(last_error.expect("at least one attempt was made"))
    }

    /// Calls the provided JSON-RPC methods as a batch, returning the raw
    /// results in request order.
    ///
    /// Each attempt only re-sends the sub-requests whose previous attempt
    /// failed. If any sub-request still fails once all attempts are
    /// exhausted, the whole operation fails with the last error.
    pub async fn call_batch(
        &self,
        methods: &[MethodT],
    ) -> Result<Vec<serde_json::Value>, RpcClientError> {
        for method in methods {
            self.ensure_supported_method(method)?;
        }

        if methods.is_empty() {
            return Ok(Vec::new());
        }

        if !self.config.supports_batching {
            let mut results = Vec::with_capacity(methods.len());
            for method in methods {
                let mut last_error = None;
                for _attempt in 0..MAX_ATTEMPTS {
                    let (request, _) = self.serialize_request(method)?;
                    match self.execute::<serde_json::Value>(&request).await {
                        Ok(result) => {
                            last_error = None;
                            results.push(result);
                            break;
                        }
                        Err(error) => last_error = Some(error),
                    }
                }
                if let Some(error) = last_error {
                    return Err(error);
                }
            }
            return Ok(results);
        }

        let mut results: Vec<Option<serde_json::Value>> = vec![None; methods.len()];
        let mut pending: Vec<usize> = (0..methods.len()).collect();
        let mut last_error: Option<RpcClientError> = None;

        for attempt in 0..MAX_ATTEMPTS {
            if attempt > 0 {
                tracing::debug!(
                    pending = pending.len(),
                    attempt,
                    "retrying failed JSON-RPC batch entries"
                );
            }

            match self.execute_batch(methods, &pending, &mut results).await {
                Ok(failures) => {
                    pending = failures.iter().map(|(index, _)| *index).collect();
                    last_error = match failures.into_iter().next_back() {
                        Some((index, error)) => Some(RpcClientError::JsonRpcError {
                            error,
                            request: serde_json::json!({
                                "method": methods[index].name(),
                            })
                            .to_string(),
                        }),
                        None => None,
                    };
                }
                // Transport and decoding failures count against every
                // pending entry of the batch.
                Err(error) => last_error = Some(error),
            }

            if pending.is_empty() && last_error.is_none() {
                break;
            }
        }

        if let Some(error) = last_error {
            return Err(error);
        }

        Ok(results
            .into_iter()
            .map(|result| result.expect("all pending entries were resolved"))
            .collect())
    }

    /// Sends one batch attempt for the pending entries, filling `results` for
    /// the successful ones and returning the entries that failed.
    async fn execute_batch(
        &self,
        methods: &[MethodT],
        pending: &[usize],
        results: &mut [Option<serde_json::Value>],
    ) -> Result<Vec<(usize, jsonrpc::Error)>, RpcClientError> {
        let mut requests = Vec::with_capacity(pending.len());
        let mut index_by_id = HashMap::with_capacity(pending.len());
        for &index in pending {
            let (request, id) = self.serialize_request(&methods[index])?;
            index_by_id.insert(id, index);
            requests.push(request);
        }

        let body = serde_json::Value::Array(requests);
        let text = self.send_request_body(&body).await?;

        let responses: Vec<jsonrpc::Response<serde_json::Value>> = serde_json::from_str(&text)
            .map_err(|error| RpcClientError::InvalidResponse {
                response: text.clone(),
                expected_type: "Vec<jsonrpc::Response<serde_json::Value>>",
                error,
            })?;

        let mut failures = Vec::new();
        let mut resolved = HashSet::with_capacity(responses.len());
        for response in responses {
            let jsonrpc::Id::Num(id) = response.id else {
                return Err(RpcClientError::InvalidId {
                    response: text.clone(),
                });
            };
            let Some(&index) = index_by_id.get(&id) else {
                return Err(RpcClientError::InvalidId {
                    response: text.clone(),
                });
            };
            resolved.insert(index);

            match response.data.into_result() {
                Ok(result) => results[index] = Some(result),
                Err(error) => {
                    tracing::debug!(
                        method = methods[index].name(),
                        %error,
                        "JSON-RPC batch entry failed"
                    );
                    failures.push((index, error));
                }
            }
        }

        // Entries the server did not respond to at all are failures too.
        for &index in pending {
            if !resolved.contains(&index) {
                failures.push((
                    index,
                    jsonrpc::Error {
                        code: -32603,
                        message: "missing response for batch entry".to_string(),
                        data: None,
                    },
                ));
            }
        }

        Ok(failures)
    }

    async fn execute<SuccessT: DeserializeOwned>(
        &self,
        request: &serde_json::Value,
    ) -> Result<SuccessT, RpcClientError> {
        let text = self.send_request_body(request).await?;

        let response: jsonrpc::Response<SuccessT> =
            serde_json::from_str(&text).map_err(|error| RpcClientError::InvalidResponse {
                response: text,
                expected_type: std::any::type_name::<jsonrpc::Response<SuccessT>>(),
                error,
            })?;

        response
            .data
            .into_result()
            .map_err(|error| RpcClientError::JsonRpcError {
                error,
                request: request.to_string(),
            })
    }

    async fn send_request_body(
        &self,
        request_body: &serde_json::Value,
    ) -> Result<String, RpcClientError> {
        self.client
            .post(self.url.clone())
            .body(request_body.to_string())
            .send()
            .await
            .map_err(RpcClientError::FailedToSend)?
            .error_for_status()
            .map_err(RpcClientError::HttpStatus)?
            .text()
            .await
            .map_err(RpcClientError::CorruptedResponse)
    }

    fn ensure_supported_method(&self, method: &MethodT) -> Result<(), RpcClientError> {
        if self.config.unsupported_methods.contains(method.name()) {
            return Err(RpcClientError::UnsupportedMethod {
                method: method.name().to_string(),
            });
        }
        Ok(())
    }

    fn serialize_request(
        &self,
        method: &MethodT,
    ) -> Result<(serde_json::Value, u64), RpcClientError> {
        let id = rand::random::<u64>();
        let request = serde_json::to_value(jsonrpc::Request {
            version: jsonrpc::Version::V2_0,
            id: jsonrpc::Id::Num(id),
            method,
        })
        .map_err(RpcClientError::InvalidJsonRequest)?;

        Ok((request, id))
    }
}
