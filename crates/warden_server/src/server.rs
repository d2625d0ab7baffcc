use axum::{extract::State, routing::post, Json, Router};
use tower_http::cors::{Any, CorsLayer};
use warden_provider::{MethodInvocation, Provider};
use warden_rpc_client::jsonrpc;

/// Builds the JSON-RPC router: a single `POST /` accepting one envelope or a
/// batch of them, with permissive CORS.
pub fn router(provider: Provider) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", post(handle))
        .layer(cors)
        .with_state(provider)
}

async fn handle(
    State(provider): State<Provider>,
    body: String,
) -> Json<serde_json::Value> {
    let Ok(body) = serde_json::from_str::<serde_json::Value>(&body) else {
        return Json(error_response(
            serde_json::Value::Null,
            -32700,
            "parse error",
        ));
    };

    Json(match body {
        serde_json::Value::Array(envelopes) if envelopes.is_empty() => error_response(
            serde_json::Value::Null,
            -32600,
            "empty batch request",
        ),
        serde_json::Value::Array(envelopes) => {
            let mut responses = Vec::with_capacity(envelopes.len());
            for envelope in envelopes {
                responses.push(handle_envelope(&provider, envelope).await);
            }
            serde_json::Value::Array(responses)
        }
        envelope => handle_envelope(&provider, envelope).await,
    })
}

async fn handle_envelope(
    provider: &Provider,
    envelope: serde_json::Value,
) -> serde_json::Value {
    let id = envelope
        .get("id")
        .cloned()
        .unwrap_or(serde_json::Value::Null);

    if envelope.get("jsonrpc").and_then(serde_json::Value::as_str) != Some("2.0") {
        return error_response(id, -32600, "invalid request: expected jsonrpc \"2.0\"");
    }
    let Some(method) = envelope.get("method").and_then(serde_json::Value::as_str) else {
        return error_response(id, -32600, "invalid request: missing method");
    };
    let method = method.to_string();

    let invocation =
        match serde_json::from_value::<jsonrpc::Request<MethodInvocation>>(envelope) {
            Ok(request) => request.method,
            // serde reports an unhandled method as an unknown enum variant;
            // everything else is a parameter shape problem.
            Err(error) if error.to_string().contains("unknown variant") => {
                return error_response(id, -32601, &format!("method not found: {method}"));
            }
            Err(error) => {
                return error_response(id, -32602, &format!("invalid params: {error}"));
            }
        };

    let data = match provider.handle_request(invocation).await {
        Ok(result) => jsonrpc::ResponseData::Success { result },
        Err(error) => {
            tracing::debug!(method, %error, "request failed");
            jsonrpc::ResponseData::Error {
                error: error.into(),
            }
        }
    };

    response(id, data)
}

fn response(
    id: serde_json::Value,
    data: jsonrpc::ResponseData<serde_json::Value>,
) -> serde_json::Value {
    let mut response = serde_json::json!({ "jsonrpc": "2.0", "id": id });
    let payload = serde_json::to_value(data).expect("response data serializes");
    response
        .as_object_mut()
        .expect("response is an object")
        .extend(
            payload
                .as_object()
                .expect("response data is an object")
                .clone(),
        );
    response
}

fn error_response(id: serde_json::Value, code: i16, message: &str) -> serde_json::Value {
    response(
        id,
        jsonrpc::ResponseData::Error {
            error: jsonrpc::Error {
                code,
                message: message.to_string(),
                data: None,
            },
        },
    )
}
